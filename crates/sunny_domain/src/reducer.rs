use crate::{
    Action, AppState, CenterPanelTag, ChatSession, ChatSessionRecord, Effect, IntegrationState,
    PendingOAuthRequest, Project, ProjectRecord, oauth, scopes,
};
use std::collections::HashSet;

fn session_title(record: &ChatSessionRecord) -> String {
    if let Some(name) = record.name.as_deref()
        && !name.is_empty()
    {
        return name.to_owned();
    }
    match record.id.strip_prefix("chat_") {
        Some(rest) => {
            let segment = rest.split('_').next().unwrap_or_default();
            format!("Chat {segment}")
        }
        None => record.id.clone(),
    }
}

fn chat_session_from_record(record: &ChatSessionRecord) -> ChatSession {
    ChatSession {
        id: record.id.clone(),
        title: session_title(record),
        created_at: record.started_at.clone(),
        last_message_at: record.started_at.clone(),
        unread_count: 0,
    }
}

fn project_from_record(record: ProjectRecord) -> Project {
    Project {
        id: record.id,
        name: record.name,
        description: record.description,
        created_by: record.created_by,
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            current_user_id: None,
            persistence_configured: false,
            google_client_id: None,
            app_origin: String::new(),
            chats: Vec::new(),
            projects: Vec::new(),
            active_chat_id: None,
            active_project_id: None,
            center_panel_tag: None,
            active_feed_item_id: None,
            google: IntegrationState::Unknown,
            google_error: None,
            google_notice: None,
            pending_oauth: None,
            handled_callbacks: HashSet::new(),
        }
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::AppStarted => vec![Effect::LoadShellConfig],
            Action::ShellConfigLoaded { config } => {
                self.persistence_configured = config.persistence_configured;
                self.google_client_id = config.google_client_id;
                self.app_origin = config.app_origin;
                Vec::new()
            }

            Action::SignedIn { user_id } => {
                self.current_user_id = Some(user_id.clone());
                self.google = IntegrationState::Loading;
                self.google_error = None;
                vec![
                    Effect::LoadProjects {
                        user_id: user_id.clone(),
                    },
                    Effect::LoadChatSessions {
                        user_id: user_id.clone(),
                    },
                    Effect::LoadGoogleStatus { user_id },
                ]
            }
            Action::SignedOut => {
                self.reset_user_state();
                Vec::new()
            }

            Action::ProjectsLoaded { projects } => {
                self.projects = projects.into_iter().map(project_from_record).collect();
                Vec::new()
            }
            Action::ChatSessionsLoaded { sessions } => {
                self.chats = sessions
                    .iter()
                    .filter(|session| session.ended_at.is_none())
                    .map(chat_session_from_record)
                    .collect();
                if self.active_chat_id.is_none()
                    && let Some(first) = self.chats.first()
                {
                    self.active_chat_id = Some(first.id.clone());
                }
                Vec::new()
            }

            Action::NewChat => {
                let Some(user_id) = self.current_user_id.clone() else {
                    return Vec::new();
                };
                if !self.persistence_configured {
                    return Vec::new();
                }
                vec![Effect::CreateChatSession {
                    user_id,
                    project_id: self.active_project_id.clone(),
                }]
            }
            Action::ChatSessionCreated { session } => {
                let title = match session.name.as_deref() {
                    Some(name) if !name.is_empty() => name.to_owned(),
                    _ => format!("Chat {}", self.chats.len() + 1),
                };
                let chat = ChatSession {
                    id: session.id.clone(),
                    title,
                    created_at: session.started_at.clone(),
                    last_message_at: session.started_at,
                    unread_count: 0,
                };
                self.chats.insert(0, chat);
                self.active_chat_id = Some(session.id);
                Vec::new()
            }

            Action::RenameChat { session_id, title } => {
                vec![Effect::RenameChatSession { session_id, title }]
            }
            Action::ChatSessionRenamed { session_id, title } => {
                if let Some(chat) = self.chats.iter_mut().find(|c| c.id == session_id) {
                    chat.title = title;
                }
                Vec::new()
            }

            Action::DeleteChat { session_id } => {
                vec![Effect::EndChatSession { session_id }]
            }
            Action::ChatSessionEnded { session_id } => {
                self.chats.retain(|chat| chat.id != session_id);
                if self.active_chat_id.as_deref() == Some(session_id.as_str()) {
                    self.active_chat_id = self.chats.first().map(|chat| chat.id.clone());
                }
                Vec::new()
            }
            Action::SelectChat { session_id } => {
                self.active_chat_id = Some(session_id);
                Vec::new()
            }

            Action::ProjectCreated { project } => {
                let project_id = project.id.clone();
                self.projects.insert(0, project_from_record(project));
                self.activate_project(project_id);
                Vec::new()
            }
            Action::RenameProject {
                project_id,
                name,
                description,
            } => {
                vec![Effect::UpdateProject {
                    project_id,
                    name,
                    description,
                }]
            }
            Action::ProjectRenamed {
                project_id,
                name,
                description,
            } => {
                if let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) {
                    project.name = name;
                    project.description = description;
                }
                Vec::new()
            }
            Action::DeleteProject { project_id } => {
                vec![Effect::DeleteProject { project_id }]
            }
            Action::ProjectDeleted { project_id } => {
                self.projects.retain(|project| project.id != project_id);
                if self.active_project_id.as_deref() == Some(project_id.as_str()) {
                    self.active_project_id = None;
                }
                Vec::new()
            }
            Action::SelectProject { project_id } => {
                self.activate_project(project_id);
                Vec::new()
            }

            Action::OpenHome => {
                self.center_panel_tag = None;
                self.active_project_id = None;
                self.active_feed_item_id = None;
                Vec::new()
            }
            Action::OpenDataFeed => {
                self.center_panel_tag = Some(CenterPanelTag::DataFeed);
                self.active_project_id = None;
                self.active_feed_item_id = None;
                Vec::new()
            }
            Action::SelectFeedItem { item_id } => {
                self.center_panel_tag = Some(CenterPanelTag::DataFeed);
                self.active_feed_item_id = Some(item_id);
                Vec::new()
            }
            Action::CloseFeedItem => {
                self.active_feed_item_id = None;
                Vec::new()
            }

            Action::LoadIntegrationStatus => {
                let Some(user_id) = self.current_user_id.clone() else {
                    return Vec::new();
                };
                self.google = IntegrationState::Loading;
                self.google_error = None;
                vec![Effect::LoadGoogleStatus { user_id }]
            }
            Action::GoogleStatusLoaded { credentials } => {
                self.google = match credentials {
                    Some(credentials) => IntegrationState::Connected {
                        email: credentials.google_email,
                        expires_at: credentials.expires_at,
                        scope_mismatch: scopes::current_scope_mismatch(&credentials.scope),
                    },
                    None => IntegrationState::Disconnected,
                };
                Vec::new()
            }
            Action::GoogleStatusLoadFailed { .. } => {
                self.google_error = Some("Failed to load Google integration status".to_owned());
                self.google = IntegrationState::Disconnected;
                Vec::new()
            }

            Action::ConnectGoogle => {
                let Some(user_id) = self.current_user_id.clone() else {
                    self.google_error = Some("User not authenticated".to_owned());
                    return Vec::new();
                };
                if self.google_client_id.is_none() {
                    self.google_error = Some("Google OAuth client ID not configured".to_owned());
                    return Vec::new();
                }
                if self.google.is_connected() {
                    // Stale tokens must never coexist with a fresh
                    // authorization: disconnect first, redirect after.
                    self.google = IntegrationState::Reconnecting;
                    return vec![Effect::DisconnectGoogle { user_id }];
                }
                self.begin_authorization(user_id)
            }
            Action::GoogleAuthorizationFailed { error_code } => {
                self.google_error = Some(oauth::provider_error_message(&error_code).to_owned());
                self.google_notice = None;
                Vec::new()
            }
            Action::GoogleCallbackReceived { code, state } => {
                let pair = (code.clone(), state.clone());
                if self.handled_callbacks.contains(&pair) {
                    return Vec::new();
                }
                self.handled_callbacks.insert(pair);

                let matches_user = self.current_user_id.as_deref() == Some(state.as_str());
                if !matches_user {
                    self.google_error = Some("Invalid OAuth callback".to_owned());
                    self.google_notice = None;
                    return Vec::new();
                }

                self.pending_oauth = None;
                self.google = IntegrationState::CallbackPending;
                self.google_error = None;
                self.google_notice = None;
                vec![Effect::ExchangeGoogleCode {
                    user_id: state,
                    code,
                }]
            }
            Action::GoogleCodeExchanged { email } => {
                let Some(user_id) = self.current_user_id.clone() else {
                    return Vec::new();
                };
                self.google_notice =
                    Some(format!("Successfully connected to Google account: {email}"));
                self.google_error = None;
                vec![
                    Effect::LoadGoogleStatus {
                        user_id: user_id.clone(),
                    },
                    Effect::RunInitialSync { user_id },
                ]
            }
            Action::GoogleCodeExchangeFailed { message } => {
                self.google_error = Some(message);
                self.google_notice = None;
                self.google = IntegrationState::Disconnected;
                Vec::new()
            }

            Action::DisconnectGoogle => {
                let Some(user_id) = self.current_user_id.clone() else {
                    return Vec::new();
                };
                self.google = IntegrationState::Disconnecting;
                self.google_error = None;
                vec![Effect::DisconnectGoogle { user_id }]
            }
            Action::GoogleDisconnected => {
                if self.google == IntegrationState::Reconnecting
                    && let Some(user_id) = self.current_user_id.clone()
                {
                    return self.begin_authorization(user_id);
                }
                self.google = IntegrationState::Disconnected;
                self.google_notice = Some("Successfully disconnected from Google".to_owned());
                self.google_error = None;
                Vec::new()
            }
            Action::GoogleDisconnectFailed { message } => {
                if self.google == IntegrationState::Reconnecting
                    && let Some(user_id) = self.current_user_id.clone()
                {
                    // Reconnection must not be blockable by a revoke or
                    // delete failure; the redirect proceeds regardless.
                    return self.begin_authorization(user_id);
                }
                self.google_error = Some(message);
                match self.current_user_id.clone() {
                    Some(user_id) => {
                        self.google = IntegrationState::Loading;
                        vec![Effect::LoadGoogleStatus { user_id }]
                    }
                    None => Vec::new(),
                }
            }

            Action::ClearError => {
                self.google_error = None;
                Vec::new()
            }
            Action::ClearNotice => {
                self.google_notice = None;
                Vec::new()
            }

            Action::ProjectsLoadFailed { .. }
            | Action::ChatSessionsLoadFailed { .. }
            | Action::ChatSessionCreateFailed { .. }
            | Action::ChatSessionRenameFailed { .. }
            | Action::ChatSessionEndFailed { .. }
            | Action::ProjectRenameFailed { .. }
            | Action::ProjectDeleteFailed { .. } => Vec::new(),
        }
    }

    fn activate_project(&mut self, project_id: String) {
        self.active_project_id = Some(project_id);
        self.center_panel_tag = None;
        self.active_feed_item_id = None;
    }

    fn begin_authorization(&mut self, user_id: String) -> Vec<Effect> {
        let Some(client_id) = self.google_client_id.clone() else {
            self.google_error = Some("Google OAuth client ID not configured".to_owned());
            return Vec::new();
        };
        // The state token is the plain user id: enough to correlate the
        // callback with this request, not a single-use nonce.
        self.pending_oauth = Some(PendingOAuthRequest {
            state: user_id.clone(),
        });
        self.google = IntegrationState::Connecting;
        self.google_error = None;
        self.google_notice = None;
        let url = oauth::authorization_url(&client_id, &self.app_origin, &user_id);
        vec![Effect::OpenAuthorizationUrl { url }]
    }

    fn reset_user_state(&mut self) {
        self.current_user_id = None;
        self.chats.clear();
        self.projects.clear();
        self.active_chat_id = None;
        self.active_project_id = None;
        self.center_panel_tag = None;
        self.active_feed_item_id = None;
        self.google = IntegrationState::Unknown;
        self.google_error = None;
        self.google_notice = None;
        self.pending_oauth = None;
        self.handled_callbacks.clear();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ShellConfig, StoredGoogleCredentials};

    fn configured_state() -> AppState {
        let mut state = AppState::new();
        state.apply(Action::ShellConfigLoaded {
            config: ShellConfig {
                persistence_configured: true,
                google_client_id: Some("client-1".to_owned()),
                app_origin: "https://app.sunny.ai".to_owned(),
            },
        });
        state
    }

    fn signed_in_state() -> AppState {
        let mut state = configured_state();
        state.apply(Action::SignedIn {
            user_id: "user-7".to_owned(),
        });
        state
    }

    fn session_record(id: &str) -> ChatSessionRecord {
        ChatSessionRecord {
            id: id.to_owned(),
            user_id: "user-7".to_owned(),
            project_id: None,
            name: None,
            started_at: "2025-05-01T10:00:00Z".to_owned(),
            ended_at: None,
        }
    }

    fn project_record(id: &str, name: &str) -> ProjectRecord {
        ProjectRecord {
            id: id.to_owned(),
            name: name.to_owned(),
            description: String::new(),
            created_by: "user-7".to_owned(),
        }
    }

    fn connected_credentials() -> StoredGoogleCredentials {
        StoredGoogleCredentials {
            access_token: "at-1".to_owned(),
            refresh_token: Some("rt-1".to_owned()),
            scope: format!("openid {}", scopes::GOOGLE_OAUTH_SCOPES.join(" ")),
            expires_at: Some("2025-06-01T00:00:00Z".to_owned()),
            google_email: Some("user@example.com".to_owned()),
        }
    }

    fn connect_state(state: &mut AppState) {
        state.apply(Action::GoogleStatusLoaded {
            credentials: Some(connected_credentials()),
        });
    }

    #[test]
    fn signed_in_loads_projects_sessions_and_status() {
        let mut state = configured_state();
        let effects = state.apply(Action::SignedIn {
            user_id: "user-7".to_owned(),
        });
        assert_eq!(
            effects,
            vec![
                Effect::LoadProjects {
                    user_id: "user-7".to_owned()
                },
                Effect::LoadChatSessions {
                    user_id: "user-7".to_owned()
                },
                Effect::LoadGoogleStatus {
                    user_id: "user-7".to_owned()
                },
            ]
        );
        assert_eq!(state.google, IntegrationState::Loading);
    }

    #[test]
    fn first_loaded_session_becomes_active_when_none_is() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1"), session_record("s2"), session_record("s3")],
        });
        assert_eq!(state.chats.len(), 3);
        assert_eq!(state.active_chat_id.as_deref(), Some("s1"));
    }

    #[test]
    fn loaded_sessions_keep_the_existing_selection() {
        let mut state = signed_in_state();
        state.apply(Action::SelectChat {
            session_id: "s2".to_owned(),
        });
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1"), session_record("s2")],
        });
        assert_eq!(state.active_chat_id.as_deref(), Some("s2"));
    }

    #[test]
    fn ended_sessions_are_filtered_out() {
        let mut state = signed_in_state();
        let mut ended = session_record("s2");
        ended.ended_at = Some("2025-05-02T09:00:00Z".to_owned());
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1"), ended],
        });
        assert_eq!(state.chats.len(), 1);
        assert_eq!(state.chats[0].id, "s1");
    }

    #[test]
    fn session_titles_fall_back_to_the_id_shape() {
        let mut state = signed_in_state();
        let mut named = session_record("s1");
        named.name = Some("Planning".to_owned());
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![named, session_record("chat_42_x"), session_record("s3")],
        });
        let titles: Vec<&str> = state.chats.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Planning", "Chat 42", "s3"]);
    }

    #[test]
    fn load_failure_leaves_prior_sessions_untouched() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1")],
        });
        let effects = state.apply(Action::ChatSessionsLoadFailed {
            message: "store unreachable".to_owned(),
        });
        assert!(effects.is_empty());
        assert_eq!(state.chats.len(), 1);
        assert_eq!(state.active_chat_id.as_deref(), Some("s1"));
        assert!(state.google_error.is_none());
    }

    #[test]
    fn new_chat_without_user_is_a_silent_noop() {
        let mut state = configured_state();
        let effects = state.apply(Action::NewChat);
        assert!(effects.is_empty());
        assert!(state.chats.is_empty());
    }

    #[test]
    fn new_chat_without_configured_persistence_is_a_silent_noop() {
        let mut state = AppState::new();
        state.apply(Action::ShellConfigLoaded {
            config: ShellConfig {
                persistence_configured: false,
                google_client_id: None,
                app_origin: String::new(),
            },
        });
        state.apply(Action::SignedIn {
            user_id: "user-7".to_owned(),
        });
        assert!(state.apply(Action::NewChat).is_empty());
    }

    #[test]
    fn new_chat_carries_the_active_project() {
        let mut state = signed_in_state();
        state.apply(Action::SelectProject {
            project_id: "p1".to_owned(),
        });
        let effects = state.apply(Action::NewChat);
        assert_eq!(
            effects,
            vec![Effect::CreateChatSession {
                user_id: "user-7".to_owned(),
                project_id: Some("p1".to_owned()),
            }]
        );
    }

    #[test]
    fn created_session_is_prepended_and_activated() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1")],
        });
        let mut created = session_record("s9");
        created.name = Some("New Chat".to_owned());
        state.apply(Action::ChatSessionCreated { session: created });
        assert_eq!(state.chats[0].id, "s9");
        assert_eq!(state.chats[0].title, "New Chat");
        assert_eq!(state.active_chat_id.as_deref(), Some("s9"));
    }

    #[test]
    fn rename_patches_only_after_confirmation() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1")],
        });
        let effects = state.apply(Action::RenameChat {
            session_id: "s1".to_owned(),
            title: "Budget".to_owned(),
        });
        assert_eq!(
            effects,
            vec![Effect::RenameChatSession {
                session_id: "s1".to_owned(),
                title: "Budget".to_owned(),
            }]
        );
        assert_eq!(state.chats[0].title, "s1"); // unchanged until confirmed

        state.apply(Action::ChatSessionRenamed {
            session_id: "s1".to_owned(),
            title: "Budget".to_owned(),
        });
        assert_eq!(state.chats[0].title, "Budget");
    }

    #[test]
    fn deleting_the_active_session_activates_the_next_one() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1"), session_record("s2"), session_record("s3")],
        });
        state.apply(Action::ChatSessionEnded {
            session_id: "s1".to_owned(),
        });
        assert_eq!(state.active_chat_id.as_deref(), Some("s2"));
        assert!(state.chats.iter().all(|c| c.id != "s1"));
    }

    #[test]
    fn deleting_the_last_session_clears_the_selection() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1")],
        });
        state.apply(Action::ChatSessionEnded {
            session_id: "s1".to_owned(),
        });
        assert!(state.active_chat_id.is_none());
        assert!(state.chats.is_empty());
    }

    #[test]
    fn deleting_an_inactive_session_keeps_the_selection() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1"), session_record("s2")],
        });
        state.apply(Action::ChatSessionEnded {
            session_id: "s2".to_owned(),
        });
        assert_eq!(state.active_chat_id.as_deref(), Some("s1"));
    }

    #[test]
    fn created_project_is_prepended_and_activated() {
        let mut state = signed_in_state();
        state.apply(Action::ProjectsLoaded {
            projects: vec![project_record("p1", "Alpha")],
        });
        state.apply(Action::ProjectCreated {
            project: project_record("p2", "Beta"),
        });
        assert_eq!(state.projects[0].id, "p2");
        assert_eq!(state.active_project_id.as_deref(), Some("p2"));
    }

    #[test]
    fn deleting_the_active_project_falls_back_to_the_welcome_panel() {
        let mut state = signed_in_state();
        state.apply(Action::ProjectsLoaded {
            projects: vec![project_record("p1", "Alpha")],
        });
        state.apply(Action::SelectProject {
            project_id: "p1".to_owned(),
        });
        state.apply(Action::ProjectDeleted {
            project_id: "p1".to_owned(),
        });
        assert!(state.active_project_id.is_none());
        assert_eq!(state.center_panel(), crate::CenterPanel::Welcome);
    }

    #[test]
    fn selecting_a_project_resets_the_center_panel() {
        let mut state = signed_in_state();
        state.apply(Action::OpenDataFeed);
        state.apply(Action::SelectFeedItem {
            item_id: "item-1".to_owned(),
        });
        state.apply(Action::SelectProject {
            project_id: "p1".to_owned(),
        });
        assert!(state.center_panel_tag.is_none());
        assert!(state.active_feed_item_id.is_none());
        assert_eq!(
            state.center_panel(),
            crate::CenterPanel::ProjectDashboard {
                project_id: "p1".to_owned()
            }
        );
    }

    #[test]
    fn status_load_computes_scope_mismatch_fresh() {
        let mut state = signed_in_state();
        connect_state(&mut state);
        assert_eq!(
            state.google,
            IntegrationState::Connected {
                email: Some("user@example.com".to_owned()),
                expires_at: Some("2025-06-01T00:00:00Z".to_owned()),
                scope_mismatch: false,
            }
        );

        let mut stale = connected_credentials();
        stale.scope = "https://www.googleapis.com/auth/gmail.modify openid".to_owned();
        state.apply(Action::GoogleStatusLoaded {
            credentials: Some(stale),
        });
        match &state.google {
            IntegrationState::Connected { scope_mismatch, .. } => assert!(scope_mismatch),
            other => panic!("expected connected state, got {other:?}"),
        }
    }

    #[test]
    fn absent_credentials_mean_disconnected() {
        let mut state = signed_in_state();
        state.apply(Action::GoogleStatusLoaded { credentials: None });
        assert_eq!(state.google, IntegrationState::Disconnected);
    }

    #[test]
    fn status_load_failure_surfaces_a_fixed_message() {
        let mut state = signed_in_state();
        state.apply(Action::GoogleStatusLoadFailed {
            message: "row decode failed".to_owned(),
        });
        assert_eq!(
            state.google_error.as_deref(),
            Some("Failed to load Google integration status")
        );
        assert_eq!(state.google, IntegrationState::Disconnected);
    }

    #[test]
    fn connect_without_user_surfaces_an_auth_error() {
        let mut state = configured_state();
        let effects = state.apply(Action::ConnectGoogle);
        assert!(effects.is_empty());
        assert_eq!(state.google_error.as_deref(), Some("User not authenticated"));
    }

    #[test]
    fn connect_without_client_id_surfaces_a_config_error() {
        let mut state = AppState::new();
        state.apply(Action::ShellConfigLoaded {
            config: ShellConfig {
                persistence_configured: true,
                google_client_id: None,
                app_origin: "https://app.sunny.ai".to_owned(),
            },
        });
        state.apply(Action::SignedIn {
            user_id: "user-7".to_owned(),
        });
        let effects = state.apply(Action::ConnectGoogle);
        assert!(effects.is_empty());
        assert_eq!(
            state.google_error.as_deref(),
            Some("Google OAuth client ID not configured")
        );
    }

    #[test]
    fn connect_when_disconnected_records_pending_and_opens_the_redirect() {
        let mut state = signed_in_state();
        state.apply(Action::GoogleStatusLoaded { credentials: None });
        let effects = state.apply(Action::ConnectGoogle);

        assert_eq!(state.google, IntegrationState::Connecting);
        assert_eq!(
            state.pending_oauth,
            Some(PendingOAuthRequest {
                state: "user-7".to_owned()
            })
        );
        match effects.as_slice() {
            [Effect::OpenAuthorizationUrl { url }] => {
                assert!(url.starts_with(oauth::GOOGLE_AUTH_ENDPOINT));
                assert!(url.contains("state=user-7"));
                assert!(url.contains("prompt=consent"));
                assert!(url.contains("access_type=offline"));
            }
            other => panic!("expected a single redirect effect, got {other:?}"),
        }
    }

    #[test]
    fn connect_when_connected_disconnects_first() {
        let mut state = signed_in_state();
        connect_state(&mut state);
        let effects = state.apply(Action::ConnectGoogle);
        assert_eq!(state.google, IntegrationState::Reconnecting);
        assert_eq!(
            effects,
            vec![Effect::DisconnectGoogle {
                user_id: "user-7".to_owned()
            }]
        );
    }

    #[test]
    fn reconnect_proceeds_to_the_redirect_even_if_disconnect_fails() {
        let mut state = signed_in_state();
        connect_state(&mut state);
        state.apply(Action::ConnectGoogle);
        let effects = state.apply(Action::GoogleDisconnectFailed {
            message: "revocation endpoint returned 502".to_owned(),
        });
        assert_eq!(state.google, IntegrationState::Connecting);
        assert!(matches!(
            effects.as_slice(),
            [Effect::OpenAuthorizationUrl { .. }]
        ));
    }

    #[test]
    fn reconnect_proceeds_to_the_redirect_after_disconnect_succeeds() {
        let mut state = signed_in_state();
        connect_state(&mut state);
        state.apply(Action::ConnectGoogle);
        let effects = state.apply(Action::GoogleDisconnected);
        assert_eq!(state.google, IntegrationState::Connecting);
        assert!(matches!(
            effects.as_slice(),
            [Effect::OpenAuthorizationUrl { .. }]
        ));
    }

    #[test]
    fn callback_with_mismatched_state_never_exchanges() {
        let mut state = signed_in_state();
        state.apply(Action::GoogleStatusLoaded { credentials: None });
        let effects = state.apply(Action::GoogleCallbackReceived {
            code: "code-1".to_owned(),
            state: "someone-else".to_owned(),
        });
        assert!(effects.is_empty());
        assert_eq!(state.google_error.as_deref(), Some("Invalid OAuth callback"));
        assert!(!state.google.is_connected());
    }

    #[test]
    fn callback_replay_exchanges_at_most_once() {
        let mut state = signed_in_state();
        state.apply(Action::GoogleStatusLoaded { credentials: None });
        state.apply(Action::ConnectGoogle);

        let first = state.apply(Action::GoogleCallbackReceived {
            code: "code-1".to_owned(),
            state: "user-7".to_owned(),
        });
        assert_eq!(
            first,
            vec![Effect::ExchangeGoogleCode {
                user_id: "user-7".to_owned(),
                code: "code-1".to_owned(),
            }]
        );
        assert!(state.pending_oauth.is_none());
        assert_eq!(state.google, IntegrationState::CallbackPending);

        let replay = state.apply(Action::GoogleCallbackReceived {
            code: "code-1".to_owned(),
            state: "user-7".to_owned(),
        });
        assert!(replay.is_empty());
    }

    #[test]
    fn exchange_success_reloads_status_and_fires_the_sync_hook() {
        let mut state = signed_in_state();
        let effects = state.apply(Action::GoogleCodeExchanged {
            email: "user@example.com".to_owned(),
        });
        assert_eq!(
            effects,
            vec![
                Effect::LoadGoogleStatus {
                    user_id: "user-7".to_owned()
                },
                Effect::RunInitialSync {
                    user_id: "user-7".to_owned()
                },
            ]
        );
        assert_eq!(
            state.google_notice.as_deref(),
            Some("Successfully connected to Google account: user@example.com")
        );
    }

    #[test]
    fn exchange_failure_surfaces_the_gateway_message_verbatim() {
        let mut state = signed_in_state();
        state.apply(Action::GoogleCodeExchangeFailed {
            message: "invalid_grant: code already redeemed".to_owned(),
        });
        assert_eq!(
            state.google_error.as_deref(),
            Some("invalid_grant: code already redeemed")
        );
        assert_eq!(state.google, IntegrationState::Disconnected);
    }

    #[test]
    fn disconnect_success_is_unconditionally_disconnected() {
        let mut state = signed_in_state();
        connect_state(&mut state);
        let effects = state.apply(Action::DisconnectGoogle);
        assert_eq!(state.google, IntegrationState::Disconnecting);
        assert_eq!(
            effects,
            vec![Effect::DisconnectGoogle {
                user_id: "user-7".to_owned()
            }]
        );
        state.apply(Action::GoogleDisconnected);
        assert_eq!(state.google, IntegrationState::Disconnected);
        assert_eq!(
            state.google_notice.as_deref(),
            Some("Successfully disconnected from Google")
        );
    }

    #[test]
    fn disconnect_failure_surfaces_and_rereads_the_store() {
        let mut state = signed_in_state();
        connect_state(&mut state);
        state.apply(Action::DisconnectGoogle);
        let effects = state.apply(Action::GoogleDisconnectFailed {
            message: "credential delete rejected".to_owned(),
        });
        assert_eq!(
            state.google_error.as_deref(),
            Some("credential delete rejected")
        );
        assert_eq!(
            effects,
            vec![Effect::LoadGoogleStatus {
                user_id: "user-7".to_owned()
            }]
        );
    }

    #[test]
    fn signed_out_clears_user_scoped_state_but_keeps_wiring() {
        let mut state = signed_in_state();
        state.apply(Action::ChatSessionsLoaded {
            sessions: vec![session_record("s1")],
        });
        connect_state(&mut state);
        state.apply(Action::SignedOut);
        assert!(state.current_user_id.is_none());
        assert!(state.chats.is_empty());
        assert_eq!(state.google, IntegrationState::Unknown);
        assert!(state.persistence_configured);
        assert_eq!(state.google_client_id.as_deref(), Some("client-1"));
    }
}

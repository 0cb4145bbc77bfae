use anyhow::Context as _;
use std::collections::VecDeque;
use std::sync::Arc;
use sunny_api::AppSnapshot;
use sunny_domain::{
    Action, AppState, CenterPanel, Effect, GoogleAccountService, IntegrationState, NewChatSession,
    WorkspaceStoreService,
};
use tokio::sync::{mpsc, oneshot};

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub async fn app_snapshot(&self) -> anyhow::Result<AppSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::GetAppSnapshot { reply: tx })
            .await
            .context("engine unavailable")?;
        rx.await.context("engine stopped")?
    }

    pub async fn apply_client_action(&self, action: sunny_api::ClientAction) -> Result<u64, String> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(EngineCommand::ApplyClientAction { action, reply: tx })
            .await
            .is_err()
        {
            return Err("engine unavailable".to_owned());
        }
        rx.await
            .unwrap_or_else(|_| Err("engine stopped".to_owned()))
    }

    /// Fire-and-forget dispatch; commands are handled in order, so a later
    /// snapshot request observes the dispatched action applied.
    pub async fn dispatch_action(&self, action: Action) -> anyhow::Result<()> {
        self.tx
            .send(EngineCommand::DispatchAction {
                action: Box::new(action),
            })
            .await
            .context("engine unavailable")
    }
}

pub enum EngineCommand {
    GetAppSnapshot {
        reply: oneshot::Sender<anyhow::Result<AppSnapshot>>,
    },
    ApplyClientAction {
        action: sunny_api::ClientAction,
        reply: oneshot::Sender<Result<u64, String>>,
    },
    DispatchAction {
        action: Box<Action>,
    },
}

pub struct Engine {
    state: AppState,
    rev: u64,
    store: Arc<dyn WorkspaceStoreService>,
    google: Arc<dyn GoogleAccountService>,
}

impl Engine {
    pub fn start(
        store: Arc<dyn WorkspaceStoreService>,
        google: Arc<dyn GoogleAccountService>,
    ) -> EngineHandle {
        let (tx, mut rx) = mpsc::channel::<EngineCommand>(256);

        let mut engine = Self {
            state: AppState::new(),
            rev: 0,
            store,
            google,
        };

        tokio::spawn(async move {
            engine.bootstrap().await;
            while let Some(cmd) = rx.recv().await {
                engine.handle(cmd).await;
            }
        });

        EngineHandle { tx }
    }

    async fn bootstrap(&mut self) {
        self.process_action_queue(Action::AppStarted).await;
    }

    async fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::GetAppSnapshot { reply } => {
                let _ = reply.send(Ok(self.app_snapshot()));
            }
            EngineCommand::ApplyClientAction { action, reply } => {
                self.process_action_queue(map_client_action(action)).await;
                let _ = reply.send(Ok(self.rev));
            }
            EngineCommand::DispatchAction { action } => {
                self.process_action_queue(*action).await;
            }
        }
    }

    async fn process_action_queue(&mut self, initial: Action) {
        let mut actions = VecDeque::from([initial]);
        let mut effects = VecDeque::<Effect>::new();

        while let Some(action) = actions.pop_front() {
            self.rev = self.rev.saturating_add(1);
            effects.extend(self.state.apply(action));

            while let Some(effect) = effects.pop_front() {
                match self.run_effect(effect).await {
                    Ok(mut followups) => actions.append(&mut followups),
                    Err(err) => {
                        tracing::error!(error = %err, "effect failed");
                    }
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> anyhow::Result<VecDeque<Action>> {
        match effect {
            Effect::LoadShellConfig => {
                let store = self.store.clone();
                let config = tokio::task::spawn_blocking(move || store.shell_config())
                    .await
                    .context("failed to join shell config task")?;
                Ok(VecDeque::from([Action::ShellConfigLoaded { config }]))
            }

            Effect::LoadProjects { user_id } => {
                let store = self.store.clone();
                let result = tokio::task::spawn_blocking(move || store.projects_for_user(user_id))
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join load projects task".to_owned()));
                let action = match result {
                    Ok(projects) => Action::ProjectsLoaded { projects },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to load projects");
                        Action::ProjectsLoadFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::LoadChatSessions { user_id } => {
                let store = self.store.clone();
                let result =
                    tokio::task::spawn_blocking(move || store.chat_sessions_for_user(user_id))
                        .await
                        .ok()
                        .unwrap_or_else(|| Err("failed to join load sessions task".to_owned()));
                let action = match result {
                    Ok(sessions) => Action::ChatSessionsLoaded { sessions },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to load chat sessions");
                        Action::ChatSessionsLoadFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::CreateChatSession {
                user_id,
                project_id,
            } => {
                let session = NewChatSession {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id,
                    project_id,
                    name: "New Chat".to_owned(),
                };
                let store = self.store.clone();
                let result = tokio::task::spawn_blocking(move || store.create_chat_session(session))
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join create session task".to_owned()));
                let action = match result {
                    Ok(session) => Action::ChatSessionCreated { session },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to create chat session");
                        Action::ChatSessionCreateFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::RenameChatSession { session_id, title } => {
                let store = self.store.clone();
                let moved_id = session_id.clone();
                let moved_title = title.clone();
                let result = tokio::task::spawn_blocking(move || {
                    store.update_chat_session(moved_id, moved_title)
                })
                .await
                .ok()
                .unwrap_or_else(|| Err("failed to join rename session task".to_owned()));
                let action = match result {
                    Ok(()) => Action::ChatSessionRenamed { session_id, title },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to rename chat session");
                        Action::ChatSessionRenameFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::EndChatSession { session_id } => {
                let store = self.store.clone();
                let moved_id = session_id.clone();
                let result = tokio::task::spawn_blocking(move || store.end_chat_session(moved_id))
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join end session task".to_owned()));
                let action = match result {
                    Ok(()) => Action::ChatSessionEnded { session_id },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to end chat session");
                        Action::ChatSessionEndFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::UpdateProject {
                project_id,
                name,
                description,
            } => {
                let store = self.store.clone();
                let moved = (project_id.clone(), name.clone(), description.clone());
                let result = tokio::task::spawn_blocking(move || {
                    store.update_project(moved.0, moved.1, moved.2)
                })
                .await
                .ok()
                .unwrap_or_else(|| Err("failed to join update project task".to_owned()));
                let action = match result {
                    Ok(()) => Action::ProjectRenamed {
                        project_id,
                        name,
                        description,
                    },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to update project");
                        Action::ProjectRenameFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::DeleteProject { project_id } => {
                let store = self.store.clone();
                let moved_id = project_id.clone();
                let result = tokio::task::spawn_blocking(move || store.delete_project(moved_id))
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join delete project task".to_owned()));
                let action = match result {
                    Ok(()) => Action::ProjectDeleted { project_id },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to delete project");
                        Action::ProjectDeleteFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }

            Effect::LoadGoogleStatus { user_id } => {
                let google = self.google.clone();
                let result = tokio::task::spawn_blocking(move || google.load_credentials(user_id))
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join load credentials task".to_owned()));
                let action = match result {
                    Ok(credentials) => Action::GoogleStatusLoaded { credentials },
                    Err(message) => {
                        tracing::error!(error = %message, "failed to load google credentials");
                        Action::GoogleStatusLoadFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::OpenAuthorizationUrl { url } => {
                let google = self.google.clone();
                let result = tokio::task::spawn_blocking(move || google.open_authorization_url(url))
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join open url task".to_owned()));
                if let Err(message) = result {
                    tracing::error!(error = %message, "failed to open authorization url");
                }
                Ok(VecDeque::new())
            }
            Effect::ExchangeGoogleCode { user_id, code } => {
                let google = self.google.clone();
                let result =
                    tokio::task::spawn_blocking(move || google.exchange_code(user_id, code))
                        .await
                        .ok()
                        .unwrap_or_else(|| Err("failed to join token exchange task".to_owned()));
                let action = match result {
                    Ok(account) => Action::GoogleCodeExchanged {
                        email: account.email,
                    },
                    Err(message) => {
                        tracing::error!(error = %message, "token exchange failed");
                        Action::GoogleCodeExchangeFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::DisconnectGoogle { user_id } => {
                let google = self.google.clone();
                let result = tokio::task::spawn_blocking(move || {
                    let credentials = match google.load_credentials(user_id.clone()) {
                        Ok(credentials) => credentials,
                        Err(message) => {
                            tracing::warn!(error = %message, "could not read credentials before disconnect");
                            None
                        }
                    };

                    // Each revocation is attempted on its own; the tokens may
                    // already be expired or revoked upstream.
                    if let Some(credentials) = credentials {
                        if let Err(message) = google.revoke_token(credentials.access_token) {
                            tracing::warn!(error = %message, "could not revoke access token");
                        }
                        if let Some(refresh_token) = credentials.refresh_token
                            && let Err(message) = google.revoke_token(refresh_token)
                        {
                            tracing::warn!(error = %message, "could not revoke refresh token");
                        }
                    }

                    google.delete_credentials(user_id)
                })
                .await
                .ok()
                .unwrap_or_else(|| Err("failed to join disconnect task".to_owned()));
                let action = match result {
                    Ok(()) => Action::GoogleDisconnected,
                    Err(message) => {
                        tracing::error!(error = %message, "failed to delete google credentials");
                        Action::GoogleDisconnectFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::RunInitialSync { user_id } => {
                let google = self.google.clone();
                let result = tokio::task::spawn_blocking(move || google.run_initial_sync(user_id))
                    .await;
                if let Ok(Err(message)) = result {
                    tracing::warn!(error = %message, "post-connect sync failed");
                }
                Ok(VecDeque::new())
            }
        }
    }

    fn app_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            rev: self.rev,
            user_id: self.state.current_user_id.clone(),
            chats: self
                .state
                .chats
                .iter()
                .map(|chat| sunny_api::ChatSessionSnapshot {
                    id: chat.id.clone(),
                    title: chat.title.clone(),
                    created_at: chat.created_at.clone(),
                    last_message_at: chat.last_message_at.clone(),
                    unread_count: chat.unread_count,
                })
                .collect(),
            projects: self
                .state
                .projects
                .iter()
                .map(|project| sunny_api::ProjectSnapshot {
                    id: project.id.clone(),
                    name: project.name.clone(),
                    description: project.description.clone(),
                    created_by: project.created_by.clone(),
                })
                .collect(),
            active_chat_id: self.state.active_chat_id.clone(),
            active_project_id: self.state.active_project_id.clone(),
            center_panel: match self.state.center_panel() {
                CenterPanel::Welcome => sunny_api::CenterPanelSnapshot::Welcome,
                CenterPanel::ProjectDashboard { project_id } => {
                    sunny_api::CenterPanelSnapshot::ProjectDashboard { project_id }
                }
                CenterPanel::FeedList => sunny_api::CenterPanelSnapshot::FeedList,
                CenterPanel::FeedItemDetail { item_id } => {
                    sunny_api::CenterPanelSnapshot::FeedItemDetail { item_id }
                }
            },
            google: google_snapshot(&self.state),
        }
    }
}

fn google_snapshot(state: &AppState) -> sunny_api::GoogleIntegrationSnapshot {
    let status = match &state.google {
        IntegrationState::Unknown => sunny_api::GoogleConnectionStatus::Unknown,
        IntegrationState::Loading => sunny_api::GoogleConnectionStatus::Loading,
        IntegrationState::Connected { .. } => sunny_api::GoogleConnectionStatus::Connected,
        IntegrationState::Disconnected => sunny_api::GoogleConnectionStatus::Disconnected,
        IntegrationState::Connecting => sunny_api::GoogleConnectionStatus::Connecting,
        IntegrationState::Reconnecting => sunny_api::GoogleConnectionStatus::Reconnecting,
        IntegrationState::CallbackPending => sunny_api::GoogleConnectionStatus::CallbackPending,
        IntegrationState::Disconnecting => sunny_api::GoogleConnectionStatus::Disconnecting,
    };
    let (connected, email, expires_at, scope_mismatch) = match &state.google {
        IntegrationState::Connected {
            email,
            expires_at,
            scope_mismatch,
        } => (true, email.clone(), expires_at.clone(), *scope_mismatch),
        _ => (false, None, None, false),
    };
    sunny_api::GoogleIntegrationSnapshot {
        status,
        connected,
        email,
        expires_at,
        scope_mismatch,
        error: state.google_error.clone(),
        notice: state.google_notice.clone(),
    }
}

fn map_client_action(action: sunny_api::ClientAction) -> Action {
    match action {
        sunny_api::ClientAction::SignedIn { user_id } => Action::SignedIn { user_id },
        sunny_api::ClientAction::SignedOut => Action::SignedOut,
        sunny_api::ClientAction::NewChat => Action::NewChat,
        sunny_api::ClientAction::SelectChat { session_id } => Action::SelectChat { session_id },
        sunny_api::ClientAction::RenameChat { session_id, title } => {
            Action::RenameChat { session_id, title }
        }
        sunny_api::ClientAction::DeleteChat { session_id } => Action::DeleteChat { session_id },
        sunny_api::ClientAction::ProjectCreated { project } => Action::ProjectCreated {
            project: sunny_domain::ProjectRecord {
                id: project.id,
                name: project.name,
                description: project.description,
                created_by: project.created_by,
            },
        },
        sunny_api::ClientAction::SelectProject { project_id } => {
            Action::SelectProject { project_id }
        }
        sunny_api::ClientAction::RenameProject {
            project_id,
            name,
            description,
        } => Action::RenameProject {
            project_id,
            name,
            description,
        },
        sunny_api::ClientAction::DeleteProject { project_id } => {
            Action::DeleteProject { project_id }
        }
        sunny_api::ClientAction::OpenHome => Action::OpenHome,
        sunny_api::ClientAction::OpenDataFeed => Action::OpenDataFeed,
        sunny_api::ClientAction::SelectFeedItem { item_id } => Action::SelectFeedItem { item_id },
        sunny_api::ClientAction::CloseFeedItem => Action::CloseFeedItem,
        sunny_api::ClientAction::LoadIntegrationStatus => Action::LoadIntegrationStatus,
        sunny_api::ClientAction::ConnectGoogle => Action::ConnectGoogle,
        sunny_api::ClientAction::DisconnectGoogle => Action::DisconnectGoogle,
        sunny_api::ClientAction::ClearError => Action::ClearError,
        sunny_api::ClientAction::ClearNotice => Action::ClearNotice,
    }
}

pub fn new_default_services()
-> anyhow::Result<(Arc<dyn WorkspaceStoreService>, Arc<dyn GoogleAccountService>)> {
    let services =
        sunny_backend::RestShellService::from_env().context("failed to init backend services")?;
    Ok((services.clone(), services))
}

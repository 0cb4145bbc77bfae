use serde::{Deserialize, Serialize};

/// Shell wiring reported by the persistence backend before any remote call.
#[derive(Clone, Debug, Default)]
pub struct ShellConfig {
    pub persistence_configured: bool,
    pub google_client_id: Option<String>,
    pub app_origin: String,
}

/// A chat session row as stored remotely. `ended_at` is the soft-end marker:
/// ended rows stay in the store but leave the local active set.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub started_at: String,
    #[serde(default)]
    pub ended_at: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewChatSession {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
}

/// Credential row kept by the store, one per linked account.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoredGoogleCredentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub scope: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub google_email: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct ConnectedGoogleAccount {
    pub email: String,
}

/// Remote persistence for chat sessions and projects.
///
/// Failures are reported as messages; callers decide whether they surface or
/// only reach the log.
pub trait WorkspaceStoreService: Send + Sync {
    fn shell_config(&self) -> ShellConfig;

    fn projects_for_user(&self, user_id: String) -> Result<Vec<ProjectRecord>, String>;

    fn chat_sessions_for_user(&self, user_id: String) -> Result<Vec<ChatSessionRecord>, String>;

    fn create_chat_session(&self, session: NewChatSession) -> Result<ChatSessionRecord, String>;

    fn update_chat_session(&self, session_id: String, name: String) -> Result<(), String>;

    fn end_chat_session(&self, session_id: String) -> Result<(), String>;

    fn update_project(
        &self,
        project_id: String,
        name: String,
        description: String,
    ) -> Result<(), String>;

    fn delete_project(&self, project_id: String) -> Result<(), String>;
}

/// Credential store, token exchange and revocation for the Google link.
pub trait GoogleAccountService: Send + Sync {
    fn load_credentials(&self, user_id: String)
    -> Result<Option<StoredGoogleCredentials>, String>;

    fn delete_credentials(&self, user_id: String) -> Result<(), String>;

    fn exchange_code(&self, user_id: String, code: String)
    -> Result<ConnectedGoogleAccount, String>;

    fn revoke_token(&self, token: String) -> Result<(), String>;

    /// Best-effort post-connect sync hook. Failures never block a connect.
    fn run_initial_sync(&self, user_id: String) -> Result<(), String>;

    /// Hands the authorization redirect off to a full-page navigation.
    fn open_authorization_url(&self, url: String) -> Result<(), String>;
}

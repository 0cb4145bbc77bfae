use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    SignedIn {
        user_id: String,
    },
    SignedOut,

    NewChat,
    SelectChat {
        session_id: String,
    },
    RenameChat {
        session_id: String,
        title: String,
    },
    DeleteChat {
        session_id: String,
    },

    ProjectCreated {
        project: ProjectPayload,
    },
    SelectProject {
        project_id: String,
    },
    RenameProject {
        project_id: String,
        name: String,
        description: String,
    },
    DeleteProject {
        project_id: String,
    },

    OpenHome,
    OpenDataFeed,
    SelectFeedItem {
        item_id: String,
    },
    CloseFeedItem,

    LoadIntegrationStatus,
    ConnectGoogle,
    DisconnectGoogle,

    ClearError,
    ClearNotice,
}

/// A fully formed project record, as returned by the create-project dialog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSnapshot {
    pub rev: u64,
    pub user_id: Option<String>,
    pub chats: Vec<ChatSessionSnapshot>,
    pub projects: Vec<ProjectSnapshot>,
    pub active_chat_id: Option<String>,
    pub active_project_id: Option<String>,
    pub center_panel: CenterPanelSnapshot,
    pub google: GoogleIntegrationSnapshot,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSessionSnapshot {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub last_message_at: String,
    pub unread_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum CenterPanelSnapshot {
    Welcome,
    ProjectDashboard { project_id: String },
    FeedList,
    FeedItemDetail { item_id: String },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoogleConnectionStatus {
    Unknown,
    Loading,
    Connected,
    Disconnected,
    Connecting,
    Reconnecting,
    CallbackPending,
    Disconnecting,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoogleIntegrationSnapshot {
    pub status: GoogleConnectionStatus,
    pub connected: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub scope_mismatch: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

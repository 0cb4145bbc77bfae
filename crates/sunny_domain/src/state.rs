use std::collections::HashSet;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub last_message_at: String,
    pub unread_count: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CenterPanelTag {
    DataFeed,
}

/// Connection lifecycle of the linked Google account, as one tagged value.
///
/// `scope_mismatch` is derived on every transition into `Connected` from the
/// stored scope string, never carried over from a previous load.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IntegrationState {
    Unknown,
    Loading,
    Connected {
        email: Option<String>,
        expires_at: Option<String>,
        scope_mismatch: bool,
    },
    Disconnected,
    Connecting,
    Reconnecting,
    CallbackPending,
    Disconnecting,
}

impl IntegrationState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Correlates an outbound authorization redirect with its inbound callback.
///
/// `state` is the requesting user's id, not a random nonce; see the note at
/// the recording site in the reducer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingOAuthRequest {
    pub state: String,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub current_user_id: Option<String>,
    pub persistence_configured: bool,
    pub google_client_id: Option<String>,
    pub app_origin: String,

    /// Ordered as loaded from the store; new items are prepended.
    pub chats: Vec<ChatSession>,
    /// Ordered as loaded from the store; new items are prepended.
    pub projects: Vec<Project>,
    pub active_chat_id: Option<String>,
    pub active_project_id: Option<String>,

    pub center_panel_tag: Option<CenterPanelTag>,
    pub active_feed_item_id: Option<String>,

    pub google: IntegrationState,
    pub google_error: Option<String>,
    pub google_notice: Option<String>,
    pub pending_oauth: Option<PendingOAuthRequest>,
    pub(crate) handled_callbacks: HashSet<(String, String)>,
}

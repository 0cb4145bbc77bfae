mod actions;
pub use actions::Action;

mod adapters;
pub use adapters::{
    ChatSessionRecord, ConnectedGoogleAccount, GoogleAccountService, NewChatSession,
    ProjectRecord, ShellConfig, StoredGoogleCredentials, WorkspaceStoreService,
};

mod effects;
pub use effects::Effect;

pub mod oauth;

mod panel;
pub use panel::{CenterPanel, resolve_center_panel};

mod reducer;

pub mod scopes;
pub use scopes::GOOGLE_OAUTH_SCOPES;

mod state;
pub use state::*;

use crate::{ChatSessionRecord, ProjectRecord, ShellConfig, StoredGoogleCredentials};

#[derive(Clone, Debug)]
pub enum Action {
    AppStarted,
    ShellConfigLoaded {
        config: ShellConfig,
    },

    SignedIn {
        user_id: String,
    },
    SignedOut,

    ProjectsLoaded {
        projects: Vec<ProjectRecord>,
    },
    ProjectsLoadFailed {
        message: String,
    },
    ChatSessionsLoaded {
        sessions: Vec<ChatSessionRecord>,
    },
    ChatSessionsLoadFailed {
        message: String,
    },

    NewChat,
    ChatSessionCreated {
        session: ChatSessionRecord,
    },
    ChatSessionCreateFailed {
        message: String,
    },
    RenameChat {
        session_id: String,
        title: String,
    },
    ChatSessionRenamed {
        session_id: String,
        title: String,
    },
    ChatSessionRenameFailed {
        message: String,
    },
    DeleteChat {
        session_id: String,
    },
    ChatSessionEnded {
        session_id: String,
    },
    ChatSessionEndFailed {
        message: String,
    },
    SelectChat {
        session_id: String,
    },

    ProjectCreated {
        project: ProjectRecord,
    },
    RenameProject {
        project_id: String,
        name: String,
        description: String,
    },
    ProjectRenamed {
        project_id: String,
        name: String,
        description: String,
    },
    ProjectRenameFailed {
        message: String,
    },
    DeleteProject {
        project_id: String,
    },
    ProjectDeleted {
        project_id: String,
    },
    ProjectDeleteFailed {
        message: String,
    },
    SelectProject {
        project_id: String,
    },

    OpenHome,
    OpenDataFeed,
    SelectFeedItem {
        item_id: String,
    },
    CloseFeedItem,

    LoadIntegrationStatus,
    GoogleStatusLoaded {
        credentials: Option<StoredGoogleCredentials>,
    },
    GoogleStatusLoadFailed {
        message: String,
    },
    ConnectGoogle,
    GoogleAuthorizationFailed {
        error_code: String,
    },
    GoogleCallbackReceived {
        code: String,
        state: String,
    },
    GoogleCodeExchanged {
        email: String,
    },
    GoogleCodeExchangeFailed {
        message: String,
    },
    DisconnectGoogle,
    GoogleDisconnected,
    GoogleDisconnectFailed {
        message: String,
    },

    ClearError,
    ClearNotice,
}

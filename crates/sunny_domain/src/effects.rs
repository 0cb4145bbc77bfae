#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    LoadShellConfig,

    LoadProjects {
        user_id: String,
    },
    LoadChatSessions {
        user_id: String,
    },
    CreateChatSession {
        user_id: String,
        project_id: Option<String>,
    },
    RenameChatSession {
        session_id: String,
        title: String,
    },
    EndChatSession {
        session_id: String,
    },
    UpdateProject {
        project_id: String,
        name: String,
        description: String,
    },
    DeleteProject {
        project_id: String,
    },

    LoadGoogleStatus {
        user_id: String,
    },
    OpenAuthorizationUrl {
        url: String,
    },
    ExchangeGoogleCode {
        user_id: String,
        code: String,
    },
    DisconnectGoogle {
        user_id: String,
    },
    RunInitialSync {
        user_id: String,
    },
}

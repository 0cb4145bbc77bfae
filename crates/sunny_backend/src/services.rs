use anyhow::{Context as _, anyhow};
use std::sync::Arc;
use sunny_domain::{
    ChatSessionRecord, ConnectedGoogleAccount, GoogleAccountService, NewChatSession,
    ProjectRecord, ShellConfig, StoredGoogleCredentials, WorkspaceStoreService,
};

use crate::env::optional_trimmed_from_env;

mod google;
mod open_url;
mod store;

pub(crate) const STORE_URL_ENV: &str = "SUNNY_STORE_URL";
pub(crate) const STORE_SERVICE_KEY_ENV: &str = "SUNNY_STORE_SERVICE_KEY";
pub(crate) const GOOGLE_CLIENT_ID_ENV: &str = "SUNNY_GOOGLE_CLIENT_ID";
pub(crate) const APP_ORIGIN_ENV: &str = "SUNNY_APP_ORIGIN";

const DEFAULT_APP_ORIGIN: &str = "http://127.0.0.1:8484";

#[derive(Clone, Debug)]
pub(crate) struct StoreConfig {
    pub(crate) base_url: String,
    pub(crate) service_key: String,
}

/// Gateways to the hosted data store and the Google OAuth endpoints.
///
/// Store wiring is optional: with `SUNNY_STORE_URL` / `SUNNY_STORE_SERVICE_KEY`
/// unset the reachability probe reports not-configured and store calls fail
/// soft. All HTTP here is blocking; callers run these methods off the async
/// runtime.
pub struct RestShellService {
    store: Option<StoreConfig>,
    google_client_id: Option<String>,
    app_origin: String,
    http: reqwest::blocking::Client,
}

impl RestShellService {
    pub fn from_env() -> anyhow::Result<Arc<Self>> {
        let base_url = optional_trimmed_from_env(STORE_URL_ENV)?;
        let service_key = optional_trimmed_from_env(STORE_SERVICE_KEY_ENV)?;
        let store = match (base_url, service_key) {
            (Some(base_url), Some(service_key)) => Some(StoreConfig {
                base_url: base_url.trim_end_matches('/').to_owned(),
                service_key,
            }),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "{STORE_URL_ENV} and {STORE_SERVICE_KEY_ENV} must be set together"
                ));
            }
        };

        let google_client_id = optional_trimmed_from_env(GOOGLE_CLIENT_ID_ENV)?;
        let app_origin = optional_trimmed_from_env(APP_ORIGIN_ENV)?
            .unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_owned());

        let http = reqwest::blocking::Client::builder()
            .build()
            .context("failed to build http client")?;

        Ok(Arc::new(Self {
            store,
            google_client_id,
            app_origin,
            http,
        }))
    }

    pub(crate) fn store(&self) -> anyhow::Result<&StoreConfig> {
        self.store
            .as_ref()
            .ok_or_else(|| anyhow!("persistence backend is not configured"))
    }
}

impl WorkspaceStoreService for RestShellService {
    fn shell_config(&self) -> ShellConfig {
        ShellConfig {
            persistence_configured: self.store.is_some(),
            google_client_id: self.google_client_id.clone(),
            app_origin: self.app_origin.clone(),
        }
    }

    fn projects_for_user(&self, user_id: String) -> Result<Vec<ProjectRecord>, String> {
        self.fetch_projects(&user_id).map_err(|e| format!("{e:#}"))
    }

    fn chat_sessions_for_user(&self, user_id: String) -> Result<Vec<ChatSessionRecord>, String> {
        self.fetch_chat_sessions(&user_id)
            .map_err(|e| format!("{e:#}"))
    }

    fn create_chat_session(&self, session: NewChatSession) -> Result<ChatSessionRecord, String> {
        self.insert_chat_session(&session)
            .map_err(|e| format!("{e:#}"))
    }

    fn update_chat_session(&self, session_id: String, name: String) -> Result<(), String> {
        self.patch_chat_session(&session_id, serde_json::json!({ "name": name }))
            .map_err(|e| format!("{e:#}"))
    }

    fn end_chat_session(&self, session_id: String) -> Result<(), String> {
        self.patch_chat_session(&session_id, store::end_marker_patch())
            .map_err(|e| format!("{e:#}"))
    }

    fn update_project(
        &self,
        project_id: String,
        name: String,
        description: String,
    ) -> Result<(), String> {
        self.patch_project(
            &project_id,
            serde_json::json!({ "name": name, "description": description }),
        )
        .map_err(|e| format!("{e:#}"))
    }

    fn delete_project(&self, project_id: String) -> Result<(), String> {
        self.delete_project_row(&project_id)
            .map_err(|e| format!("{e:#}"))
    }
}

impl GoogleAccountService for RestShellService {
    fn load_credentials(
        &self,
        user_id: String,
    ) -> Result<Option<StoredGoogleCredentials>, String> {
        self.fetch_credentials(&user_id)
            .map_err(|e| format!("{e:#}"))
    }

    fn delete_credentials(&self, user_id: String) -> Result<(), String> {
        self.delete_credentials_row(&user_id)
            .map_err(|e| format!("{e:#}"))
    }

    fn exchange_code(
        &self,
        user_id: String,
        code: String,
    ) -> Result<ConnectedGoogleAccount, String> {
        self.post_exchange(&user_id, &code)
            .map_err(|e| format!("{e:#}"))
    }

    fn revoke_token(&self, token: String) -> Result<(), String> {
        self.post_revoke(&token).map_err(|e| format!("{e:#}"))
    }

    fn run_initial_sync(&self, user_id: String) -> Result<(), String> {
        self.post_initial_sync(&user_id)
            .map_err(|e| format!("{e:#}"))
    }

    fn open_authorization_url(&self, url: String) -> Result<(), String> {
        open_url::open_in_browser(&url).map_err(|e| format!("{e:#}"))
    }
}

use anyhow::{Context as _, anyhow};
use sunny_domain::{ChatSessionRecord, NewChatSession, ProjectRecord};

use super::RestShellService;

pub(crate) fn rest_url(base_url: &str, table: &str, query: &str) -> String {
    format!("{base_url}/rest/v1/{table}?{query}")
}

/// Soft delete: the row is kept remotely and flagged ended.
pub(crate) fn end_marker_patch() -> serde_json::Value {
    serde_json::json!({ "ended_at": chrono::Utc::now().to_rfc3339() })
}

impl RestShellService {
    fn get_rows<T: serde::de::DeserializeOwned>(&self, url: String) -> anyhow::Result<Vec<T>> {
        let store = self.store()?;
        self.http
            .get(&url)
            .header("apikey", &store.service_key)
            .bearer_auth(&store.service_key)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} was rejected"))?
            .json::<Vec<T>>()
            .with_context(|| format!("failed to decode rows from {url}"))
    }

    fn write_rows(
        &self,
        request: reqwest::blocking::RequestBuilder,
        url: &str,
    ) -> anyhow::Result<()> {
        let store = self.store()?;
        request
            .header("apikey", &store.service_key)
            .bearer_auth(&store.service_key)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} was rejected"))?;
        Ok(())
    }

    pub(crate) fn fetch_projects(&self, user_id: &str) -> anyhow::Result<Vec<ProjectRecord>> {
        let store = self.store()?;
        let url = rest_url(
            &store.base_url,
            "projects",
            &format!("created_by=eq.{user_id}&select=*&order=created_at.desc"),
        );
        self.get_rows(url)
    }

    pub(crate) fn fetch_chat_sessions(
        &self,
        user_id: &str,
    ) -> anyhow::Result<Vec<ChatSessionRecord>> {
        let store = self.store()?;
        let url = rest_url(
            &store.base_url,
            "chat_sessions",
            &format!("user_id=eq.{user_id}&select=*&order=started_at.desc"),
        );
        self.get_rows(url)
    }

    pub(crate) fn insert_chat_session(
        &self,
        session: &NewChatSession,
    ) -> anyhow::Result<ChatSessionRecord> {
        let store = self.store()?;
        let url = rest_url(&store.base_url, "chat_sessions", "select=*");
        let rows: Vec<ChatSessionRecord> = self
            .http
            .post(&url)
            .header("apikey", &store.service_key)
            .bearer_auth(&store.service_key)
            .header("Prefer", "return=representation")
            .json(session)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} was rejected"))?
            .json()
            .with_context(|| format!("failed to decode rows from {url}"))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("store returned no row for the created session"))
    }

    pub(crate) fn patch_chat_session(
        &self,
        session_id: &str,
        patch: serde_json::Value,
    ) -> anyhow::Result<()> {
        let store = self.store()?;
        let url = rest_url(
            &store.base_url,
            "chat_sessions",
            &format!("id=eq.{session_id}"),
        );
        self.write_rows(self.http.patch(&url).json(&patch), &url)
    }

    pub(crate) fn patch_project(
        &self,
        project_id: &str,
        patch: serde_json::Value,
    ) -> anyhow::Result<()> {
        let store = self.store()?;
        let url = rest_url(&store.base_url, "projects", &format!("id=eq.{project_id}"));
        self.write_rows(self.http.patch(&url).json(&patch), &url)
    }

    pub(crate) fn delete_project_row(&self, project_id: &str) -> anyhow::Result<()> {
        let store = self.store()?;
        let url = rest_url(&store.base_url, "projects", &format!("id=eq.{project_id}"));
        self.write_rows(self.http.delete(&url), &url)
    }
}

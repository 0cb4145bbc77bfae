use anyhow::{Context as _, anyhow};
use serde::Deserialize;
use sunny_domain::{ConnectedGoogleAccount, StoredGoogleCredentials, oauth};

use super::RestShellService;
use super::store::rest_url;

#[derive(Debug, Default, Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps the exchange function's reply onto the connect contract. The reply
/// carries its own failure message, which must reach the user verbatim.
fn exchange_outcome(
    http_ok: bool,
    response: ExchangeResponse,
) -> anyhow::Result<ConnectedGoogleAccount> {
    if !http_ok {
        let message = response
            .error
            .unwrap_or_else(|| "Failed to exchange token".to_owned());
        return Err(anyhow!(message));
    }
    if response.success {
        let email = response
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| anyhow!("token exchange response is missing the account email"))?;
        return Ok(ConnectedGoogleAccount { email });
    }
    let message = response
        .message
        .unwrap_or_else(|| "Failed to connect Google account".to_owned());
    Err(anyhow!(message))
}

impl RestShellService {
    pub(crate) fn fetch_credentials(
        &self,
        user_id: &str,
    ) -> anyhow::Result<Option<StoredGoogleCredentials>> {
        let store = self.store()?;
        let url = rest_url(
            &store.base_url,
            "google_credentials",
            &format!("user_id=eq.{user_id}&select=*"),
        );
        let rows: Vec<StoredGoogleCredentials> = self
            .http
            .get(&url)
            .header("apikey", &store.service_key)
            .bearer_auth(&store.service_key)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} was rejected"))?
            .json()
            .with_context(|| format!("failed to decode rows from {url}"))?;
        Ok(rows.into_iter().next())
    }

    pub(crate) fn delete_credentials_row(&self, user_id: &str) -> anyhow::Result<()> {
        let store = self.store()?;
        let url = rest_url(
            &store.base_url,
            "google_credentials",
            &format!("user_id=eq.{user_id}"),
        );
        self.http
            .delete(&url)
            .header("apikey", &store.service_key)
            .bearer_auth(&store.service_key)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} was rejected"))?;
        Ok(())
    }

    pub(crate) fn post_exchange(
        &self,
        user_id: &str,
        code: &str,
    ) -> anyhow::Result<ConnectedGoogleAccount> {
        let store = self.store()?;
        let url = format!("{}/functions/v1/exchange-google-token", store.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&store.service_key)
            .json(&serde_json::json!({ "code": code, "user_id": user_id }))
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        let http_ok = response.status().is_success();
        let reply: ExchangeResponse = response
            .json()
            .with_context(|| format!("failed to decode reply from {url}"))?;
        exchange_outcome(http_ok, reply)
    }

    pub(crate) fn post_revoke(&self, token: &str) -> anyhow::Result<()> {
        let response = self
            .http
            .post(oauth::GOOGLE_REVOKE_ENDPOINT)
            .form(&[("token", token)])
            .send()
            .context("revocation request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("revocation endpoint returned {status}"));
        }
        Ok(())
    }

    pub(crate) fn post_initial_sync(&self, user_id: &str) -> anyhow::Result<()> {
        let store = self.store()?;
        let url = format!("{}/functions/v1/calendar-initial-sync", store.base_url);
        self.http
            .post(&url)
            .bearer_auth(&store.service_key)
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} was rejected"))?;
        Ok(())
    }
}

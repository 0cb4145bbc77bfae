use crate::scopes::GOOGLE_OAUTH_SCOPES;

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";

/// The callback lands on the integrations page of this deployment.
pub fn integrations_redirect_uri(app_origin: &str) -> String {
    format!("{}/integrations", app_origin.trim_end_matches('/'))
}

/// Full authorization URL for the consent redirect.
///
/// `access_type=offline` requests a refresh token; `prompt=consent` forces
/// the consent screen so scope changes are re-presented instead of silently
/// reusing a prior grant. `state` carries the requesting user's id.
pub fn authorization_url(client_id: &str, app_origin: &str, user_id: &str) -> String {
    let params = [
        ("client_id", client_id.to_owned()),
        ("redirect_uri", integrations_redirect_uri(app_origin)),
        ("response_type", "code".to_owned()),
        ("scope", GOOGLE_OAUTH_SCOPES.join(" ")),
        ("access_type", "offline".to_owned()),
        ("prompt", "consent".to_owned()),
        ("state", user_id.to_owned()),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_query_component(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{GOOGLE_AUTH_ENDPOINT}?{query}")
}

/// Messages for the `error` query parameter a provider redirect may carry.
pub fn provider_error_message(error_code: &str) -> &'static str {
    match error_code {
        "access_denied" => "Google OAuth was denied. Please try again.",
        "invalid_request" => "Invalid OAuth request. Please try again.",
        "server_error" => "Google server error. Please try again later.",
        "temporarily_unavailable" => {
            "Google service temporarily unavailable. Please try again later."
        }
        _ => "An unexpected error occurred during OAuth.",
    }
}

fn encode_query_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

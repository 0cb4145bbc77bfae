/// Scopes requested on every authorization. Stored grants are compared
/// against this list on each status load.
pub const GOOGLE_OAUTH_SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/calendar",
];

/// Implicit identity scope some providers append to the stored grant.
const IDENTITY_SCOPE: &str = "openid";

/// Canonical form of a scope string: whitespace-tokenized, identity scope
/// dropped, sorted, re-joined. Providers may reorder or pad the stored
/// string, so equality is defined on this form, not on the raw text.
pub fn normalize_scopes(raw: &str) -> String {
    let mut scopes: Vec<&str> = raw
        .split_whitespace()
        .filter(|scope| *scope != IDENTITY_SCOPE)
        .collect();
    scopes.sort_unstable();
    scopes.join(" ")
}

pub fn scope_sets_differ(stored: &str, required: &str) -> bool {
    normalize_scopes(stored) != normalize_scopes(required)
}

/// True when the stored grant no longer matches [`GOOGLE_OAUTH_SCOPES`].
pub fn current_scope_mismatch(stored: &str) -> bool {
    scope_sets_differ(stored, &GOOGLE_OAUTH_SCOPES.join(" "))
}

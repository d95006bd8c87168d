use http::HeaderMap;
use http::header::{COOKIE, SET_COOKIE};

use google_signin::gen_random_string;

/// Cookie carrying the stable per-browser session identifier.
/// The "__Host-" prefix makes the cookie host-only.
pub const SESSION_COOKIE_NAME: &str = "__Host-StoreSessionId";

/// How long the browser keeps the session cookie, in seconds.
pub const SESSION_COOKIE_MAX_AGE: i64 = 86400;

/// Extract the session identifier from the request cookies, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!("Invalid cookie header: {e}");
            return None;
        }
    };

    cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == SESSION_COOKIE_NAME => Some(v.to_string()),
            _ => None,
        }
    })
}

/// Return the existing session identifier, or mint one and append the
/// Set-Cookie header establishing it.
pub(crate) fn ensure_session_id(
    headers: &HeaderMap,
    response_headers: &mut HeaderMap,
) -> Option<String> {
    if let Some(session_id) = session_id_from_headers(headers) {
        return Some(session_id);
    }

    let session_id = match gen_random_string(32) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to generate session identifier: {e}");
            return None;
        }
    };

    let cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age={SESSION_COOKIE_MAX_AGE}"
    );

    match cookie.parse() {
        Ok(value) => {
            response_headers.append(SET_COOKIE, value);
            Some(session_id)
        }
        Err(e) => {
            tracing::error!("Failed to build session cookie: {e}");
            None
        }
    }
}

/// Session cookie headers
///
/// The session token travels in a `session_token` cookie that scripts cannot
/// read and that is only sent on same-site requests.

use axum::http::HeaderValue;
use tally_shared::auth::middleware::SESSION_COOKIE_NAME;

use crate::error::ApiError;

/// Builds the `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> Result<HeaderValue, ApiError> {
    build(token, max_age_secs, secure)
}

/// Builds the `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, ApiError> {
    build("", 0, secure)
}

fn build(value: &str, max_age_secs: u64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE_NAME, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid cookie header: {}", e)))
}

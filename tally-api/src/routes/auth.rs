/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Log in, creating the account on first use
/// - `GET /api/auth/logout` - Clear the session cookie
/// - `GET /api/auth/magic/:token` - Redeem a magic link
/// - `GET /api/auth/session` - Current user's name
/// - `GET /api/auth/qr` - Token for the user's QR login code
///
/// Login and magic-link redemption answer with `302 Found` to `/` and set
/// the `session_token` cookie.

use crate::{
    app::AppState,
    cookie::{clear_session_cookie, session_cookie},
    error::{ApiError, ApiResult},
    extract::{CurrentUser, FormOrJson},
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tally_shared::{
    auth::{credentials, magic_link, token},
    models::session::Session,
};
use tracing::info;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username; unknown names are registered on the spot
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Session response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Name of the logged-in user
    pub username: String,
}

/// Log in or sign up
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice&password=hunter2
/// ```
///
/// JSON bodies (`{"username": ..., "password": ...}`) are accepted too.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or empty field
/// - `401 Unauthorized`: Username exists and the password is wrong
pub async fn login(
    State(state): State<AppState>,
    FormOrJson(req): FormOrJson<LoginRequest>,
) -> ApiResult<Response> {
    let outcome = credentials::authenticate(&state.db, &req.username, &req.password).await?;

    if outcome.created {
        info!(user_id = %outcome.user.id, "Registered new user");
    }

    redirect_with_session(&state, &outcome.session)
}

/// Clear the session cookie
///
/// The session row itself is left in place.
pub async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let cookie = clear_session_cookie(state.config.session.secure_cookies)?;
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]).into_response())
}

/// Redeem a magic link
///
/// The link stays valid, so the same QR code can log in several devices
/// until a new one is issued.
///
/// # Errors
///
/// - `400 Bad Request`: The token is not a well-formed token
/// - `404 Not Found`: Unknown or superseded token
pub async fn redeem_magic_link(
    State(state): State<AppState>,
    Path(link_token): Path<String>,
) -> ApiResult<Response> {
    if !token::is_well_formed(&link_token) {
        return Err(ApiError::BadRequest("Malformed magic link token".to_string()));
    }

    let (_user, session) = magic_link::redeem(&state.db, &link_token).await?;

    redirect_with_session(&state, &session)
}

/// Current user's name
pub async fn session(CurrentUser(user): CurrentUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        username: user.username,
    })
}

/// Token for the user's QR login code
///
/// Returns the user's valid magic-link token as plain text, issuing one if
/// the user has none yet.
pub async fn qr(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Response> {
    let link = magic_link::active_or_issue(&state.db, user.id).await?;

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        link.token,
    )
        .into_response())
}

fn redirect_with_session(state: &AppState, session: &Session) -> ApiResult<Response> {
    let cookie = session_cookie(
        &session.token,
        state.config.session.max_age_secs,
        state.config.session.secure_cookies,
    )?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, HeaderValue::from_static("/")),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response())
}

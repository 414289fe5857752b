/// Request extractors
///
/// - [`CurrentUser`]: the authenticated user, resolved from the session cookie
/// - [`FormOrJson`]: a validated body accepted as JSON or as a urlencoded form

use axum::{
    async_trait,
    extract::{rejection::FormRejection, rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;
use tally_shared::{
    auth::middleware::{authorize, session_token_from_headers},
    models::user::User,
};
use validator::Validate;

use crate::{app::AppState, error::ApiError};

/// The user behind the request's session cookie
///
/// Handlers that take this extractor are only reached by authenticated
/// requests; everything else is answered with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = authorize(&state.db, session_token_from_headers(&parts.headers)).await?;
        Ok(CurrentUser(user))
    }
}

/// A validated request body, decoded by its `Content-Type`
///
/// `application/json` bodies are read as JSON; anything else is read as
/// `application/x-www-form-urlencoded`.
#[derive(Debug, Clone)]
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = if is_json(&req) {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            value
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            value
        };

        value.validate()?;
        Ok(FormOrJson(value))
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

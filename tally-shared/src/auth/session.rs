/// Session issuance and resolution
///
/// Sessions are created at login and on magic-link redemption. Expiry is
/// left to the cookie's max-age; the stored row stays valid until the user
/// is deleted.

use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{token::new_token, AuthError};
use crate::models::session::Session;

/// Issues a fresh token and stores a session for the user
#[instrument(skip(pool))]
pub async fn create_session(pool: &PgPool, user_id: Uuid) -> Result<Session, AuthError> {
    let session = Session::create(pool, user_id, &new_token()).await?;
    debug!(session_id = %session.id, "Created session");
    Ok(session)
}

/// Resolves a token to its session
///
/// # Errors
///
/// - `AuthError::SessionNotFound` when no session has this token
/// - `AuthError::Database` when the lookup itself fails
pub async fn resolve_session(pool: &PgPool, token: &str) -> Result<Session, AuthError> {
    Session::find_by_token(pool, token)
        .await?
        .ok_or(AuthError::SessionNotFound)
}

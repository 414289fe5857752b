/// Passwordless login via magic links
///
/// An authenticated user asks for their QR code; the code carries the
/// user's single valid magic-link token. Scanning it on another device
/// redeems the link and logs that device in. Links stay redeemable until a
/// newer one is issued.

use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{session::create_session, token::new_token, AuthError};
use crate::models::{magic_link::MagicLink, session::Session, user::User};

/// Issues a new link for the user, invalidating earlier ones
#[instrument(skip(pool))]
pub async fn issue_magic_link(pool: &PgPool, user_id: Uuid) -> Result<MagicLink, AuthError> {
    match MagicLink::issue(pool, user_id, &new_token()).await {
        Ok(link) => Ok(link),
        Err(sqlx::Error::RowNotFound) => Err(AuthError::UserNotFound),
        Err(e) => Err(e.into()),
    }
}

/// Returns the user's valid link, issuing one if there is none
#[instrument(skip(pool))]
pub async fn active_or_issue(pool: &PgPool, user_id: Uuid) -> Result<MagicLink, AuthError> {
    if let Some(link) = MagicLink::find_active_for_user(pool, user_id).await? {
        debug!(link_id = %link.id, "Reusing active magic link");
        return Ok(link);
    }

    issue_magic_link(pool, user_id).await
}

/// Redeems a link token for a new session
///
/// The link is left valid, so redeeming it again yields another session.
///
/// # Errors
///
/// - `AuthError::MagicLinkNotFound` for unknown or superseded tokens
/// - `AuthError::UserNotFound` if the owning user is gone
pub async fn redeem(pool: &PgPool, token: &str) -> Result<(User, Session), AuthError> {
    let link = MagicLink::find_valid_by_token(pool, token)
        .await?
        .ok_or(AuthError::MagicLinkNotFound)?;

    let user = User::find_by_id(pool, link.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let session = create_session(pool, user.id).await?;

    info!(user_id = %user.id, link_id = %link.id, "Redeemed magic link");
    Ok((user, session))
}

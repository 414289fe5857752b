/// Username/password authentication
///
/// Login and signup are the same operation: the first successful call with
/// an unknown username creates the account and logs it in. Later calls with
/// that username must present the same password.

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use super::{
    password::{hash_password_blocking, verify_password_blocking},
    session::create_session,
    AuthError,
};
use crate::models::{
    session::Session,
    user::{CreateUser, User},
};

/// Result of a successful [`authenticate`] call
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated (possibly just created) user
    pub user: User,

    /// The session issued for this login
    pub session: Session,

    /// Whether this call created the account
    pub created: bool,
}

/// Logs a user in, creating the account on first use
///
/// # Errors
///
/// - `AuthError::InvalidCredentials` when the username exists and the
///   password does not match; no session is created
/// - `AuthError::Database` / `AuthError::Password` on infrastructure failure
#[instrument(skip(pool, password))]
pub async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    let (user, created) = match User::find_by_username(pool, username).await? {
        Some(user) => (verify(user, password).await?, false),
        None => {
            let password_hash = hash_password_blocking(password.to_string()).await?;
            let created = User::create_if_absent(
                pool,
                CreateUser {
                    username: username.to_string(),
                    password_hash,
                },
            )
            .await?;

            match created {
                Some(user) => (user, true),
                None => {
                    // Lost a signup race; treat the winner's account as existing
                    let user = User::find_by_username(pool, username)
                        .await?
                        .ok_or(AuthError::UserNotFound)?;
                    (verify(user, password).await?, false)
                }
            }
        }
    };

    let session = create_session(pool, user.id).await?;

    info!(user_id = %user.id, created, "User authenticated");
    Ok(LoginOutcome {
        user,
        session,
        created,
    })
}

async fn verify(user: User, password: &str) -> Result<User, AuthError> {
    if verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
        Ok(user)
    } else {
        warn!(user_id = %user.id, "Password mismatch");
        Err(AuthError::InvalidCredentials)
    }
}

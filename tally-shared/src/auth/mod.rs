/// Authentication for Tally
///
/// # Modules
///
/// - [`token`]: Opaque random tokens for sessions and magic links
/// - [`password`]: Argon2id password hashing
/// - [`credentials`]: Login-or-signup with username and password
/// - [`session`]: Session issuance and resolution
/// - [`magic_link`]: Passwordless login links (surfaced as QR codes)
/// - [`middleware`]: The access gate that turns a session cookie into a user
///
/// # Sessions
///
/// Session rows never expire server-side; the only bound on their lifetime
/// is the max-age of the cookie that carries them. There is no logout
/// operation on the server either: logging out clears the client cookie.
///
/// # Example
///
/// ```no_run
/// use tally_shared::auth::{credentials, middleware};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), tally_shared::auth::AuthError> {
/// let login = credentials::authenticate(&pool, "alice", "hunter2").await?;
/// let user = middleware::authorize(&pool, Some(login.session.token.as_str())).await?;
/// assert_eq!(user.id, login.user.id);
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod magic_link;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

use password::PasswordError;

/// Error type for authentication flows
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session token was presented
    #[error("Missing credentials")]
    MissingCredentials,

    /// The presented session token matches no session
    #[error("Session not found")]
    SessionNotFound,

    /// A session or magic link points at a user that no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Username exists and the password does not match
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The magic-link token is unknown or has been superseded
    #[error("Magic link not found")]
    MagicLinkNotFound,

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// A blocking hash task panicked or was cancelled
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl AuthError {
    /// Whether the error means "who are you?" rather than "something broke"
    ///
    /// Lookup misses on the authorization path are all reported the same way
    /// so callers cannot tell which half of the session-to-user join failed.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredentials
                | AuthError::SessionNotFound
                | AuthError::UserNotFound
                | AuthError::InvalidCredentials
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unauthorized() {
        assert!(AuthError::MissingCredentials.is_unauthorized());
        assert!(AuthError::SessionNotFound.is_unauthorized());
        assert!(AuthError::UserNotFound.is_unauthorized());
        assert!(AuthError::InvalidCredentials.is_unauthorized());

        assert!(!AuthError::MagicLinkNotFound.is_unauthorized());
        assert!(!AuthError::Database(sqlx::Error::PoolTimedOut).is_unauthorized());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::SessionNotFound.to_string(), "Session not found");
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
    }
}

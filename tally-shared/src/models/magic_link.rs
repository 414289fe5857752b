/// Magic link model and database operations
///
/// A magic link is a passwordless login token, typically rendered as a QR
/// code on an already-authenticated device. Each user has at most one valid
/// link; issuing a new one invalidates every earlier link of that user.
/// Redeeming a link does not consume it, so the same QR code keeps working
/// until it is superseded.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE magic_links (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token VARCHAR(64) NOT NULL UNIQUE,
///     valid BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX magic_links_one_valid_per_user_idx
///     ON magic_links (user_id) WHERE valid;
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Magic link model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MagicLink {
    /// Unique link ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Opaque link token
    pub token: String,

    /// False once a newer link has been issued for the same user
    pub valid: bool,

    /// When the link was issued
    pub created_at: DateTime<Utc>,
}

impl MagicLink {
    /// Issues a new valid link, invalidating all earlier links of the user
    ///
    /// Runs in one transaction that first locks the owning user row, so two
    /// concurrent issuances for the same user are applied one after the
    /// other and never leave two valid links behind.
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if the user does not exist.
    pub async fn issue(pool: &PgPool, user_id: Uuid, token: &str) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let invalidated = sqlx::query(
            r#"
            UPDATE magic_links
            SET valid = FALSE
            WHERE user_id = $1 AND valid
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let link = sqlx::query_as::<_, MagicLink>(
            r#"
            INSERT INTO magic_links (user_id, token, valid)
            VALUES ($1, $2, TRUE)
            RETURNING id, user_id, token, valid, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(%user_id, invalidated, "Issued magic link");
        Ok(link)
    }

    /// Finds the single valid link of a user
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let link = sqlx::query_as::<_, MagicLink>(
            r#"
            SELECT id, user_id, token, valid, created_at
            FROM magic_links
            WHERE user_id = $1 AND valid
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(link)
    }

    /// Finds a link by token, ignoring links that have been invalidated
    pub async fn find_valid_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let link = sqlx::query_as::<_, MagicLink>(
            r#"
            SELECT id, user_id, token, valid, created_at
            FROM magic_links
            WHERE token = $1 AND valid
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(link)
    }

    /// Counts valid links of a user (0 or 1)
    pub async fn count_valid_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM magic_links WHERE user_id = $1 AND valid")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

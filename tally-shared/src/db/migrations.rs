/// Schema bootstrap
///
/// The schema ships as sqlx migrations embedded at compile time from the
/// crate's `migrations/` directory. The server applies them when started
/// with `FIRST_RUN=true`; applying them again is a no-op.
///
/// # Example
///
/// ```no_run
/// use tally_shared::db::pool::{create_pool, DatabaseConfig};
/// use tally_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the connection drops
/// mid-migration. Each migration runs in its own transaction.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

//! Database migration command.
//!
//! Migration files live in `crates/api/migrations/` and are embedded at
//! compile time, so the binary carries them wherever it is deployed.

use super::CommandError;

/// Run all pending database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

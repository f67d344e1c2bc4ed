//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use shelter_core::error::{AppError, ErrorKind};

/// Applies pending schema migrations: principal tables and the
/// `login_identity` view.
pub async fn run_schema_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to apply schema migrations: {e}"),
                e,
            )
        })?;

    info!("Schema is up to date");
    Ok(())
}

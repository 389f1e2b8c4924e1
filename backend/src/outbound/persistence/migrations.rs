//! Embedded schema migrations applied at startup.

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to apply migrations: {message}")]
pub struct MigrationError {
    message: String,
}

impl MigrationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Apply every pending migration against `database_url`.
///
/// Diesel's migration harness needs a synchronous connection, so the work
/// runs on the blocking pool.
pub async fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || {
        let mut connection =
            PgConnection::establish(&url).map_err(|err| MigrationError::new(err.to_string()))?;
        connection
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| MigrationError::new(err.to_string()))
    })
    .await
    .map_err(|err| MigrationError::new(err.to_string()))??;
    info!(applied, "database migrations complete");
    Ok(())
}

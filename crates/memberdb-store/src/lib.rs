// MemberDB persistence layer
// sqlx/Postgres implementations of the repository seams plus the live
// tenant connector. The system pool is built once at startup and injected;
// tenant databases get short-lived per-operation pools instead.

pub mod memberships;
pub mod metadata;
pub mod tenant;
pub mod tenant_dbs;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use memberdb_commons::{AppError, AppResult};

pub use memberships::PgMembershipRepository;
pub use metadata::PgMetadataRepository;
pub use tenant::PgTenantConnector;
pub use tenant_dbs::PgTenantDatabaseRepository;

/// Embedded migrations for the system store.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Build the process-wide system store pool.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| AppError::Store(format!("cannot connect to system store: {e}")))
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| AppError::Store(format!("migration failed: {e}")))
}

/// Uniform mapping for store-side sqlx failures.
pub(crate) fn store_err(e: sqlx::Error) -> AppError {
    AppError::Store(e.to_string())
}

/// Insert-path mapping: uniqueness collisions become the 409 variant,
/// everything else stays an internal store failure.
pub(crate) fn insert_err(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateRegistration,
        _ => store_err(e),
    }
}

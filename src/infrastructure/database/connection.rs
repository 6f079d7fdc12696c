use diesel::{
    Connection, PgConnection,
    r2d2::{self, ConnectionManager},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::config::{ConfigError, StoreConfig};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Pool error: {0}")]
    Pool(String),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

pub fn create_connection_pool(config: &StoreConfig) -> Result<DbPool, DatabaseError> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());

    r2d2::Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_idle))
        .build(manager)
        .map_err(|e| DatabaseError::Pool(e.to_string()))
}

pub fn get_database_connection(config: &StoreConfig) -> Result<PgConnection, DatabaseError> {
    PgConnection::establish(&config.database_url)
        .map_err(|e| DatabaseError::Connection(e.to_string()))
}

pub fn get_connection_from_pool(pool: &DbPool) -> Result<DbConnection, DatabaseError> {
    pool.get().map_err(|e| DatabaseError::Pool(e.to_string()))
}

/// Applies pending migrations and returns the versions that ran.
pub fn run_migrations(conn: &mut PgConnection) -> Result<Vec<String>, DatabaseError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    let versions: Vec<String> = applied.iter().map(|v| v.to_string()).collect();
    for version in &versions {
        tracing::info!(version = %version, "applied migration");
    }
    Ok(versions)
}

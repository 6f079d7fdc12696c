use std::env;

use crate::domain::value_objects::EmbeddingDimension;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(String),
    #[error("Invalid value for {key}: {details}")]
    Invalid { key: String, details: String },
}

/// Runtime settings for the store, read from the environment (and `.env`).
///
/// - `DATABASE_URL` (required)
/// - `DB_MAX_CONNECTIONS` (default 10)
/// - `DB_MIN_IDLE` (default 1)
/// - `EMBEDDING_DIMENSIONS` (default 768) width of the active embedding model
/// - `RUN_MIGRATIONS` (default true)
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_idle: u32,
    pub embedding_dimension: EmbeddingDimension,
    pub run_migrations: bool,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            min_idle: 1,
            embedding_dimension: EmbeddingDimension::D768,
            run_migrations: true,
        }
    }

    pub fn with_embedding_dimension(mut self, dimension: EmbeddingDimension) -> Self {
        self.embedding_dimension = dimension;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env_required("DATABASE_URL")?;

        Ok(Self {
            database_url,
            max_connections: env_parse("DB_MAX_CONNECTIONS", "10")?,
            min_idle: env_parse("DB_MIN_IDLE", "1")?,
            embedding_dimension: env_parse("EMBEDDING_DIMENSIONS", "768")?,
            run_migrations: env_parse("RUN_MIGRATIONS", "true")?,
        })
    }
}

fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

fn env_parse<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        details: e.to_string(),
    })
}

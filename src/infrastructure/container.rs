use std::sync::Arc;

use crate::{
    application::services::ChunkService,
    config::StoreConfig,
    domain::repositories::{ChunkRepository, DocumentRepository},
    infrastructure::database::{
        DatabaseError, DbPool, create_connection_pool, get_database_connection,
        repositories::{PostgresChunkRepository, PostgresDocumentRepository},
        run_migrations,
    },
};

pub struct StoreContainer {
    pub config: StoreConfig,
    pub db_pool: DbPool,

    // Repositories
    pub chunk_repository: Arc<dyn ChunkRepository>,
    pub document_repository: Arc<dyn DocumentRepository>,

    // Application Services
    pub chunk_service: Arc<ChunkService>,
}

impl StoreContainer {
    /// Builds the pool and repositories, applying migrations first when
    /// `run_migrations` is set.
    pub fn new(config: StoreConfig) -> Result<Self, DatabaseError> {
        if config.run_migrations {
            let mut conn = get_database_connection(&config)?;
            run_migrations(&mut conn)?;
        }

        let db_pool = create_connection_pool(&config)?;

        let chunk_repository: Arc<dyn ChunkRepository> =
            Arc::new(PostgresChunkRepository::new(db_pool.clone()));
        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(PostgresDocumentRepository::new(db_pool.clone()));

        let chunk_service = Arc::new(ChunkService::new(
            chunk_repository.clone(),
            config.embedding_dimension,
        ));

        tracing::info!(
            active_dimension = %config.embedding_dimension,
            max_connections = config.max_connections,
            "store container ready"
        );

        Ok(Self {
            config,
            db_pool,
            chunk_repository,
            document_repository,
            chunk_service,
        })
    }

    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::new(StoreConfig::from_env()?)
    }
}

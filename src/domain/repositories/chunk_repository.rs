use async_trait::async_trait;

use crate::domain::entities::{
    ChunkChanges, DimensionStats, LectureChunk, NewLectureChunk, SearchRequest, SimilarChunk,
};
use crate::domain::value_objects::EmbeddingDimension;

#[derive(Debug, thiserror::Error)]
pub enum ChunkRepositoryError {
    /// Storage-layer failure, passed through untranslated. A vector whose
    /// length does not match the table lands here with Postgres' own message.
    #[error("Database error: {0}")]
    Database(String),
    #[error("Chunk {id} not found in {dimension}-dimension table")]
    NotFound { dimension: EmbeddingDimension, id: i64 },
}

/// Chunk storage partitioned by embedding width.
///
/// Every operation names its dimension; there is no default table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    async fn insert(
        &self,
        dimension: EmbeddingDimension,
        chunk: &NewLectureChunk,
    ) -> Result<i64, ChunkRepositoryError>;

    /// Inserts every chunk or none of them.
    async fn insert_batch(
        &self,
        dimension: EmbeddingDimension,
        chunks: &[NewLectureChunk],
    ) -> Result<Vec<i64>, ChunkRepositoryError>;

    async fn find_by_id(
        &self,
        dimension: EmbeddingDimension,
        id: i64,
    ) -> Result<Option<LectureChunk>, ChunkRepositoryError>;

    async fn update(
        &self,
        dimension: EmbeddingDimension,
        id: i64,
        changes: &ChunkChanges,
    ) -> Result<LectureChunk, ChunkRepositoryError>;

    async fn delete(
        &self,
        dimension: EmbeddingDimension,
        id: i64,
    ) -> Result<bool, ChunkRepositoryError>;

    async fn delete_by_source_file(
        &self,
        dimension: EmbeddingDimension,
        source_file: &str,
    ) -> Result<usize, ChunkRepositoryError>;

    async fn count(&self, dimension: EmbeddingDimension) -> Result<i64, ChunkRepositoryError>;

    async fn search(
        &self,
        dimension: EmbeddingDimension,
        request: &SearchRequest,
    ) -> Result<Vec<SimilarChunk>, ChunkRepositoryError>;

    /// Empties one table and restarts its identity sequence.
    async fn clear(&self, dimension: EmbeddingDimension) -> Result<(), ChunkRepositoryError>;

    /// Empties every table in a single statement and restarts identities.
    async fn clear_all(&self) -> Result<(), ChunkRepositoryError>;

    /// One row per dimension, ordered by width.
    async fn stats(&self) -> Result<Vec<DimensionStats>, ChunkRepositoryError>;
}

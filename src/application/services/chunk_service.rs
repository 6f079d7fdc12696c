use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::entities::{
    ChunkChanges, DimensionStats, LectureChunk, NewLectureChunk, SearchRequest, SimilarChunk,
};
use crate::domain::repositories::{ChunkRepository, ChunkRepositoryError};
use crate::domain::value_objects::{EmbeddingDimension, IndexStrategy, UnsupportedDimension};

#[derive(Debug, thiserror::Error)]
pub enum ChunkServiceError {
    #[error(transparent)]
    UnsupportedDimension(#[from] UnsupportedDimension),
    #[error("Embedding has {actual} dimensions but the active model produces {expected}")]
    DimensionMismatch {
        expected: EmbeddingDimension,
        actual: usize,
    },
    #[error(transparent)]
    Repository(#[from] ChunkRepositoryError),
}

/// Routes chunk traffic to the table matching the configured embedding model.
///
/// Vectors are checked against the active dimension before they reach the
/// store, so a model swap shows up as a `DimensionMismatch` instead of a
/// Postgres cast error.
pub struct ChunkService {
    repository: Arc<dyn ChunkRepository>,
    active_dimension: EmbeddingDimension,
    scan_warning_logged: AtomicBool,
}

impl ChunkService {
    pub fn new(repository: Arc<dyn ChunkRepository>, active_dimension: EmbeddingDimension) -> Self {
        Self {
            repository,
            active_dimension,
            scan_warning_logged: AtomicBool::new(false),
        }
    }

    pub fn active_dimension(&self) -> EmbeddingDimension {
        self.active_dimension
    }

    fn resolve(&self, width: usize) -> Result<EmbeddingDimension, ChunkServiceError> {
        if width == self.active_dimension.width() {
            return Ok(self.active_dimension);
        }
        let dimension = EmbeddingDimension::from_width(width)?;
        tracing::warn!(
            active = %self.active_dimension,
            received = %dimension,
            "embedding width does not match the active model"
        );
        Err(ChunkServiceError::DimensionMismatch {
            expected: self.active_dimension,
            actual: width,
        })
    }

    fn check_chunk(&self, chunk: &NewLectureChunk) -> Result<(), ChunkServiceError> {
        match chunk.embedding_width() {
            Some(width) => self.resolve(width).map(|_| ()),
            None => Ok(()),
        }
    }

    pub async fn ingest(&self, chunk: &NewLectureChunk) -> Result<i64, ChunkServiceError> {
        self.check_chunk(chunk)?;
        Ok(self.repository.insert(self.active_dimension, chunk).await?)
    }

    /// Validates the whole batch before writing any of it.
    pub async fn ingest_batch(
        &self,
        chunks: &[NewLectureChunk],
    ) -> Result<Vec<i64>, ChunkServiceError> {
        for chunk in chunks {
            self.check_chunk(chunk)?;
        }
        Ok(self
            .repository
            .insert_batch(self.active_dimension, chunks)
            .await?)
    }

    pub async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<SimilarChunk>, ChunkServiceError> {
        let dimension = self.resolve(request.query_width())?;

        if dimension.index_strategy() == IndexStrategy::SequentialScan
            && !self.scan_warning_logged.swap(true, Ordering::Relaxed)
        {
            tracing::warn!(
                dimension = %dimension,
                "no ANN index for this width, searches scan the whole table"
            );
        }

        Ok(self.repository.search(dimension, request).await?)
    }

    pub async fn find(&self, id: i64) -> Result<Option<LectureChunk>, ChunkServiceError> {
        Ok(self.repository.find_by_id(self.active_dimension, id).await?)
    }

    pub async fn update(
        &self,
        id: i64,
        changes: &ChunkChanges,
    ) -> Result<LectureChunk, ChunkServiceError> {
        if let Some(embedding) = &changes.embedding {
            self.resolve(embedding.as_slice().len())?;
        }
        Ok(self
            .repository
            .update(self.active_dimension, id, changes)
            .await?)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, ChunkServiceError> {
        Ok(self.repository.delete(self.active_dimension, id).await?)
    }

    pub async fn delete_by_source_file(&self, source_file: &str) -> Result<usize, ChunkServiceError> {
        Ok(self
            .repository
            .delete_by_source_file(self.active_dimension, source_file)
            .await?)
    }

    pub async fn count(&self) -> Result<i64, ChunkServiceError> {
        Ok(self.repository.count(self.active_dimension).await?)
    }

    pub async fn clear(&self) -> Result<(), ChunkServiceError> {
        Ok(self.repository.clear(self.active_dimension).await?)
    }

    pub async fn clear_all(&self) -> Result<(), ChunkServiceError> {
        Ok(self.repository.clear_all().await?)
    }

    pub async fn stats(&self) -> Result<Vec<DimensionStats>, ChunkServiceError> {
        Ok(self.repository.stats().await?)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EmbeddingDimension;

/// One row of the `lecture_chunks_stats` report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionStats {
    pub dimension: EmbeddingDimension,
    pub total_chunks: i64,
    pub chunks_with_embeddings: i64,
    pub unique_source_files: i64,
    pub avg_content_length: Option<f64>,
    pub first_chunk_at: Option<DateTime<Utc>>,
    pub last_chunk_at: Option<DateTime<Utc>>,
}

impl DimensionStats {
    pub fn empty(dimension: EmbeddingDimension) -> Self {
        Self {
            dimension,
            total_chunks: 0,
            chunks_with_embeddings: 0,
            unique_source_files: 0,
            avg_content_length: None,
            first_chunk_at: None,
            last_chunk_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_chunks == 0
    }

    pub fn chunks_without_embeddings(&self) -> i64 {
        self.total_chunks - self.chunks_with_embeddings
    }
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Jsonb, Nullable, Text, Timestamptz};
use pgvector::Vector;

use crate::domain::entities::{DimensionStats, LectureChunk, SimilarChunk};
use crate::domain::value_objects::EmbeddingDimension;

// Rows of the lecture_chunks_{width} tables. Every width shares the same
// column layout, so one by-name row type serves all of them.

#[derive(Debug, Clone, QueryableByName)]
pub struct LectureChunkRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub text: String,
    #[diesel(sql_type = Nullable<pgvector::sql_types::Vector>)]
    pub embedding: Option<Vector>,
    #[diesel(sql_type = Jsonb)]
    pub metadata: serde_json::Value,
    #[diesel(sql_type = Nullable<Integer>)]
    pub chunk_index: Option<i32>,
    #[diesel(sql_type = Nullable<Integer>)]
    pub content_length: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    pub source_file: Option<String>,
    #[diesel(sql_type = Text)]
    pub document_type: String,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

impl LectureChunkRow {
    pub fn into_domain(self, dimension: EmbeddingDimension) -> LectureChunk {
        LectureChunk::from_storage(
            self.id,
            dimension,
            self.text,
            self.embedding,
            self.metadata,
            self.chunk_index,
            self.content_length,
            self.source_file,
            self.document_type,
            self.created_at,
            self.updated_at,
        )
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct SimilarChunkRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub text: String,
    #[diesel(sql_type = Double)]
    pub similarity: f64,
    #[diesel(sql_type = Jsonb)]
    pub metadata: serde_json::Value,
    #[diesel(sql_type = Nullable<Text>)]
    pub source_file: Option<String>,
    #[diesel(sql_type = Nullable<Integer>)]
    pub chunk_index: Option<i32>,
}

impl From<SimilarChunkRow> for SimilarChunk {
    fn from(row: SimilarChunkRow) -> Self {
        SimilarChunk {
            id: row.id,
            text: row.text,
            similarity: row.similarity,
            metadata: row.metadata,
            source_file: row.source_file,
            chunk_index: row.chunk_index,
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct DimensionStatsRow {
    #[diesel(sql_type = Integer)]
    pub dimension: i32,
    #[diesel(sql_type = BigInt)]
    pub total_chunks: i64,
    #[diesel(sql_type = BigInt)]
    pub chunks_with_embeddings: i64,
    #[diesel(sql_type = BigInt)]
    pub unique_source_files: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_content_length: Option<f64>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub first_chunk_at: Option<DateTime<Utc>>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub last_chunk_at: Option<DateTime<Utc>>,
}

impl TryFrom<DimensionStatsRow> for DimensionStats {
    type Error = String;

    fn try_from(row: DimensionStatsRow) -> Result<Self, Self::Error> {
        let width = usize::try_from(row.dimension)
            .map_err(|_| format!("Invalid dimension in stats view: {}", row.dimension))?;
        let dimension = EmbeddingDimension::from_width(width).map_err(|e| e.to_string())?;

        Ok(DimensionStats {
            dimension,
            total_chunks: row.total_chunks,
            chunks_with_embeddings: row.chunks_with_embeddings,
            unique_source_files: row.unique_source_files,
            avg_content_length: row.avg_content_length,
            first_chunk_at: row.first_chunk_at,
            last_chunk_at: row.last_chunk_at,
        })
    }
}

#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct InsertedId {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
}

#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

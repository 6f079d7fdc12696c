use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EmbeddingDimension;

pub const DEFAULT_DOCUMENT_TYPE: &str = "lecture";

/// A chunk as stored in one of the `lecture_chunks_{width}` tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureChunk {
    id: i64,
    dimension: EmbeddingDimension,
    text: String,
    embedding: Option<Vector>,
    metadata: serde_json::Value,
    chunk_index: Option<i32>,
    content_length: Option<i32>,
    source_file: Option<String>,
    document_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LectureChunk {
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: i64,
        dimension: EmbeddingDimension,
        text: String,
        embedding: Option<Vector>,
        metadata: serde_json::Value,
        chunk_index: Option<i32>,
        content_length: Option<i32>,
        source_file: Option<String>,
        document_type: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            dimension,
            text,
            embedding,
            metadata,
            chunk_index,
            content_length,
            source_file,
            document_type,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn dimension(&self) -> EmbeddingDimension {
        self.dimension
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> Option<&Vector> {
        self.embedding.as_ref()
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn chunk_index(&self) -> Option<i32> {
        self.chunk_index
    }

    pub fn content_length(&self) -> Option<i32> {
        self.content_length
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Rows without an embedding are skipped by similarity search.
    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }
}

/// Insert payload for a chunk. The target table is chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLectureChunk {
    text: String,
    embedding: Option<Vector>,
    metadata: serde_json::Value,
    chunk_index: Option<i32>,
    content_length: Option<i32>,
    source_file: Option<String>,
    document_type: String,
}

impl NewLectureChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embedding: None,
            metadata: serde_json::Value::Object(Default::default()),
            chunk_index: None,
            content_length: None,
            source_file: None,
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
        }
    }

    pub fn with_embedding(mut self, embedding: impl Into<Vector>) -> Self {
        self.embedding = Some(embedding.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_chunk_index(mut self, chunk_index: i32) -> Self {
        self.chunk_index = Some(chunk_index);
        self
    }

    pub fn with_content_length(mut self, content_length: i32) -> Self {
        self.content_length = Some(content_length);
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> Option<&Vector> {
        self.embedding.as_ref()
    }

    pub fn embedding_width(&self) -> Option<usize> {
        self.embedding.as_ref().map(|v| v.as_slice().len())
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn chunk_index(&self) -> Option<i32> {
        self.chunk_index
    }

    /// Explicit length if one was given, otherwise the character count of the text.
    pub fn content_length(&self) -> i32 {
        self.content_length
            .unwrap_or_else(|| i32::try_from(self.text.chars().count()).unwrap_or(i32::MAX))
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }
}

/// Content or metadata correction for an existing chunk. Unset fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkChanges {
    pub text: Option<String>,
    pub embedding: Option<Vector>,
    pub metadata: Option<serde_json::Value>,
    pub chunk_index: Option<i32>,
    pub source_file: Option<String>,
    pub document_type: Option<String>,
}

impl ChunkChanges {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.embedding.is_none()
            && self.metadata.is_none()
            && self.chunk_index.is_none()
            && self.source_file.is_none()
            && self.document_type.is_none()
    }
}

use pgvector::Vector;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MATCH_COUNT: usize = 5;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.0;

/// Nearest-neighbour query against one embedding table.
///
/// `similarity` is `1 - cosine_distance`; rows below `similarity_threshold`
/// and rows without an embedding are never returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    query_embedding: Vector,
    match_count: usize,
    similarity_threshold: f64,
    source_file: Option<String>,
    metadata_filter: Option<serde_json::Value>,
}

impl SearchRequest {
    pub fn new(query_embedding: impl Into<Vector>) -> Self {
        Self {
            query_embedding: query_embedding.into(),
            match_count: DEFAULT_MATCH_COUNT,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            source_file: None,
            metadata_filter: None,
        }
    }

    pub fn with_match_count(mut self, match_count: usize) -> Self {
        self.match_count = match_count;
        self
    }

    pub fn with_similarity_threshold(mut self, similarity_threshold: f64) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    /// Restrict matches to chunks of one source document.
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Restrict matches to rows whose metadata contains this JSON document (`@>`).
    pub fn with_metadata_filter(mut self, filter: serde_json::Value) -> Self {
        self.metadata_filter = Some(filter);
        self
    }

    pub fn query_embedding(&self) -> &Vector {
        &self.query_embedding
    }

    pub fn query_width(&self) -> usize {
        self.query_embedding.as_slice().len()
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn metadata_filter(&self) -> Option<&serde_json::Value> {
        self.metadata_filter.as_ref()
    }

    /// A zero limit can be answered without touching storage.
    pub fn is_empty_limit(&self) -> bool {
        self.match_count == 0
    }
}

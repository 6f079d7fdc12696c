use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarChunk {
    pub id: i64,
    pub text: String,
    pub similarity: f64,
    pub metadata: serde_json::Value,
    pub source_file: Option<String>,
    pub chunk_index: Option<i32>,
}

use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EmbeddingDimension;

/// Embedding width of the graph-RAG `documents` table.
pub const DOCUMENT_DIMENSION: EmbeddingDimension = EmbeddingDimension::D768;

pub const DOCUMENT_NODE_TYPE: &str = "Document";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub content: String,
    pub embedding: Option<Vector>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub content: String,
    pub embedding: Option<Vector>,
    pub metadata: serde_json::Value,
}

impl NewDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embedding: None,
            metadata: serde_json::Value::Object(Default::default()),
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

    /// `metadata.source` as stored, or `"unknown"` when the key is absent.
    pub fn source(&self) -> serde_json::Value {
        self.metadata
            .get("source")
            .cloned()
            .unwrap_or_else(|| serde_json::Value::from("unknown"))
    }

    /// The node a freshly ingested document is linked to: the knowledge-graph
    /// node shares the document id.
    pub fn document_node(&self, document_id: i64) -> NewDocumentNode {
        NewDocumentNode {
            node_id: document_id,
            node_type: DOCUMENT_NODE_TYPE.to_string(),
            properties: serde_json::json!({ "source": self.source() }),
        }
    }
}

/// Link between a document and a node of the external knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub id: i64,
    pub document_id: i64,
    pub node_id: i64,
    pub node_type: String,
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocumentNode {
    pub node_id: i64,
    pub node_type: String,
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDocument {
    pub id: i64,
    pub content: String,
    pub metadata: serde_json::Value,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_documents: i64,
    pub documents_with_embeddings: i64,
    pub unique_sources: i64,
    pub first_document_at: Option<DateTime<Utc>>,
    pub last_document_at: Option<DateTime<Utc>>,
}

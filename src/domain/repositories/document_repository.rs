use async_trait::async_trait;

use crate::domain::entities::{
    Document, DocumentNode, DocumentStats, NewDocument, NewDocumentNode, SearchRequest,
    SimilarDocument,
};

#[derive(Debug, thiserror::Error)]
pub enum DocumentRepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Document not found: {0}")]
    NotFound(i64),
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Stores the document and links it to its own graph node in one transaction.
    async fn ingest(&self, document: &NewDocument) -> Result<i64, DocumentRepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DocumentRepositoryError>;

    /// Returns false when the document is already linked to that node.
    async fn link_node(
        &self,
        document_id: i64,
        node: &NewDocumentNode,
    ) -> Result<bool, DocumentRepositoryError>;

    async fn nodes_for(&self, document_id: i64)
    -> Result<Vec<DocumentNode>, DocumentRepositoryError>;

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<SimilarDocument>, DocumentRepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), DocumentRepositoryError>;

    async fn stats(&self) -> Result<DocumentStats, DocumentRepositoryError>;
}

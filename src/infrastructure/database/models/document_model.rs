use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Jsonb, Nullable, Text, Timestamptz};
use pgvector::Vector;
use serde::Serialize;

use crate::domain::entities::{
    Document, DocumentNode, DocumentStats, NewDocument, NewDocumentNode, SimilarDocument,
};
use crate::infrastructure::database::schema::{document_nodes, documents};

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: i64,
    pub content: String,
    pub embedding: Option<Vector>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub content: String,
    pub embedding: Option<Vector>,
    pub metadata: serde_json::Value,
}

impl From<&NewDocument> for NewDocumentModel {
    fn from(document: &NewDocument) -> Self {
        Self {
            content: document.content.clone(),
            embedding: document.embedding.clone(),
            metadata: document.metadata.clone(),
        }
    }
}

impl From<DocumentModel> for Document {
    fn from(model: DocumentModel) -> Self {
        Document {
            id: model.id,
            content: model.content,
            embedding: model.embedding,
            metadata: model.metadata,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(DocumentModel, foreign_key = document_id))]
#[diesel(table_name = document_nodes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentNodeModel {
    pub id: i64,
    pub document_id: i64,
    pub node_id: i64,
    pub node_type: String,
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_nodes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentNodeModel {
    pub document_id: i64,
    pub node_id: i64,
    pub node_type: String,
    pub properties: serde_json::Value,
}

impl NewDocumentNodeModel {
    pub fn new(document_id: i64, node: &NewDocumentNode) -> Self {
        Self {
            document_id,
            node_id: node.node_id,
            node_type: node.node_type.clone(),
            properties: node.properties.clone(),
        }
    }
}

impl From<DocumentNodeModel> for DocumentNode {
    fn from(model: DocumentNodeModel) -> Self {
        DocumentNode {
            id: model.id,
            document_id: model.document_id,
            node_id: model.node_id,
            node_type: model.node_type,
            properties: model.properties,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct SimilarDocumentRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub content: String,
    #[diesel(sql_type = Double)]
    pub similarity: f64,
    #[diesel(sql_type = Jsonb)]
    pub metadata: serde_json::Value,
}

impl From<SimilarDocumentRow> for SimilarDocument {
    fn from(row: SimilarDocumentRow) -> Self {
        SimilarDocument {
            id: row.id,
            content: row.content,
            metadata: row.metadata,
            similarity: row.similarity,
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct DocumentStatsRow {
    #[diesel(sql_type = BigInt)]
    pub total_documents: i64,
    #[diesel(sql_type = BigInt)]
    pub documents_with_embeddings: i64,
    #[diesel(sql_type = BigInt)]
    pub unique_sources: i64,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub first_document_at: Option<DateTime<Utc>>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub last_document_at: Option<DateTime<Utc>>,
}

impl From<DocumentStatsRow> for DocumentStats {
    fn from(row: DocumentStatsRow) -> Self {
        DocumentStats {
            total_documents: row.total_documents,
            documents_with_embeddings: row.documents_with_embeddings,
            unique_sources: row.unique_sources,
            first_document_at: row.first_document_at,
            last_document_at: row.last_document_at,
        }
    }
}

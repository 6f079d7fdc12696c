use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Jsonb, Text};
use pgvector::sql_types::Vector as VectorSql;

use crate::domain::entities::{
    DOCUMENT_DIMENSION, Document, DocumentNode, DocumentStats, NewDocument, NewDocumentNode,
    SearchRequest, SimilarDocument,
};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::infrastructure::database::models::{
    DocumentModel, DocumentNodeModel, DocumentStatsRow, NewDocumentModel, NewDocumentNodeModel,
    SimilarDocumentRow,
};
use crate::infrastructure::database::schema::{document_nodes, documents};
use crate::infrastructure::database::{DbPool, get_connection_from_pool, queries};

/// Graph-RAG documents: a single 768-wide table plus its knowledge-graph node links.
pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_connection<T, F>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, DocumentRepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection_from_pool(&pool)
                .map_err(|e| DocumentRepositoryError::Database(e.to_string()))?;
            work(&mut *conn).map_err(|e| {
                DocumentRepositoryError::Database(format!("Failed to {}: {}", operation, e))
            })
        })
        .await
        .map_err(|e| DocumentRepositoryError::Database(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn ingest(&self, document: &NewDocument) -> Result<i64, DocumentRepositoryError> {
        let document = document.clone();

        let id = self
            .with_connection("ingest document", move |conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    let id: i64 = diesel::insert_into(documents::table)
                        .values(&NewDocumentModel::from(&document))
                        .returning(documents::id)
                        .get_result(conn)?;

                    let node = NewDocumentNodeModel::new(id, &document.document_node(id));
                    diesel::insert_into(document_nodes::table)
                        .values(&node)
                        .on_conflict_do_nothing()
                        .execute(conn)?;

                    Ok(id)
                })
            })
            .await?;

        tracing::info!(id, "ingested document");
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DocumentRepositoryError> {
        let model = self
            .with_connection("find document", move |conn| {
                documents::table
                    .find(id)
                    .select(DocumentModel::as_select())
                    .first(conn)
                    .optional()
            })
            .await?;

        Ok(model.map(Document::from))
    }

    async fn link_node(
        &self,
        document_id: i64,
        node: &NewDocumentNode,
    ) -> Result<bool, DocumentRepositoryError> {
        let model = NewDocumentNodeModel::new(document_id, node);

        let inserted = self
            .with_connection("link document node", move |conn| {
                diesel::insert_into(document_nodes::table)
                    .values(&model)
                    .on_conflict((document_nodes::document_id, document_nodes::node_id))
                    .do_nothing()
                    .execute(conn)
            })
            .await?;

        Ok(inserted > 0)
    }

    async fn nodes_for(
        &self,
        document_id: i64,
    ) -> Result<Vec<DocumentNode>, DocumentRepositoryError> {
        let models = self
            .with_connection("load document nodes", move |conn| {
                document_nodes::table
                    .filter(document_nodes::document_id.eq(document_id))
                    .order(document_nodes::node_id.asc())
                    .select(DocumentNodeModel::as_select())
                    .load(conn)
            })
            .await?;

        Ok(models.into_iter().map(DocumentNode::from).collect())
    }

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<SimilarDocument>, DocumentRepositoryError> {
        if request.is_empty_limit() {
            return Ok(Vec::new());
        }
        let request = request.clone();

        let rows = self
            .with_connection("search documents", move |conn| {
                let plan = queries::search_documents(
                    DOCUMENT_DIMENSION,
                    request.source_file().is_some(),
                    request.metadata_filter().is_some(),
                );
                let limit = i64::try_from(request.match_count()).unwrap_or(i64::MAX);

                let mut query = diesel::sql_query(plan.sql)
                    .into_boxed::<Pg>()
                    .bind::<VectorSql, _>(request.query_embedding().clone())
                    .bind::<Double, _>(request.similarity_threshold());

                if let (true, Some(source)) = (plan.binds_source_file, request.source_file()) {
                    query = query.bind::<Text, _>(source.to_string());
                }
                if let (true, Some(filter)) =
                    (plan.binds_metadata_filter, request.metadata_filter())
                {
                    query = query.bind::<Jsonb, _>(filter.clone());
                }

                query
                    .bind::<BigInt, _>(limit)
                    .load::<SimilarDocumentRow>(conn)
            })
            .await?;

        tracing::debug!(matches = rows.len(), "document similarity search");
        Ok(rows.into_iter().map(SimilarDocument::from).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), DocumentRepositoryError> {
        let deleted = self
            .with_connection("delete document", move |conn| {
                diesel::delete(documents::table.find(id)).execute(conn)
            })
            .await?;

        if deleted == 0 {
            return Err(DocumentRepositoryError::NotFound(id));
        }
        tracing::info!(id, "deleted document");
        Ok(())
    }

    async fn stats(&self) -> Result<DocumentStats, DocumentRepositoryError> {
        let row = self
            .with_connection("load document stats", |conn| {
                diesel::sql_query(queries::SELECT_DOCUMENT_STATS).get_result::<DocumentStatsRow>(conn)
            })
            .await?;

        Ok(DocumentStats::from(row))
    }
}

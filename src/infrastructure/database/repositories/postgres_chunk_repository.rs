use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Jsonb, Nullable, Text};
use pgvector::sql_types::Vector as VectorSql;

use crate::domain::entities::{
    ChunkChanges, DimensionStats, LectureChunk, NewLectureChunk, SearchRequest, SimilarChunk,
};
use crate::domain::repositories::{ChunkRepository, ChunkRepositoryError};
use crate::domain::value_objects::EmbeddingDimension;
use crate::infrastructure::database::models::{
    CountRow, DimensionStatsRow, InsertedId, LectureChunkRow, SimilarChunkRow,
};
use crate::infrastructure::database::{DbPool, get_connection_from_pool, queries};

pub struct PostgresChunkRepository {
    pool: DbPool,
}

impl PostgresChunkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs blocking diesel work on the blocking pool with a pooled connection.
    async fn with_connection<T, F>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, ChunkRepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection_from_pool(&pool)
                .map_err(|e| ChunkRepositoryError::Database(e.to_string()))?;
            work(&mut *conn).map_err(|e| {
                ChunkRepositoryError::Database(format!("Failed to {}: {}", operation, e))
            })
        })
        .await
        .map_err(|e| ChunkRepositoryError::Database(format!("Task join error: {}", e)))?
    }
}

fn insert_chunk(
    conn: &mut PgConnection,
    dimension: EmbeddingDimension,
    chunk: &NewLectureChunk,
) -> QueryResult<i64> {
    diesel::sql_query(queries::insert_chunk(dimension))
        .bind::<Text, _>(chunk.text())
        .bind::<Nullable<VectorSql>, _>(chunk.embedding())
        .bind::<Jsonb, _>(chunk.metadata())
        .bind::<Nullable<Integer>, _>(chunk.chunk_index())
        .bind::<Nullable<Integer>, _>(Some(chunk.content_length()))
        .bind::<Nullable<Text>, _>(chunk.source_file())
        .bind::<Text, _>(chunk.document_type())
        .get_result::<InsertedId>(conn)
        .map(|row| row.id)
}

fn search_chunks(
    conn: &mut PgConnection,
    dimension: EmbeddingDimension,
    request: &SearchRequest,
) -> QueryResult<Vec<SimilarChunkRow>> {
    let plan = queries::search_chunks(
        dimension,
        request.source_file().is_some(),
        request.metadata_filter().is_some(),
    );
    let limit = i64::try_from(request.match_count()).unwrap_or(i64::MAX);

    let mut query = diesel::sql_query(plan.sql)
        .into_boxed::<Pg>()
        .bind::<VectorSql, _>(request.query_embedding().clone())
        .bind::<Double, _>(request.similarity_threshold());

    if let (true, Some(source_file)) = (plan.binds_source_file, request.source_file()) {
        query = query.bind::<Text, _>(source_file.to_string());
    }
    if let (true, Some(filter)) = (plan.binds_metadata_filter, request.metadata_filter()) {
        query = query.bind::<Jsonb, _>(filter.clone());
    }

    query.bind::<BigInt, _>(limit).load::<SimilarChunkRow>(conn)
}

#[async_trait]
impl ChunkRepository for PostgresChunkRepository {
    async fn insert(
        &self,
        dimension: EmbeddingDimension,
        chunk: &NewLectureChunk,
    ) -> Result<i64, ChunkRepositoryError> {
        let chunk = chunk.clone();

        let id = self
            .with_connection("insert chunk", move |conn| {
                insert_chunk(conn, dimension, &chunk)
            })
            .await?;

        tracing::debug!(dimension = %dimension, id, "inserted chunk");
        Ok(id)
    }

    async fn insert_batch(
        &self,
        dimension: EmbeddingDimension,
        chunks: &[NewLectureChunk],
    ) -> Result<Vec<i64>, ChunkRepositoryError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let chunks = chunks.to_vec();

        let ids = self
            .with_connection("insert chunk batch", move |conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    chunks
                        .iter()
                        .map(|chunk| insert_chunk(conn, dimension, chunk))
                        .collect::<QueryResult<Vec<i64>>>()
                })
            })
            .await?;

        tracing::info!(dimension = %dimension, count = ids.len(), "inserted chunk batch");
        Ok(ids)
    }

    async fn find_by_id(
        &self,
        dimension: EmbeddingDimension,
        id: i64,
    ) -> Result<Option<LectureChunk>, ChunkRepositoryError> {
        let row = self
            .with_connection("find chunk", move |conn| {
                diesel::sql_query(queries::find_chunk(dimension))
                    .bind::<BigInt, _>(id)
                    .get_result::<LectureChunkRow>(conn)
                    .optional()
            })
            .await?;

        Ok(row.map(|row| row.into_domain(dimension)))
    }

    async fn update(
        &self,
        dimension: EmbeddingDimension,
        id: i64,
        changes: &ChunkChanges,
    ) -> Result<LectureChunk, ChunkRepositoryError> {
        let changes = changes.clone();

        let row = self
            .with_connection("update chunk", move |conn| {
                diesel::sql_query(queries::update_chunk(dimension))
                    .bind::<BigInt, _>(id)
                    .bind::<Nullable<Text>, _>(changes.text)
                    .bind::<Nullable<VectorSql>, _>(changes.embedding)
                    .bind::<Nullable<Jsonb>, _>(changes.metadata)
                    .bind::<Nullable<Integer>, _>(changes.chunk_index)
                    .bind::<Nullable<Text>, _>(changes.source_file)
                    .bind::<Nullable<Text>, _>(changes.document_type)
                    .get_result::<LectureChunkRow>(conn)
                    .optional()
            })
            .await?;

        row.map(|row| row.into_domain(dimension))
            .ok_or(ChunkRepositoryError::NotFound { dimension, id })
    }

    async fn delete(
        &self,
        dimension: EmbeddingDimension,
        id: i64,
    ) -> Result<bool, ChunkRepositoryError> {
        let deleted = self
            .with_connection("delete chunk", move |conn| {
                diesel::sql_query(queries::delete_chunk(dimension))
                    .bind::<BigInt, _>(id)
                    .execute(conn)
            })
            .await?;

        Ok(deleted > 0)
    }

    async fn delete_by_source_file(
        &self,
        dimension: EmbeddingDimension,
        source_file: &str,
    ) -> Result<usize, ChunkRepositoryError> {
        let source_file = source_file.to_string();

        let deleted = self
            .with_connection("delete chunks by source file", move |conn| {
                diesel::sql_query(queries::delete_by_source_file(dimension))
                    .bind::<Text, _>(source_file)
                    .execute(conn)
            })
            .await?;

        tracing::info!(dimension = %dimension, deleted, "deleted chunks by source file");
        Ok(deleted)
    }

    async fn count(&self, dimension: EmbeddingDimension) -> Result<i64, ChunkRepositoryError> {
        self.with_connection("count chunks", move |conn| {
            diesel::sql_query(queries::count_chunks(dimension))
                .get_result::<CountRow>(conn)
                .map(|row| row.count)
        })
        .await
    }

    async fn search(
        &self,
        dimension: EmbeddingDimension,
        request: &SearchRequest,
    ) -> Result<Vec<SimilarChunk>, ChunkRepositoryError> {
        if request.is_empty_limit() {
            return Ok(Vec::new());
        }
        let request = request.clone();

        let rows = self
            .with_connection("search chunks", move |conn| {
                search_chunks(conn, dimension, &request)
            })
            .await?;

        tracing::debug!(
            dimension = %dimension,
            index = %dimension.index_strategy(),
            matches = rows.len(),
            "similarity search"
        );
        Ok(rows.into_iter().map(SimilarChunk::from).collect())
    }

    async fn clear(&self, dimension: EmbeddingDimension) -> Result<(), ChunkRepositoryError> {
        self.with_connection("clear chunks", move |conn| {
            diesel::sql_query(queries::truncate(&[dimension])).execute(conn)
        })
        .await?;

        tracing::info!(table = dimension.table_name(), "cleared chunk table");
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), ChunkRepositoryError> {
        self.with_connection("clear all chunks", |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::sql_query(queries::truncate(&EmbeddingDimension::ALL)).execute(conn)
            })
        })
        .await?;

        tracing::info!("cleared every chunk table");
        Ok(())
    }

    async fn stats(&self) -> Result<Vec<DimensionStats>, ChunkRepositoryError> {
        let rows = self
            .with_connection("load chunk stats", |conn| {
                diesel::sql_query(queries::SELECT_STATS).load::<DimensionStatsRow>(conn)
            })
            .await?;

        rows.into_iter()
            .map(|row| DimensionStats::try_from(row).map_err(ChunkRepositoryError::Database))
            .collect()
    }
}

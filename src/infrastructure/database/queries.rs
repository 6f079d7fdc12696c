//! Raw SQL for the embedding tables.
//!
//! Chunk statements are built from the `EmbeddingDimension` registry, so one
//! routine serves every width while the text sent to Postgres still names a
//! concrete table and a fixed-width `vector(N)` cast. Table names never come
//! from caller input.

use crate::domain::value_objects::EmbeddingDimension;

pub const CHUNK_COLUMNS: &str = "id, text, embedding, metadata, chunk_index, content_length, \
     source_file, document_type, created_at, updated_at";

pub fn insert_chunk(dimension: EmbeddingDimension) -> String {
    format!(
        "INSERT INTO {} (text, embedding, metadata, chunk_index, content_length, source_file, document_type) \
         VALUES ($1, CAST($2 AS {}), $3, $4, $5, $6, $7) RETURNING id",
        dimension.table_name(),
        dimension.vector_type(),
    )
}

pub fn find_chunk(dimension: EmbeddingDimension) -> String {
    format!(
        "SELECT {} FROM {} WHERE id = $1",
        CHUNK_COLUMNS,
        dimension.table_name()
    )
}

/// `$1` id, then text, embedding, metadata, chunk_index, source_file, document_type.
/// NULL binds keep the stored value; a new text also refreshes `content_length`.
pub fn update_chunk(dimension: EmbeddingDimension) -> String {
    format!(
        "UPDATE {table} SET \
         text = COALESCE($2, text), \
         content_length = CASE WHEN $2 IS NULL THEN content_length ELSE char_length($2) END, \
         embedding = COALESCE(CAST($3 AS {vector}), embedding), \
         metadata = COALESCE($4, metadata), \
         chunk_index = COALESCE($5, chunk_index), \
         source_file = COALESCE($6, source_file), \
         document_type = COALESCE($7, document_type) \
         WHERE id = $1 RETURNING {columns}",
        table = dimension.table_name(),
        vector = dimension.vector_type(),
        columns = CHUNK_COLUMNS,
    )
}

pub fn delete_chunk(dimension: EmbeddingDimension) -> String {
    format!("DELETE FROM {} WHERE id = $1", dimension.table_name())
}

pub fn delete_by_source_file(dimension: EmbeddingDimension) -> String {
    format!("DELETE FROM {} WHERE source_file = $1", dimension.table_name())
}

pub fn count_chunks(dimension: EmbeddingDimension) -> String {
    format!("SELECT COUNT(*) AS count FROM {}", dimension.table_name())
}

pub fn truncate(dimensions: &[EmbeddingDimension]) -> String {
    let tables: Vec<&str> = dimensions.iter().map(|d| d.table_name()).collect();
    format!("TRUNCATE TABLE {} RESTART IDENTITY", tables.join(", "))
}

pub const SELECT_STATS: &str = "SELECT dimension, total_chunks, chunks_with_embeddings, \
     unique_source_files, avg_content_length, first_chunk_at, last_chunk_at \
     FROM lecture_chunks_stats ORDER BY dimension";

/// Placeholder layout of a similarity search. Binds go in this order:
/// query embedding, threshold, then the optional filters, then the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilaritySearch {
    pub sql: String,
    pub binds_source_file: bool,
    pub binds_metadata_filter: bool,
}

/// Cosine similarity search over `table`.
///
/// Ordering by the raw `<=>` expression (not by the derived similarity)
/// keeps the statement eligible for the HNSW index where one exists.
pub fn similarity_search(
    table: &str,
    text_column: &str,
    vector_type: &str,
    source_expression: &str,
    trailing_columns: &[&str],
    with_source_file: bool,
    with_metadata_filter: bool,
) -> SimilaritySearch {
    let distance = format!("embedding <=> CAST($1 AS {})", vector_type);

    let mut columns = vec![
        "id".to_string(),
        text_column.to_string(),
        format!("1 - ({}) AS similarity", distance),
    ];
    columns.extend(trailing_columns.iter().map(|c| c.to_string()));

    // A zero-norm vector on either side yields a NaN distance, and NaN
    // compares above every threshold in Postgres.
    let mut conditions = vec![
        "embedding IS NOT NULL".to_string(),
        format!("({}) <> 'NaN'::float8", distance),
        format!("1 - ({}) >= $2", distance),
    ];
    let mut next = 3;
    if with_source_file {
        conditions.push(format!("{} = ${}", source_expression, next));
        next += 1;
    }
    if with_metadata_filter {
        conditions.push(format!("metadata @> ${}", next));
        next += 1;
    }

    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ${}",
        columns.join(", "),
        table,
        conditions.join(" AND "),
        distance,
        next,
    );

    SimilaritySearch {
        sql,
        binds_source_file: with_source_file,
        binds_metadata_filter: with_metadata_filter,
    }
}

pub const DOCUMENTS_TABLE: &str = "graph_rag.documents";

pub const SELECT_DOCUMENT_STATS: &str = "SELECT total_documents, documents_with_embeddings, \
     unique_sources, first_document_at, last_document_at FROM graph_rag.documents_stats";

pub fn search_documents(
    dimension: EmbeddingDimension,
    with_source: bool,
    with_metadata_filter: bool,
) -> SimilaritySearch {
    similarity_search(
        DOCUMENTS_TABLE,
        "content",
        &dimension.vector_type(),
        "metadata ->> 'source'",
        &["metadata"],
        with_source,
        with_metadata_filter,
    )
}

pub fn search_chunks(
    dimension: EmbeddingDimension,
    with_source_file: bool,
    with_metadata_filter: bool,
) -> SimilaritySearch {
    similarity_search(
        dimension.table_name(),
        "text",
        &dimension.vector_type(),
        "source_file",
        &["metadata", "source_file", "chunk_index"],
        with_source_file,
        with_metadata_filter,
    )
}

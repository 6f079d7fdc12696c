mod common;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde_json::json;

use lecture_store::domain::entities::{ChunkChanges, NewLectureChunk, SearchRequest};
use lecture_store::domain::repositories::{ChunkRepository, ChunkRepositoryError};
use lecture_store::domain::value_objects::EmbeddingDimension;

use common::{blend, is_ranked, one_hot, setup, similarities};

#[tokio::test]
async fn self_query_returns_the_chunk_first() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D384;

    let target = store
        .chunks
        .insert(
            dim,
            &NewLectureChunk::new("Introduction to RAG").with_embedding(blend(384, 0.8)),
        )
        .await
        .unwrap();
    for axis in 2..5 {
        store
            .chunks
            .insert(
                dim,
                &NewLectureChunk::new(format!("other {}", axis)).with_embedding(one_hot(384, axis)),
            )
            .await
            .unwrap();
    }

    let matches = store
        .chunks
        .search(dim, &SearchRequest::new(blend(384, 0.8)))
        .await
        .unwrap();

    assert_eq!(matches[0].id, target);
    assert_eq!(matches[0].text, "Introduction to RAG");
    assert!(matches[0].similarity >= 0.999);
}

#[tokio::test]
async fn search_respects_threshold_limit_and_order() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D768;

    for weight in [1.0, 0.9, 0.7, 0.5, 0.3, 0.1] {
        store
            .chunks
            .insert(
                dim,
                &NewLectureChunk::new(format!("weight {}", weight)).with_embedding(blend(768, weight)),
            )
            .await
            .unwrap();
    }
    store
        .chunks
        .insert(dim, &NewLectureChunk::new("not embedded yet"))
        .await
        .unwrap();

    let everything = store
        .chunks
        .search(dim, &SearchRequest::new(one_hot(768, 0)).with_match_count(100))
        .await
        .unwrap();
    assert_eq!(everything.len(), 6, "null embeddings never match");
    assert!(is_ranked(&similarities(&everything)));

    let limited = store
        .chunks
        .search(dim, &SearchRequest::new(one_hot(768, 0)).with_match_count(3))
        .await
        .unwrap();
    assert_eq!(limited.len(), 3);
    assert!(is_ranked(&similarities(&limited)));
    assert_eq!(limited[0].text, "weight 1");

    let request = SearchRequest::new(one_hot(768, 0))
        .with_match_count(100)
        .with_similarity_threshold(0.8);
    let above = store.chunks.search(dim, &request).await.unwrap();
    assert!(!above.is_empty());
    assert!(above.iter().all(|m| m.similarity >= 0.8));
    assert!(above.len() < everything.len());

    let none = store
        .chunks
        .search(dim, &SearchRequest::new(one_hot(768, 0)).with_match_count(0))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn search_filters_by_source_and_metadata() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D1024;

    let chunks = vec![
        NewLectureChunk::new("week one")
            .with_embedding(blend(1024, 0.9))
            .with_source_file("week1.pdf")
            .with_metadata(json!({"course": "ml", "week": 1})),
        NewLectureChunk::new("week two")
            .with_embedding(blend(1024, 0.9))
            .with_source_file("week2.pdf")
            .with_metadata(json!({"course": "ml", "week": 2})),
        NewLectureChunk::new("other course")
            .with_embedding(blend(1024, 0.9))
            .with_source_file("week1.pdf")
            .with_metadata(json!({"course": "db"})),
    ];
    store.chunks.insert_batch(dim, &chunks).await.unwrap();

    let by_source = store
        .chunks
        .search(
            dim,
            &SearchRequest::new(one_hot(1024, 0)).with_source_file("week1.pdf"),
        )
        .await
        .unwrap();
    assert_eq!(by_source.len(), 2);
    assert!(
        by_source
            .iter()
            .all(|m| m.source_file.as_deref() == Some("week1.pdf"))
    );

    let both = store
        .chunks
        .search(
            dim,
            &SearchRequest::new(one_hot(1024, 0))
                .with_source_file("week1.pdf")
                .with_metadata_filter(json!({"course": "ml"})),
        )
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].text, "week one");
}

#[tokio::test]
async fn sequential_scan_width_is_searchable() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D3072;

    let id = store
        .chunks
        .insert(dim, &NewLectureChunk::new("wide").with_embedding(one_hot(3072, 7)))
        .await
        .unwrap();

    let matches = store
        .chunks
        .search(dim, &SearchRequest::new(one_hot(3072, 7)))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, id);
    assert!(matches[0].similarity >= 0.999);
}

#[tokio::test]
async fn clear_all_empties_tables_and_restarts_ids() {
    let Some(store) = setup() else { return };

    for dim in EmbeddingDimension::ALL {
        for n in 0..2 {
            store
                .chunks
                .insert(dim, &NewLectureChunk::new(format!("chunk {}", n)))
                .await
                .unwrap();
        }
    }

    store.chunks.clear_all().await.unwrap();

    for dim in EmbeddingDimension::ALL {
        assert_eq!(store.chunks.count(dim).await.unwrap(), 0, "{}", dim);
        let id = store
            .chunks
            .insert(dim, &NewLectureChunk::new("first again"))
            .await
            .unwrap();
        assert_eq!(id, 1, "{}", dim);
    }

    // Clearing empty tables is not an error.
    store.chunks.clear_all().await.unwrap();
    store.chunks.clear_all().await.unwrap();
}

#[tokio::test]
async fn clear_one_dimension_leaves_others() {
    let Some(store) = setup() else { return };

    for dim in [EmbeddingDimension::D384, EmbeddingDimension::D1536] {
        for n in 0..3 {
            store
                .chunks
                .insert(dim, &NewLectureChunk::new(format!("chunk {}", n)))
                .await
                .unwrap();
        }
    }

    store.chunks.clear(EmbeddingDimension::D1536).await.unwrap();

    assert_eq!(store.chunks.count(EmbeddingDimension::D1536).await.unwrap(), 0);
    assert_eq!(store.chunks.count(EmbeddingDimension::D384).await.unwrap(), 3);

    let next = store
        .chunks
        .insert(EmbeddingDimension::D1536, &NewLectureChunk::new("restart"))
        .await
        .unwrap();
    assert_eq!(next, 1);
    let next = store
        .chunks
        .insert(EmbeddingDimension::D384, &NewLectureChunk::new("continue"))
        .await
        .unwrap();
    assert_eq!(next, 4);
}

#[derive(QueryableByName)]
struct UpdatedAt {
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    updated_at: DateTime<Utc>,
}

#[tokio::test]
async fn updates_always_move_updated_at_forward() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D384;

    let id = store
        .chunks
        .insert(dim, &NewLectureChunk::new("draft"))
        .await
        .unwrap();
    let created = store.chunks.find_by_id(dim, id).await.unwrap().unwrap();

    // A caller trying to backdate the row is overridden by the trigger.
    let mut conn = store.conn();
    let backdated: UpdatedAt = diesel::sql_query(
        "UPDATE lecture_chunks_384 SET updated_at = '2000-01-01T00:00:00Z' \
         WHERE id = $1 RETURNING updated_at",
    )
    .bind::<BigInt, _>(id)
    .get_result(&mut *conn)
    .unwrap();
    assert!(backdated.updated_at > created.updated_at());

    let changes = ChunkChanges {
        text: Some("final text".to_string()),
        ..ChunkChanges::default()
    };
    let updated = store.chunks.update(dim, id, &changes).await.unwrap();

    assert!(updated.updated_at() > backdated.updated_at);
    assert_eq!(updated.created_at(), created.created_at());
    assert_eq!(updated.text(), "final text");
    assert_eq!(updated.content_length(), Some(10));
}

#[tokio::test]
async fn update_keeps_unspecified_fields() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D768;

    let id = store
        .chunks
        .insert(
            dim,
            &NewLectureChunk::new("kept")
                .with_source_file("notes.md")
                .with_chunk_index(4),
        )
        .await
        .unwrap();

    let changes = ChunkChanges {
        embedding: Some(one_hot(768, 3).into()),
        metadata: Some(json!({"reviewed": true})),
        ..ChunkChanges::default()
    };
    let updated = store.chunks.update(dim, id, &changes).await.unwrap();

    assert_eq!(updated.text(), "kept");
    assert_eq!(updated.source_file(), Some("notes.md"));
    assert_eq!(updated.chunk_index(), Some(4));
    assert_eq!(updated.document_type(), "lecture");
    assert_eq!(updated.metadata(), &json!({"reviewed": true}));
    assert!(updated.is_embedded());

    let missing = store.chunks.update(dim, 9999, &changes).await;
    assert!(matches!(
        missing,
        Err(ChunkRepositoryError::NotFound { id: 9999, .. })
    ));
}

#[tokio::test]
async fn wrong_length_insert_fails_without_a_row() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D384;

    let result = store
        .chunks
        .insert(dim, &NewLectureChunk::new("too short").with_embedding(vec![0.1f32, 0.2, 0.3]))
        .await;

    assert!(matches!(result, Err(ChunkRepositoryError::Database(_))));
    assert_eq!(store.chunks.count(dim).await.unwrap(), 0);
}

#[tokio::test]
async fn wrong_length_search_is_a_storage_error() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D384;

    store
        .chunks
        .insert(dim, &NewLectureChunk::new("stored").with_embedding(one_hot(384, 0)))
        .await
        .unwrap();

    let result = store
        .chunks
        .search(dim, &SearchRequest::new(one_hot(768, 0)))
        .await;

    assert!(matches!(result, Err(ChunkRepositoryError::Database(_))));
}

#[tokio::test]
async fn wrong_length_update_leaves_the_row_unchanged() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D1024;

    let id = store
        .chunks
        .insert(dim, &NewLectureChunk::new("original").with_embedding(one_hot(1024, 2)))
        .await
        .unwrap();

    let changes = ChunkChanges {
        text: Some("rewritten".to_string()),
        embedding: Some(one_hot(384, 0).into()),
        ..ChunkChanges::default()
    };
    let result = store.chunks.update(dim, id, &changes).await;
    assert!(matches!(result, Err(ChunkRepositoryError::Database(_))));

    let stored = store.chunks.find_by_id(dim, id).await.unwrap().unwrap();
    assert_eq!(stored.text(), "original");
    assert_eq!(
        stored.embedding().map(|v| v.as_slice().len()),
        Some(1024)
    );
}

#[tokio::test]
async fn zero_vectors_never_match() {
    let Some(store) = setup() else { return };
    // No ANN index on this width, so every row reaches the filter.
    let dim = EmbeddingDimension::D3072;

    let close = store
        .chunks
        .insert(dim, &NewLectureChunk::new("close").with_embedding(one_hot(3072, 0)))
        .await
        .unwrap();
    store
        .chunks
        .insert(dim, &NewLectureChunk::new("zero").with_embedding(vec![0.0f32; 3072]))
        .await
        .unwrap();

    let request = SearchRequest::new(one_hot(3072, 0))
        .with_match_count(10)
        .with_similarity_threshold(0.99);
    let matches = store.chunks.search(dim, &request).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, close);
    assert!(is_ranked(&similarities(&matches)));

    let zero_query = store
        .chunks
        .search(dim, &SearchRequest::new(vec![0.0f32; 3072]).with_match_count(10))
        .await
        .unwrap();
    assert!(zero_query.is_empty());
}

#[tokio::test]
async fn failed_batch_inserts_nothing() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D1536;

    let chunks = vec![
        NewLectureChunk::new("fine").with_embedding(one_hot(1536, 0)),
        NewLectureChunk::new("wrong width").with_embedding(one_hot(768, 0)),
    ];

    assert!(store.chunks.insert_batch(dim, &chunks).await.is_err());
    assert_eq!(store.chunks.count(dim).await.unwrap(), 0);

    let ids = store.chunks.insert_batch(dim, &chunks[..1]).await.unwrap();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn delete_by_id_and_source_file() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D1024;

    let chunks: Vec<NewLectureChunk> = (0..4)
        .map(|n| {
            NewLectureChunk::new(format!("slide {}", n))
                .with_chunk_index(n)
                .with_source_file(if n < 3 { "deck.pptx" } else { "notes.txt" })
        })
        .collect();
    let ids = store.chunks.insert_batch(dim, &chunks).await.unwrap();

    assert!(store.chunks.delete(dim, ids[3]).await.unwrap());
    assert!(!store.chunks.delete(dim, ids[3]).await.unwrap());
    assert!(store.chunks.find_by_id(dim, ids[3]).await.unwrap().is_none());

    assert_eq!(
        store.chunks.delete_by_source_file(dim, "deck.pptx").await.unwrap(),
        3
    );
    assert_eq!(store.chunks.count(dim).await.unwrap(), 0);
}

#[tokio::test]
async fn stats_report_every_dimension() {
    let Some(store) = setup() else { return };
    let dim = EmbeddingDimension::D768;

    store
        .chunks
        .insert(
            dim,
            &NewLectureChunk::new("a")
                .with_embedding(one_hot(768, 0))
                .with_source_file("one.pdf"),
        )
        .await
        .unwrap();
    store
        .chunks
        .insert(
            dim,
            &NewLectureChunk::new("bb")
                .with_embedding(one_hot(768, 1))
                .with_source_file("two.pdf"),
        )
        .await
        .unwrap();
    store
        .chunks
        .insert(dim, &NewLectureChunk::new("ccc").with_source_file("two.pdf"))
        .await
        .unwrap();

    let stats = store.chunks.stats().await.unwrap();
    let dimensions: Vec<EmbeddingDimension> = stats.iter().map(|s| s.dimension).collect();
    assert_eq!(dimensions, EmbeddingDimension::ALL.to_vec());

    for row in &stats {
        if row.dimension == dim {
            assert_eq!(row.total_chunks, 3);
            assert_eq!(row.chunks_with_embeddings, 2);
            assert_eq!(row.unique_source_files, 2);
            assert_eq!(row.avg_content_length, Some(2.0));
            assert!(row.first_chunk_at.is_some());
        } else {
            assert!(row.is_empty(), "{}", row.dimension);
            assert_eq!(row.chunks_with_embeddings, 0);
        }
    }
}

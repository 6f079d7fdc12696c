#![allow(dead_code)]

use std::sync::{Mutex, MutexGuard};

use diesel::prelude::*;
use lecture_store::config::StoreConfig;
use lecture_store::domain::entities::SimilarChunk;
use lecture_store::infrastructure::database::repositories::{
    PostgresChunkRepository, PostgresDocumentRepository,
};
use lecture_store::infrastructure::database::{
    DbConnection, DbPool, create_connection_pool, get_connection_from_pool,
    get_database_connection, run_migrations,
};

// Tests in one binary share the database; hold this for the whole test.
static DATABASE_LOCK: Mutex<()> = Mutex::new(());

pub struct TestStore {
    pub pool: DbPool,
    pub chunks: PostgresChunkRepository,
    pub documents: PostgresDocumentRepository,
    _guard: MutexGuard<'static, ()>,
}

impl TestStore {
    pub fn conn(&self) -> DbConnection {
        get_connection_from_pool(&self.pool).expect("pooled connection")
    }
}

/// Migrated, empty store, or `None` when `TEST_DATABASE_URL` is unset.
pub fn setup() -> Option<TestStore> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };
    let guard = DATABASE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let config = StoreConfig {
        max_connections: 2,
        ..StoreConfig::new(url)
    };
    let mut conn = get_database_connection(&config).expect("database connection");
    run_migrations(&mut conn).expect("migrations");

    diesel::sql_query(
        "TRUNCATE TABLE lecture_chunks_384, lecture_chunks_768, lecture_chunks_1024, \
         lecture_chunks_1536, lecture_chunks_3072, graph_rag.documents RESTART IDENTITY CASCADE",
    )
    .execute(&mut conn)
    .expect("reset tables");

    let pool = create_connection_pool(&config).expect("connection pool");

    Some(TestStore {
        chunks: PostgresChunkRepository::new(pool.clone()),
        documents: PostgresDocumentRepository::new(pool.clone()),
        pool,
        _guard: guard,
    })
}

/// Unit vector along `axis`.
pub fn one_hot(width: usize, axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; width];
    v[axis] = 1.0;
    v
}

/// `weight` along axis 0, `1 - weight` along axis 1.
pub fn blend(width: usize, weight: f32) -> Vec<f32> {
    let mut v = vec![0.0; width];
    v[0] = weight;
    v[1] = 1.0 - weight;
    v
}

/// True when every similarity is a number and none increases along the slice.
pub fn is_ranked(similarities: &[f64]) -> bool {
    similarities.iter().all(|s| !s.is_nan()) && similarities.windows(2).all(|w| w[0] >= w[1])
}

pub fn similarities(matches: &[SimilarChunk]) -> Vec<f64> {
    matches.iter().map(|m| m.similarity).collect()
}

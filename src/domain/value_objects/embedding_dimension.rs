use serde::{Deserialize, Serialize};

/// Widest vector pgvector's HNSW index accepts for the `vector` type.
pub const ANN_INDEX_MAX_WIDTH: usize = 2000;

/// The embedding widths the store keeps a chunk table for.
///
/// Every width owns exactly one `lecture_chunks_{width}` table; the table a row
/// lives in is its dimensionality tag, so this enum is the single place that
/// maps widths to tables and index strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum EmbeddingDimension {
    D384,
    D768,
    D1024,
    D1536,
    D3072,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexStrategy {
    /// Graph-based approximate nearest neighbour index over cosine distance.
    Hnsw,
    /// No vector index; similarity search reads the whole table.
    SequentialScan,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported embedding dimension: {0}")]
pub struct UnsupportedDimension(pub usize);

impl EmbeddingDimension {
    pub const ALL: [EmbeddingDimension; 5] = [
        EmbeddingDimension::D384,
        EmbeddingDimension::D768,
        EmbeddingDimension::D1024,
        EmbeddingDimension::D1536,
        EmbeddingDimension::D3072,
    ];

    pub fn width(self) -> usize {
        match self {
            EmbeddingDimension::D384 => 384,
            EmbeddingDimension::D768 => 768,
            EmbeddingDimension::D1024 => 1024,
            EmbeddingDimension::D1536 => 1536,
            EmbeddingDimension::D3072 => 3072,
        }
    }

    pub fn from_width(width: usize) -> Result<Self, UnsupportedDimension> {
        Self::ALL
            .into_iter()
            .find(|dimension| dimension.width() == width)
            .ok_or(UnsupportedDimension(width))
    }

    pub fn table_name(self) -> &'static str {
        match self {
            EmbeddingDimension::D384 => "lecture_chunks_384",
            EmbeddingDimension::D768 => "lecture_chunks_768",
            EmbeddingDimension::D1024 => "lecture_chunks_1024",
            EmbeddingDimension::D1536 => "lecture_chunks_1536",
            EmbeddingDimension::D3072 => "lecture_chunks_3072",
        }
    }

    pub fn index_strategy(self) -> IndexStrategy {
        if self.width() <= ANN_INDEX_MAX_WIDTH {
            IndexStrategy::Hnsw
        } else {
            IndexStrategy::SequentialScan
        }
    }

    pub fn has_ann_index(self) -> bool {
        self.index_strategy() == IndexStrategy::Hnsw
    }

    /// Model family the width is usually produced by. Informational only.
    pub fn model_hint(self) -> &'static str {
        match self {
            EmbeddingDimension::D384 => "multilingual-e5-small",
            EmbeddingDimension::D768 => "multilingual-e5-base / nomic-embed-text",
            EmbeddingDimension::D1024 => "multilingual-e5-large / bge-m3",
            EmbeddingDimension::D1536 => "text-embedding-ada-002",
            EmbeddingDimension::D3072 => "text-embedding-3-large",
        }
    }

    /// Postgres type the query embedding is cast to, e.g. `vector(768)`.
    pub fn vector_type(self) -> String {
        format!("vector({})", self.width())
    }
}

impl TryFrom<usize> for EmbeddingDimension {
    type Error = UnsupportedDimension;

    fn try_from(width: usize) -> Result<Self, Self::Error> {
        Self::from_width(width)
    }
}

impl From<EmbeddingDimension> for usize {
    fn from(dimension: EmbeddingDimension) -> Self {
        dimension.width()
    }
}

impl std::str::FromStr for EmbeddingDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let width: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid embedding dimension: {}", s))?;
        Self::from_width(width).map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for EmbeddingDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.width())
    }
}

impl std::fmt::Display for IndexStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexStrategy::Hnsw => write!(f, "hnsw (cosine)"),
            IndexStrategy::SequentialScan => write!(f, "sequential scan"),
        }
    }
}

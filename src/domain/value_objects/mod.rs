pub mod embedding_dimension;

pub use embedding_dimension::{
    ANN_INDEX_MAX_WIDTH, EmbeddingDimension, IndexStrategy, UnsupportedDimension,
};

pub mod chunk_service;

pub use chunk_service::{ChunkService, ChunkServiceError};

pub mod dimension_stats;
pub mod document;
pub mod lecture_chunk;
pub mod search_request;
pub mod similar_chunk;

pub use dimension_stats::DimensionStats;
pub use document::{
    DOCUMENT_DIMENSION, Document, DocumentNode, DocumentStats, NewDocument, NewDocumentNode,
    SimilarDocument,
};
pub use lecture_chunk::{ChunkChanges, LectureChunk, NewLectureChunk};
pub use search_request::SearchRequest;
pub use similar_chunk::SimilarChunk;

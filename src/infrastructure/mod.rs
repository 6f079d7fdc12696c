pub mod container;
pub mod database;

// Re-export commonly used items
pub use container::StoreContainer;
pub use database::{DatabaseError, DbPool, create_connection_pool};

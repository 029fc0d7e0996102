pub mod catalog;
pub mod embedding_store;

pub use catalog::{load_catalog, load_repository};
pub use embedding_store::{EmbeddingStore, StoreDescription};

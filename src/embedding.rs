//! Phrase embeddings: the in-memory store and word2vec file readers.

pub mod reader;
pub mod store;

pub use reader::{read_binary, read_binary_file, read_text, read_text_file};
pub use store::EmbeddingStore;

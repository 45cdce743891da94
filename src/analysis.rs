//! Text analysis applied before corpora reach the statistics.

pub mod text_processor;

pub use text_processor::{DUMMY_TOKEN_PREFIX, TextProcessor, TextProcessorKind};

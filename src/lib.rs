//! # Phrasaurus
//!
//! Automatic construction of multi-word thesauri from corpus statistics.
//!
//! ## Features
//!
//! - Regex text normalizers that mask noisy spans with dummy tokens
//! - NPMI collocation detection over n-gram counts, with bootstrapping to
//!   longer phrases
//! - Weighted alignment distances for spelling variants and abbreviations
//! - Multithreaded cosine similarity scans over word2vec embeddings
//! - Ranked thesaurus entries with a plain-text save format
//!
//! ## Example
//!
//! ```
//! use phrasaurus::orthography::PhraseScorer;
//! use phrasaurus::phrase::Phrase;
//!
//! let scorer = PhraseScorer::default();
//! let er = Phrase::parse("er").unwrap();
//! let long_form = Phrase::parse("emergency room").unwrap();
//! assert_eq!(scorer.abbreviation_distance(&er, &long_form), 0.0);
//! ```

pub mod analysis;
pub mod cli;
pub mod collocation;
pub mod config;
pub mod embedding;
pub mod error;
pub mod orthography;
pub mod phrase;
pub mod thesaurus;
pub mod util;

pub mod prelude {
    pub use crate::analysis::{TextProcessor, TextProcessorKind};
    pub use crate::collocation::{CollocationDetector, Collocations};
    pub use crate::config::PhrasaurusConfig;
    pub use crate::embedding::EmbeddingStore;
    pub use crate::error::{PhrasaurusError, Result};
    pub use crate::orthography::PhraseScorer;
    pub use crate::phrase::Phrase;
    pub use crate::thesaurus::{Thesaurus, ThesaurusBuilder, ThesaurusEntry};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

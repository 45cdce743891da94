//! Statistical collocation detection.
//!
//! N-gram count files are read one order at a time into
//! [`ngram::NgramTables`]; [`detector::CollocationDetector`] scores them with
//! [`npmi::npmi`] and collects the result in a [`collocations::Collocations`]
//! set, which can be saved and applied back to a corpus.

pub mod collocations;
pub mod detector;
pub mod ngram;
pub mod npmi;

pub use collocations::{CollocationMatcher, Collocations};
pub use detector::{BOOTSTRAP_CONFIDENCE, CollocationDetector, NpmiAudit, OrderAudit};
pub use ngram::{NgramRecord, NgramTable, NgramTables, prune_ngram_counts};
pub use npmi::npmi;

//! Orthographic alignment distances for spelling variants and abbreviations.
//!
//! [`distance::OrthographicDistance`] runs the weighted alignment under a set
//! of [`distance::AlignmentCosts`]; [`scorer::PhraseScorer`] applies the two
//! standard regimes to phrases and normalizes by length; [`batch`] fans large
//! pair lists out over worker threads.

pub mod batch;
pub mod distance;
pub mod scorer;

pub use distance::{AlignmentCosts, AlignmentCostsBuilder, OrthographicDistance};
pub use scorer::PhraseScorer;

//! Thesaurus construction and storage.
//!
//! [`builder::ThesaurusBuilder`] turns an embedding store into a
//! [`store::Thesaurus`] of scored [`entry::ThesaurusEntry`] pairings.

pub mod builder;
pub mod entry;
pub mod store;

pub use builder::ThesaurusBuilder;
pub use entry::ThesaurusEntry;
pub use store::Thesaurus;

//! Run configuration.
//!
//! A [`PhrasaurusConfig`] is built once (from a JSON file or in code) and
//! handed to each component. Nothing in the crate reads ambient global state.
//!
//! # Examples
//!
//! ```
//! use phrasaurus::config::PhrasaurusConfig;
//!
//! let config: PhrasaurusConfig = serde_json::from_str(
//!     r#"{ "thesaurus": { "semantic_threshold": 0.5, "permutation_penalty": 1.0 } }"#,
//! ).unwrap();
//! assert_eq!(config.thesaurus.semantic_threshold, 0.5);
//! assert_eq!(config.thesaurus.ortho_max, 0.4);
//! assert!(config.validate().is_ok());
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::TextProcessorKind;
use crate::error::{PhrasaurusError, Result};
use crate::orthography::AlignmentCosts;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhrasaurusConfig {
    /// Normalizer applied to corpora and thesaurus queries.
    pub text_processor: TextProcessorKind,
    pub collocations: CollocationConfig,
    pub thesaurus: ThesaurusConfig,
}

impl PhrasaurusConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: PhrasaurusConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.collocations.validate()?;
        self.thesaurus.validate()
    }
}

/// Settings for collocation detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocationConfig {
    /// Minimum count per n-gram order, starting at unigrams. The last value
    /// applies to every higher order.
    pub min_counts: Vec<u64>,
    /// NPMI acceptance threshold per order, starting at bigrams. The last
    /// value applies to every higher order.
    pub npmi_thresholds: Vec<f64>,
    /// Longest collocation to reach by bootstrapping.
    pub max_phrase_length: usize,
}

impl Default for CollocationConfig {
    fn default() -> Self {
        Self {
            min_counts: vec![1],
            npmi_thresholds: vec![0.5],
            max_phrase_length: 4,
        }
    }
}

impl CollocationConfig {
    pub fn min_count(&self, order: usize) -> u64 {
        let idx = order.saturating_sub(1).min(self.min_counts.len() - 1);
        self.min_counts[idx]
    }

    pub fn npmi_threshold(&self, order: usize) -> f64 {
        let idx = order.saturating_sub(2).min(self.npmi_thresholds.len() - 1);
        self.npmi_thresholds[idx]
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_counts.is_empty() {
            return Err(PhrasaurusError::config("min_counts must not be empty"));
        }
        if self.npmi_thresholds.is_empty() {
            return Err(PhrasaurusError::config(
                "npmi_thresholds must not be empty",
            ));
        }
        if let Some(t) = self.npmi_thresholds.iter().find(|t| !t.is_finite()) {
            return Err(PhrasaurusError::config(format!(
                "NPMI threshold {t} is not finite"
            )));
        }
        if self.max_phrase_length < 2 {
            return Err(PhrasaurusError::config(
                "max_phrase_length must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Settings for thesaurus construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThesaurusConfig {
    /// Minimum cosine similarity for a candidate.
    pub semantic_threshold: f64,
    /// Largest admissible normalized orthographic distance.
    pub ortho_max: f64,
    /// Largest admissible normalized abbreviation distance.
    pub abbr_max: f64,
    /// Minimum overall score; `None` keeps everything admitted.
    pub overall_threshold: Option<f64>,
    /// Weight of the semantic term relative to the orthographic one.
    pub semantic_ortho_ratio: f64,
    /// Flat cost of reordering words; `None` disables permutation search.
    pub permutation_penalty: Option<f64>,
    pub case_sensitive: bool,
    /// Worker threads for the similarity scan; `None` uses every CPU.
    pub threads: Option<usize>,
    pub orthographic_costs: AlignmentCosts,
    pub abbreviation_costs: AlignmentCosts,
}

impl Default for ThesaurusConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: 0.3,
            ortho_max: 0.4,
            abbr_max: 0.5,
            overall_threshold: None,
            semantic_ortho_ratio: 1.0,
            permutation_penalty: None,
            case_sensitive: false,
            threads: None,
            orthographic_costs: AlignmentCosts::non_abbreviations(),
            abbreviation_costs: AlignmentCosts::abbreviations(),
        }
    }
}

impl ThesaurusConfig {
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("semantic_threshold", self.semantic_threshold),
            ("ortho_max", self.ortho_max),
            ("abbr_max", self.abbr_max),
            ("semantic_ortho_ratio", self.semantic_ortho_ratio),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(PhrasaurusError::config(format!("{name} must be finite")));
            }
        }
        if self.semantic_ortho_ratio < 0.0 {
            return Err(PhrasaurusError::config(
                "semantic_ortho_ratio must not be negative",
            ));
        }
        if let Some(p) = self.permutation_penalty
            && !p.is_finite()
        {
            return Err(PhrasaurusError::config("permutation_penalty must be finite"));
        }
        if self.threads == Some(0) {
            return Err(PhrasaurusError::config("threads must be at least 1"));
        }
        Ok(())
    }
}

//! A single scored headword/candidate pairing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PhrasaurusError, Result};
use crate::phrase::Phrase;

/// A candidate equivalent for a headword, with the scores that admitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThesaurusEntry {
    pub headword: Phrase,
    pub candidate: Phrase,
    pub overall_score: f64,
    pub semantic_similarity: f64,
    /// Normalized orthographic distance.
    pub ortho_distance: f64,
    /// Normalized abbreviation distance.
    pub abbr_distance: f64,
}

impl ThesaurusEntry {
    pub fn new(
        headword: Phrase,
        candidate: Phrase,
        overall_score: f64,
        semantic_similarity: f64,
        ortho_distance: f64,
        abbr_distance: f64,
    ) -> Self {
        ThesaurusEntry {
            headword,
            candidate,
            overall_score,
            semantic_similarity,
            ortho_distance,
            abbr_distance,
        }
    }

    /// True when both entries pair the same two phrases, in either order.
    pub fn same_pairing(&self, other: &ThesaurusEntry) -> bool {
        (self.headword == other.headword && self.candidate == other.candidate)
            || (self.headword == other.candidate && self.candidate == other.headword)
    }

    /// `overall;semantic;ortho;abbr`, as stored in thesaurus files.
    pub fn scores_field(&self) -> String {
        format!(
            "{};{};{};{}",
            self.overall_score, self.semantic_similarity, self.ortho_distance, self.abbr_distance
        )
    }

    /// Parse a `scores_field` back into its four values.
    pub(crate) fn parse_scores(field: &str, line_no: usize) -> Result<[f64; 4]> {
        let values = field
            .split(';')
            .map(|s| {
                s.trim().parse::<f64>().map_err(|e| {
                    PhrasaurusError::parse(line_no, format!("bad score {s:?}: {e}"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        <[f64; 4]>::try_from(values).map_err(|v| {
            PhrasaurusError::parse(line_no, format!("expected 4 scores, found {}", v.len()))
        })
    }

    /// Headword, candidate and the four scores, tab-separated.
    pub fn to_tabbed(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.headword,
            self.candidate,
            self.overall_score,
            self.semantic_similarity,
            self.ortho_distance,
            self.abbr_distance
        )
    }
}

impl fmt::Display for ThesaurusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}\t{}", self.headword, self.candidate, self.scores_field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(a: &str, b: &str) -> ThesaurusEntry {
        ThesaurusEntry::new(
            Phrase::parse(a).unwrap(),
            Phrase::parse(b).unwrap(),
            0.8,
            0.6,
            0.9,
            0.0,
        )
    }

    #[test]
    fn test_same_pairing_ignores_direction() {
        let forward = entry("mi", "myocardial infarction");
        let backward = entry("myocardial infarction", "mi");
        assert!(forward.same_pairing(&backward));
        assert!(!forward.same_pairing(&entry("mi", "mitral insufficiency")));
    }

    #[test]
    fn test_formats() {
        let e = entry("mi", "myocardial infarction");
        assert_eq!(e.to_string(), "mi:myocardial infarction\t0.8;0.6;0.9;0");
        assert_eq!(e.to_tabbed(), "mi\tmyocardial infarction\t0.8\t0.6\t0.9\t0");
    }

    #[test]
    fn test_parse_scores() {
        assert_eq!(
            ThesaurusEntry::parse_scores("0.8;0.6;0.9;0", 3).unwrap(),
            [0.8, 0.6, 0.9, 0.0]
        );
        assert!(ThesaurusEntry::parse_scores("0.8;0.6;0.9", 3).is_err());
        assert!(ThesaurusEntry::parse_scores("0.8;x;0.9;0", 3).is_err());
    }
}

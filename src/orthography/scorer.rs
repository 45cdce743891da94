//! Length-normalized orthographic and abbreviation distances between phrases.

use crate::orthography::distance::{AlignmentCosts, OrthographicDistance};
use crate::phrase::Phrase;

/// Divide a raw distance by a character length.
///
/// Phrases are never empty, so a zero length here means a caller broke that
/// invariant; it panics instead of producing NaN or infinity.
fn normalize(distance: f64, length: usize) -> f64 {
    assert!(length > 0, "cannot normalize a distance by a zero length");
    distance / length as f64
}

/// Pairs the two alignment regimes with the normalization policy used when
/// comparing phrases.
#[derive(Debug, Clone, Copy)]
pub struct PhraseScorer {
    orthographic: OrthographicDistance,
    abbreviation: OrthographicDistance,
    permutation_penalty: Option<f64>,
}

impl PhraseScorer {
    pub fn new(
        orthographic_costs: AlignmentCosts,
        abbreviation_costs: AlignmentCosts,
        permutation_penalty: Option<f64>,
    ) -> Self {
        PhraseScorer {
            orthographic: OrthographicDistance::new(orthographic_costs),
            abbreviation: OrthographicDistance::new(abbreviation_costs),
            permutation_penalty,
        }
    }

    pub fn orthographic(&self) -> &OrthographicDistance {
        &self.orthographic
    }

    pub fn abbreviation(&self) -> &OrthographicDistance {
        &self.abbreviation
    }

    pub fn permutation_penalty(&self) -> Option<f64> {
        self.permutation_penalty
    }

    /// Permutation-aware non-abbreviation distance over the longer length.
    pub fn orthographic_distance(&self, a: &Phrase, b: &Phrase) -> f64 {
        let dist = self
            .orthographic
            .shortest_permuted_distance(a, b, self.permutation_penalty);
        normalize(dist, a.length().max(b.length()))
    }

    /// Abbreviation distance with `abbreviation` as the short form, over the
    /// abbreviation's length.
    pub fn directed_abbreviation_distance(&self, abbreviation: &Phrase, long_form: &Phrase) -> f64 {
        let dist = self.abbreviation.phrase_distance(abbreviation, long_form);
        normalize(dist, abbreviation.length())
    }

    /// Better of the two abbreviation directions, since which phrase is the
    /// short form is not known up front.
    pub fn abbreviation_distance(&self, a: &Phrase, b: &Phrase) -> f64 {
        self.directed_abbreviation_distance(a, b)
            .min(self.directed_abbreviation_distance(b, a))
    }
}

impl Default for PhraseScorer {
    fn default() -> Self {
        PhraseScorer::new(
            AlignmentCosts::non_abbreviations(),
            AlignmentCosts::abbreviations(),
            None,
        )
    }
}

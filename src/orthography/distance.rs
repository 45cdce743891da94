//! Configurable alignment distance between two strings or phrases.
//!
//! The alignment is a weighted edit distance where every cost depends on where
//! the operation happens. Matches can be cheaper at the start of the string or
//! of a word, and deleting a character from the second string can be cheaper
//! at a word boundary. With the [`AlignmentCosts::abbreviations`] preset the
//! distance is asymmetric: the first argument is the short form, the second
//! the long form.

use serde::{Deserialize, Serialize};

use crate::phrase::Phrase;

/// Characters after which the next character starts a new word.
pub const BREAKING_CHARS: [char; 5] = [' ', '-', '/', '_', '&'];

fn is_breaking(c: char) -> bool {
    BREAKING_CHARS.contains(&c)
}

/// Penalties for each alignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentCosts {
    /// Matching two identical characters mid-word.
    pub matched: f64,
    /// Matching at the start of a word of the second string.
    pub word_initial_match: f64,
    /// Matching the first character of both strings.
    pub string_initial_match: f64,
    pub substitution: f64,
    /// Deleting a character from the first string.
    pub delete_a: f64,
    /// Deleting a mid-word character from the second string.
    pub delete_b: f64,
    /// Deleting a word-initial character from the second string.
    pub delete_b_word_initial: f64,
    /// Deleting the very first character of the second string.
    pub delete_b_initial: f64,
    pub case_sensitive: bool,
}

impl AlignmentCosts {
    /// Costs for comparing an abbreviation (first) with its long form
    /// (second). Substitution costs the sum of the largest deletion costs on
    /// each side, which rules it out.
    pub fn abbreviations() -> Self {
        AlignmentCostsBuilder::new()
            .case_sensitive(false)
            .match_penalty(0.0)
            .substitution_penalty(4.0)
            .word_initial_match_penalty(0.0)
            .string_initial_match_penalty(0.0)
            .delete_a_penalty(2.0)
            .delete_b_penalty(0.0)
            .delete_b_initial_penalty(2.0)
            .delete_b_word_initial_penalty(1.0)
            .build()
    }

    /// Symmetric costs for comparing two full-length spellings.
    pub fn non_abbreviations() -> Self {
        AlignmentCostsBuilder::new()
            .case_sensitive(false)
            .match_penalty(0.0)
            .substitution_penalty(1.0)
            .word_initial_match_penalty(0.0)
            .string_initial_match_penalty(0.0)
            .delete_a_penalty(1.0)
            .delete_b_penalty(1.0)
            .build()
    }

    pub fn builder() -> AlignmentCostsBuilder {
        AlignmentCostsBuilder::new()
    }
}

impl Default for AlignmentCosts {
    fn default() -> Self {
        AlignmentCostsBuilder::new().build()
    }
}

/// Builder for [`AlignmentCosts`].
///
/// Unset values default to a plain edit distance without substitution
/// discounts. An unset word-initial deletion cost falls back to the plain
/// deletion cost, and an unset string-initial deletion cost falls back to the
/// word-initial one.
#[derive(Debug, Clone)]
pub struct AlignmentCostsBuilder {
    case_sensitive: bool,
    matched: f64,
    word_initial_match: f64,
    string_initial_match: f64,
    substitution: f64,
    delete_a: f64,
    delete_b: f64,
    delete_b_word_initial: Option<f64>,
    delete_b_initial: Option<f64>,
}

impl Default for AlignmentCostsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignmentCostsBuilder {
    pub fn new() -> Self {
        AlignmentCostsBuilder {
            case_sensitive: false,
            matched: 0.0,
            word_initial_match: 0.0,
            string_initial_match: 0.0,
            substitution: 1.0,
            delete_a: 1.0,
            delete_b: 1.0,
            delete_b_word_initial: None,
            delete_b_initial: None,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn match_penalty(mut self, penalty: f64) -> Self {
        self.matched = penalty;
        self
    }

    pub fn word_initial_match_penalty(mut self, penalty: f64) -> Self {
        self.word_initial_match = penalty;
        self
    }

    pub fn string_initial_match_penalty(mut self, penalty: f64) -> Self {
        self.string_initial_match = penalty;
        self
    }

    pub fn substitution_penalty(mut self, penalty: f64) -> Self {
        self.substitution = penalty;
        self
    }

    pub fn delete_a_penalty(mut self, penalty: f64) -> Self {
        self.delete_a = penalty;
        self
    }

    pub fn delete_b_penalty(mut self, penalty: f64) -> Self {
        self.delete_b = penalty;
        self
    }

    pub fn delete_b_word_initial_penalty(mut self, penalty: f64) -> Self {
        self.delete_b_word_initial = Some(penalty);
        self
    }

    pub fn delete_b_initial_penalty(mut self, penalty: f64) -> Self {
        self.delete_b_initial = Some(penalty);
        self
    }

    pub fn build(self) -> AlignmentCosts {
        let delete_b_word_initial = self.delete_b_word_initial.unwrap_or(self.delete_b);
        let delete_b_initial = self.delete_b_initial.unwrap_or(delete_b_word_initial);
        AlignmentCosts {
            matched: self.matched,
            word_initial_match: self.word_initial_match,
            string_initial_match: self.string_initial_match,
            substitution: self.substitution,
            delete_a: self.delete_a,
            delete_b: self.delete_b,
            delete_b_word_initial,
            delete_b_initial,
            case_sensitive: self.case_sensitive,
        }
    }
}

/// Dynamic-programming alignment under a fixed set of [`AlignmentCosts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicDistance {
    costs: AlignmentCosts,
}

impl OrthographicDistance {
    pub fn new(costs: AlignmentCosts) -> Self {
        OrthographicDistance { costs }
    }

    pub fn for_abbreviations() -> Self {
        Self::new(AlignmentCosts::abbreviations())
    }

    pub fn for_non_abbreviations() -> Self {
        Self::new(AlignmentCosts::non_abbreviations())
    }

    pub fn costs(&self) -> &AlignmentCosts {
        &self.costs
    }

    /// Cost of the cheapest alignment of `word_a` (the abbreviation, if
    /// applicable) onto `word_b` (the long form).
    #[allow(clippy::needless_range_loop)]
    pub fn distance(&self, word_a: &str, word_b: &str) -> f64 {
        let (a, b): (Vec<char>, Vec<char>) = if self.costs.case_sensitive {
            (word_a.chars().collect(), word_b.chars().collect())
        } else {
            (
                word_a.to_lowercase().chars().collect(),
                word_b.to_lowercase().chars().collect(),
            )
        };
        let m = a.len();
        let n = b.len();
        let c = &self.costs;

        // Positional surcharge for touching column j of the second string.
        let b_word_initial: Vec<bool> = (0..=n)
            .map(|j| j >= 2 && is_breaking(b[j - 2]) && !is_breaking(b[j - 1]))
            .collect();

        let mut prev = vec![0.0f64; n + 1];
        let mut curr = vec![0.0f64; n + 1];

        for i in 0..=m {
            for j in 0..=n {
                let mut best = if i == 0 && j == 0 { 0.0 } else { f64::INFINITY };

                if i > 0 && j > 0 {
                    let diag = if a[i - 1] == b[j - 1] {
                        let cost = if i == 1 && j == 1 {
                            c.string_initial_match
                        } else if b_word_initial[j] {
                            c.word_initial_match
                        } else {
                            c.matched
                        };
                        prev[j - 1] + cost
                    } else {
                        prev[j - 1] + c.substitution
                    };
                    best = best.min(diag);
                }
                if i > 0 {
                    best = best.min(prev[j] + c.delete_a);
                }
                if j > 0 {
                    let cost = if j < 2 {
                        c.delete_b_initial
                    } else if b_word_initial[j] {
                        c.delete_b_word_initial
                    } else {
                        c.delete_b
                    };
                    best = best.min(curr[j - 1] + cost);
                }
                curr[j] = best;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        prev[n]
    }

    /// Distance between two phrases rendered with single spaces.
    pub fn phrase_distance(&self, phrase_a: &Phrase, phrase_b: &Phrase) -> f64 {
        self.distance(&phrase_a.to_string(), &phrase_b.to_string())
    }

    /// Cheapest distance over word-order permutations of the shorter phrase,
    /// identity excluded. Ties in size permute the second phrase.
    fn shortest_must_permute(&self, phrase_a: &Phrase, phrase_b: &Phrase) -> f64 {
        if phrase_a.size() < phrase_b.size() {
            phrase_a
                .permutations()
                .iter()
                .filter(|p| *p != phrase_a)
                .map(|p| self.phrase_distance(p, phrase_b))
                .fold(f64::INFINITY, f64::min)
        } else {
            phrase_b
                .permutations()
                .iter()
                .filter(|p| *p != phrase_b)
                .map(|p| self.phrase_distance(phrase_a, p))
                .fold(f64::INFINITY, f64::min)
        }
    }

    /// Smallest distance when the shorter phrase may be reordered at a flat
    /// `permutation_penalty`. With no penalty this is just
    /// [`phrase_distance`](Self::phrase_distance).
    pub fn shortest_permuted_distance(
        &self,
        phrase_a: &Phrase,
        phrase_b: &Phrase,
        permutation_penalty: Option<f64>,
    ) -> f64 {
        let unpermuted = self.phrase_distance(phrase_a, phrase_b);
        match permutation_penalty {
            None => unpermuted,
            Some(penalty) => {
                unpermuted.min(self.shortest_must_permute(phrase_a, phrase_b) + penalty)
            }
        }
    }
}

impl Default for OrthographicDistance {
    fn default() -> Self {
        Self::for_non_abbreviations()
    }
}

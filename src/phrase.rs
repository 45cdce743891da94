//! The phrase type used as a lookup key throughout the crate.
//!
//! A [`Phrase`] is an immutable, non-empty sequence of word tokens. Equality
//! and hashing go by the exact token sequence, so `"Heart attack"` and
//! `"heart attack"` are different keys unless the caller lowercases first.
//!
//! # Examples
//!
//! ```
//! use phrasaurus::phrase::Phrase;
//!
//! let phrase = Phrase::parse("acute myocardial infarction").unwrap();
//! assert_eq!(phrase.size(), 3);
//! assert_eq!(phrase.length(), 27);
//! assert_eq!(phrase.word(-1), Some("infarction"));
//! assert_eq!(phrase.without(0).unwrap().to_string(), "myocardial infarction");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PhrasaurusError, Result};

/// Joins the tokens of a multi-word phrase inside corpora and embedding files.
pub const TOKEN_JOINER: char = '_';

/// An ordered, non-empty sequence of word tokens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Phrase {
    words: Vec<String>,
}

impl Phrase {
    /// Create a phrase from tokens. Fails on zero tokens or an empty token.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(PhrasaurusError::invalid_argument(
                "A phrase needs at least one token",
            ));
        }
        if words.iter().any(|w| w.is_empty()) {
            return Err(PhrasaurusError::invalid_argument(
                "A phrase cannot contain an empty token",
            ));
        }
        Ok(Phrase { words })
    }

    /// Split text on whitespace into a phrase.
    pub fn parse(text: &str) -> Result<Self> {
        Phrase::new(text.split_whitespace())
    }

    /// Split a joined form such as `heart_attack` back into tokens.
    pub fn from_joined(text: &str, joiner: char) -> Result<Self> {
        Phrase::new(text.split(joiner).filter(|w| !w.is_empty()))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of tokens.
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Number of characters when rendered with single spaces.
    pub fn length(&self) -> usize {
        let chars: usize = self.words.iter().map(|w| w.chars().count()).sum();
        chars + self.words.len() - 1
    }

    fn resolve(&self, index: isize) -> Option<usize> {
        let len = self.words.len() as isize;
        let resolved = if index < 0 { len + index } else { index };
        (0..len).contains(&resolved).then_some(resolved as usize)
    }

    /// Token at `index`; negative indices count from the end.
    pub fn word(&self, index: isize) -> Option<&str> {
        self.resolve(index).map(|i| self.words[i].as_str())
    }

    pub fn first_word(&self) -> &str {
        &self.words[0]
    }

    pub fn last_word(&self) -> &str {
        &self.words[self.words.len() - 1]
    }

    /// The phrase with one token dropped. `None` if the index is out of
    /// range or the phrase would become empty.
    pub fn without(&self, index: isize) -> Option<Phrase> {
        let skip = self.resolve(index)?;
        if self.words.len() == 1 {
            return None;
        }
        let words = self
            .words
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, w)| w.clone())
            .collect();
        Some(Phrase { words })
    }

    /// Single-token sub-phrase at `index`.
    pub fn one_word_phrase(&self, index: isize) -> Option<Phrase> {
        self.resolve(index).map(|i| Phrase {
            words: vec![self.words[i].clone()],
        })
    }

    /// Contiguous sub-phrase over `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Option<Phrase> {
        if start >= end || end > self.words.len() {
            return None;
        }
        Some(Phrase {
            words: self.words[start..end].to_vec(),
        })
    }

    /// This phrase followed by one more token.
    pub fn extended(&self, word: &str) -> Phrase {
        let mut words = self.words.clone();
        words.push(word.to_string());
        Phrase { words }
    }

    /// Every ordering of the tokens, the original order included.
    pub fn permutations(&self) -> Vec<Phrase> {
        let mut out = Vec::new();
        let mut words = self.words.clone();
        permute(&mut words, 0, &mut out);
        out
    }

    pub fn to_lowercase(&self) -> Phrase {
        Phrase {
            words: self.words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Render with `joiner` between tokens (`heart_attack`).
    pub fn joined(&self, joiner: char) -> String {
        let mut buf = [0u8; 4];
        self.words.join(joiner.encode_utf8(&mut buf))
    }
}

fn permute(words: &mut Vec<String>, k: usize, out: &mut Vec<Phrase>) {
    if k == words.len() {
        out.push(Phrase {
            words: words.clone(),
        });
        return;
    }
    for i in k..words.len() {
        words.swap(k, i);
        permute(words, k + 1, out);
        words.swap(k, i);
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words.join(" "))
    }
}

impl std::str::FromStr for Phrase {
    type Err = PhrasaurusError;

    fn from_str(s: &str) -> Result<Self> {
        Phrase::parse(s)
    }
}

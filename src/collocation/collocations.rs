//! The set of detected collocations and its plain-text persistence.

use std::io::{BufRead, Write};

use ahash::{AHashMap, AHashSet};
use tracing::info;

use crate::error::{PhrasaurusError, Result};
use crate::phrase::{Phrase, TOKEN_JOINER};

/// Phrases judged to be collocations, each with a confidence score.
///
/// Re-inserting a phrase overwrites its score.
#[derive(Debug, Clone, Default)]
pub struct Collocations {
    scores: AHashMap<Phrase, f64>,
}

impl Collocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a collocation.
    pub fn put(&mut self, phrase: Phrase, score: f64) {
        self.scores.insert(phrase, score);
    }

    pub fn contains(&self, phrase: &Phrase) -> bool {
        self.scores.contains_key(phrase)
    }

    pub fn score(&self, phrase: &Phrase) -> Option<f64> {
        self.scores.get(phrase).copied()
    }

    pub fn remove(&mut self, phrase: &Phrase) -> Option<f64> {
        self.scores.remove(phrase)
    }

    /// Keep only the collocations for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Phrase, f64) -> bool,
    {
        self.scores.retain(|phrase, score| keep(phrase, *score));
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// All collocations with exactly `size` tokens.
    pub fn of_length(&self, size: usize) -> Vec<&Phrase> {
        self.scores.keys().filter(|p| p.size() == size).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Phrase, f64)> {
        self.scores.iter().map(|(p, s)| (p, *s))
    }

    /// Token count of the longest collocation, 0 when empty.
    pub fn max_length(&self) -> usize {
        self.scores.keys().map(Phrase::size).max().unwrap_or(0)
    }

    /// Write one `phrase<TAB>score` line per collocation, sorted by phrase.
    pub fn save_plaintext<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut entries: Vec<(&Phrase, f64)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (phrase, score) in entries {
            writeln!(writer, "{phrase}\t{score}")?;
        }
        writer.flush()?;
        info!(count = self.len(), "Saved collocations");
        Ok(())
    }

    pub fn load_plaintext<R: BufRead>(reader: R) -> Result<Self> {
        let mut collocations = Collocations::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (text, score) = line
                .split_once('\t')
                .ok_or_else(|| PhrasaurusError::parse(i + 1, "missing score field"))?;
            let score = score.trim().parse::<f64>().map_err(|e| {
                PhrasaurusError::parse(i + 1, format!("bad score {score:?}: {e}"))
            })?;
            let phrase =
                Phrase::parse(text).map_err(|_| PhrasaurusError::parse(i + 1, "empty phrase"))?;
            collocations.put(phrase, score);
        }
        info!(count = collocations.len(), "Loaded collocations");
        Ok(collocations)
    }

    /// Build a matcher for rewriting text. Without case sensitivity both the
    /// collocations and the text are lowercased.
    pub fn matcher(&self, case_sensitive: bool) -> CollocationMatcher {
        let phrases: AHashSet<Phrase> = self
            .scores
            .keys()
            .map(|p| if case_sensitive { p.clone() } else { p.to_lowercase() })
            .collect();
        CollocationMatcher {
            max_length: phrases.iter().map(Phrase::size).max().unwrap_or(0),
            phrases,
            case_sensitive,
        }
    }

    /// Rewrite one line. Builds a fresh matcher; use [`Self::matcher`] for
    /// many lines.
    pub fn apply_to_line(&self, line: &str, case_sensitive: bool) -> String {
        self.matcher(case_sensitive).apply(line)
    }

    /// Rewrite every line of a corpus. Returns the number of lines written.
    pub fn apply_to_corpus<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
        case_sensitive: bool,
    ) -> Result<usize> {
        let matcher = self.matcher(case_sensitive);
        let mut lines = 0;
        for line in reader.lines() {
            writeln!(writer, "{}", matcher.apply(&line?))?;
            lines += 1;
            if lines % 1_000_000 == 0 {
                info!(lines, "Lines rewritten");
            }
        }
        writer.flush()?;
        Ok(lines)
    }
}

/// Greedy longest-match rewriter joining collocation tokens with `_`.
#[derive(Debug, Clone)]
pub struct CollocationMatcher {
    phrases: AHashSet<Phrase>,
    max_length: usize,
    case_sensitive: bool,
}

impl CollocationMatcher {
    fn longest_match(&self, tokens: &[&str]) -> usize {
        let upper = self.max_length.min(tokens.len());
        (2..=upper)
            .rev()
            .find(|&n| {
                Phrase::new(tokens[..n].iter().copied())
                    .is_ok_and(|p| self.phrases.contains(&p))
            })
            .unwrap_or(1)
    }

    pub fn apply(&self, line: &str) -> String {
        let line = if self.case_sensitive {
            line.to_string()
        } else {
            line.to_lowercase()
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut out: Vec<String> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        let mut joiner = [0u8; 4];
        let joiner = TOKEN_JOINER.encode_utf8(&mut joiner);
        while i < tokens.len() {
            let n = self.longest_match(&tokens[i..]);
            out.push(tokens[i..i + n].join(joiner));
            i += n;
        }
        out.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(text: &str) -> Phrase {
        Phrase::parse(text).unwrap()
    }

    fn sample() -> Collocations {
        let mut col = Collocations::new();
        col.put(phrase("heart attack"), 0.92);
        col.put(phrase("acute heart attack"), 0.7);
        col.put(phrase("New York"), 0.8);
        col
    }

    #[test]
    fn test_put_overwrites() {
        let mut col = sample();
        col.put(phrase("heart attack"), 0.5);
        assert_eq!(col.len(), 3);
        assert_eq!(col.score(&phrase("heart attack")), Some(0.5));
        assert_eq!(col.max_length(), 3);
        assert_eq!(col.of_length(2).len(), 2);
        assert_eq!(col.remove(&phrase("New York")), Some(0.8));
        assert!(!col.contains(&phrase("New York")));
    }

    #[test]
    fn test_plaintext_is_sorted_and_reloads() {
        let col = sample();
        let mut buf = Vec::new();
        col.save_plaintext(&mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "New York\t0.8");

        let back = Collocations::load_plaintext(buf.as_slice()).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.score(&phrase("acute heart attack")), Some(0.7));
    }

    #[test]
    fn test_load_rejects_bad_score() {
        let err = Collocations::load_plaintext("heart attack\tlots\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PhrasaurusError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_apply_prefers_longest_match() {
        let col = sample();
        assert_eq!(
            col.apply_to_line("an acute heart attack today", true),
            "an acute_heart_attack today"
        );
        assert_eq!(
            col.apply_to_line("a heart attack in New York", true),
            "a heart_attack in New_York"
        );
        assert_eq!(col.apply_to_line("moving to new york", true), "moving to new york");
        assert_eq!(col.apply_to_line("Moving to NEW York", false), "moving to new_york");
    }

    #[test]
    fn test_apply_to_corpus() {
        let col = sample();
        let mut out = Vec::new();
        let lines = col
            .apply_to_corpus("heart attack\n\nno match\n".as_bytes(), &mut out, true)
            .unwrap();
        assert_eq!(lines, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "heart_attack\n\nno match\n");
    }
}

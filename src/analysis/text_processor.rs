//! Regex-based text normalizers applied to corpora before counting.
//!
//! Normalizers are a closed set of variants selected by
//! [`TextProcessorKind`]. The moderate normalizer replaces e-mails, dates,
//! times, phone numbers, long numerals and paragraph breaks with dummy tokens
//! that all share the [`DUMMY_TOKEN_PREFIX`]; any phrase containing one is
//! treated as noise downstream.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PhrasaurusError, Result};

const PROGRESS_INTERVAL: usize = 100_000;

/// Marker shared by every dummy token emitted by [`TextProcessor::Moderate`].
pub const DUMMY_TOKEN_PREFIX: &str = "zxzxpz";

lazy_static! {
    // Applied in order; later patterns see the output of earlier ones.
    static ref MODERATE_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"[\w.\-]+@[\w\-]+\.\w{2,3}").unwrap(), " zxzxpzemail "),
        (Regex::new(r"[0-9]{1,4}/[0-9]{1,2}/[0-9]{1,4}").unwrap(), " zxzxpzdate "),
        (Regex::new(r"\d{1,2}:\d{2}(:\d{2})?").unwrap(), " zxzxpztime "),
        (Regex::new(r"(\d{3}-|\(\d{3}\) ?)\d{3}-\d{4}").unwrap(), " zxzxpzphone "),
        (Regex::new(r"[\d\-.,~]{3,}(\D|$)").unwrap(), " zxzxpznumeral ${1}"),
        (Regex::new(r#"[()\[\]{}".,;:?!]"#).unwrap(), ""),
        (Regex::new(r"([a-zA-Z])([~\-/&])").unwrap(), "${1} ${2}"),
        (Regex::new(r"([~\-/&])([a-zA-Z])").unwrap(), "${1} ${2}"),
        (Regex::new(r"[ \t]{4,}").unwrap(), " zxzxpznewln "),
        (Regex::new(r"[ \t]+").unwrap(), " "),
    ];

    static ref AGGRESSIVE_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"[^a-zA-Z0-9]+").unwrap(), " "),
        (Regex::new(r"(\s)\d+\s").unwrap(), "${1}"),
    ];
}

/// Collapse runs of three or more identical non-alphanumeric characters to
/// two (`*****` becomes `**`).
fn collapse_symbol_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run_char: Option<char> = None;
    let mut run_len = 0usize;
    for c in text.chars() {
        if Some(c) == run_char {
            run_len += 1;
        } else {
            run_char = Some(c);
            run_len = 1;
        }
        if c.is_ascii_alphanumeric() || run_len <= 2 {
            out.push(c);
        }
    }
    out
}

fn apply_patterns(patterns: &[(Regex, &'static str)], text: &str) -> String {
    let mut current = text.to_string();
    for (pattern, replacement) in patterns {
        current = pattern.replace_all(&current, *replacement).into_owned();
    }
    current
}

/// Names the normalizer in configuration files and thesaurus headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextProcessorKind {
    /// Leave text untouched.
    Null,
    /// Dummy-token replacement of noisy spans, punctuation removal.
    #[default]
    Moderate,
    /// Strip every non-alphanumeric character, drop numbers, lowercase.
    Aggressive,
}

impl TextProcessorKind {
    pub fn name(&self) -> &'static str {
        match self {
            TextProcessorKind::Null => "null",
            TextProcessorKind::Moderate => "moderate",
            TextProcessorKind::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for TextProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextProcessorKind {
    type Err = PhrasaurusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "null" | "none" => Ok(TextProcessorKind::Null),
            "moderate" => Ok(TextProcessorKind::Moderate),
            "aggressive" => Ok(TextProcessorKind::Aggressive),
            other => Err(PhrasaurusError::config(format!(
                "Unknown text processor: {other}"
            ))),
        }
    }
}

/// A stateless text normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextProcessor {
    kind: TextProcessorKind,
}

impl TextProcessor {
    pub fn new(kind: TextProcessorKind) -> Self {
        TextProcessor { kind }
    }

    pub fn null() -> Self {
        Self::new(TextProcessorKind::Null)
    }

    pub fn moderate() -> Self {
        Self::new(TextProcessorKind::Moderate)
    }

    pub fn aggressive() -> Self {
        Self::new(TextProcessorKind::Aggressive)
    }

    pub fn kind(&self) -> TextProcessorKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Normalize a piece of text.
    pub fn process(&self, text: &str) -> String {
        match self.kind {
            TextProcessorKind::Null => text.to_string(),
            TextProcessorKind::Moderate => {
                collapse_symbol_runs(&apply_patterns(&MODERATE_PATTERNS, text))
            }
            TextProcessorKind::Aggressive => {
                apply_patterns(&AGGRESSIVE_PATTERNS, text).to_lowercase()
            }
        }
    }

    /// Whether `text` holds a dummy token this normalizer emits. Always false
    /// for normalizers that emit none.
    pub fn contains_dummy_token(&self, text: &str) -> bool {
        match self.kind {
            TextProcessorKind::Moderate => text.contains(DUMMY_TOKEN_PREFIX),
            TextProcessorKind::Null | TextProcessorKind::Aggressive => false,
        }
    }

    /// Normalize a corpus line by line, skipping lines that are empty or
    /// only whitespace. Returns the number of lines written.
    pub fn process_corpus<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<usize> {
        let mut written = 0;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!(lines = i + 1, "Lines processed");
            }
            if line.trim().is_empty() {
                continue;
            }
            writeln!(writer, "{}", self.process(&line))?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }
}

impl From<TextProcessorKind> for TextProcessor {
    fn from(kind: TextProcessorKind) -> Self {
        TextProcessor::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_processor_is_identity() {
        let processor = TextProcessor::null();
        assert_eq!(processor.process("Hello, World!"), "Hello, World!");
        assert!(!processor.contains_dummy_token("zxzxpzdate"));
    }

    #[test]
    fn test_moderate_replaces_noise_with_dummy_tokens() {
        let processor = TextProcessor::moderate();
        let out = processor.process("Call 555-123-4567 on 3/4/2016.");
        assert!(out.contains("zxzxpzphone"), "{out}");
        assert!(out.contains("zxzxpzdate"), "{out}");
        assert!(!out.contains('.'));
        assert!(processor.contains_dummy_token(&out));

        let out = processor.process("mail jdoe@example.com at 10:30");
        assert!(out.contains("zxzxpzemail"), "{out}");
        assert!(out.contains("zxzxpztime"), "{out}");
    }

    #[test]
    fn test_moderate_splits_hyphens_and_collapses() {
        let processor = TextProcessor::moderate();
        assert_eq!(processor.process("heart-attack"), "heart - attack");
        assert_eq!(processor.process("Notes *****"), "Notes **");
        assert_eq!(processor.process("a  b"), "a b");
        assert!(processor.process("end    start").contains("zxzxpznewln"));
        assert!(!processor.contains_dummy_token("heart attack"));
    }

    #[test]
    fn test_aggressive_processor() {
        let processor = TextProcessor::aggressive();
        assert_eq!(processor.process("Heart-Attack (MI)"), "heart attack mi ");
        assert_eq!(processor.process("take 2 pills"), "take pills");
        assert!(!processor.contains_dummy_token("zxzxpz"));
    }

    #[test]
    fn test_process_corpus_skips_blank_lines() {
        let input = "Heart attack.\n   \n\nStroke, again\n";
        let mut out = Vec::new();
        let written = TextProcessor::moderate()
            .process_corpus(input.as_bytes(), &mut out)
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "Heart attack\nStroke again\n");
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            TextProcessorKind::Null,
            TextProcessorKind::Moderate,
            TextProcessorKind::Aggressive,
        ] {
            assert_eq!(kind.name().parse::<TextProcessorKind>().unwrap(), kind);
        }
        assert!("reflection".parse::<TextProcessorKind>().is_err());
    }
}

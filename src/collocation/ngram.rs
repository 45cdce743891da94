//! N-gram count tables read from tab-separated count files.
//!
//! Each line of a count file is `phrase<TAB>count`, one file per n-gram
//! order. Tables are kept in an arena indexed by order.

use std::io::{BufRead, Write};

use ahash::AHashMap;
use tracing::info;

use crate::analysis::TextProcessor;
use crate::error::{PhrasaurusError, Result};
use crate::phrase::Phrase;

/// One parsed line of a count file.
#[derive(Debug, Clone, PartialEq)]
pub struct NgramRecord {
    pub phrase: Phrase,
    pub count: u64,
}

/// Pull the count out of a `phrase<TAB>count` line.
fn parse_count(line: &str, line_no: usize) -> Result<(&str, u64)> {
    let mut fields = line.split('\t');
    let text = fields.next().unwrap_or_default();
    let count_field = fields
        .next()
        .ok_or_else(|| PhrasaurusError::parse(line_no, "missing count field"))?;
    let count = count_field.trim().parse::<u64>().map_err(|e| {
        PhrasaurusError::parse(line_no, format!("bad count {count_field:?}: {e}"))
    })?;
    Ok((text, count))
}

impl NgramRecord {
    /// Parse a line; `line_no` is 1-based and only used in errors.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let (text, count) = parse_count(line, line_no)?;
        let phrase = Phrase::parse(text)
            .map_err(|_| PhrasaurusError::parse(line_no, "empty n-gram"))?;
        Ok(NgramRecord { phrase, count })
    }
}

/// Phrase counts for a single order.
#[derive(Debug, Clone, Default)]
pub struct NgramTable {
    counts: AHashMap<Phrase, u64>,
}

impl NgramTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences, summing with any existing entry.
    pub fn add(&mut self, phrase: Phrase, count: u64) {
        *self.counts.entry(phrase).or_insert(0) += count;
    }

    pub fn get(&self, phrase: &Phrase) -> Option<u64> {
        self.counts.get(phrase).copied()
    }

    pub fn contains(&self, phrase: &Phrase) -> bool {
        self.counts.contains_key(phrase)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Phrase, u64)> {
        self.counts.iter().map(|(p, c)| (p, *c))
    }
}

/// Count tables for orders `1..=n`, plus the total unigram token count.
#[derive(Debug, Clone, Default)]
pub struct NgramTables {
    tables: Vec<NgramTable>,
    total_tokens: u64,
}

impl NgramTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the table for the next order.
    pub fn push(&mut self, table: NgramTable) {
        self.tables.push(table);
    }

    /// Highest order held.
    pub fn max_order(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, order: usize) -> Option<&NgramTable> {
        order.checked_sub(1).and_then(|i| self.tables.get(i))
    }

    /// Count of a phrase in the table for its own length.
    pub fn count(&self, phrase: &Phrase) -> Option<u64> {
        self.table(phrase.size()).and_then(|t| t.get(phrase))
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn add_tokens(&mut self, count: u64) {
        self.total_tokens += count;
    }

    /// Override the token total, e.g. when unigram counts are pre-pruned.
    pub fn set_total_tokens(&mut self, total: u64) {
        self.total_tokens = total;
    }
}

/// Copy a count file, dropping lines with a dummy token or a count below
/// `min_count`. Returns `(kept, dropped)`.
pub fn prune_ngram_counts<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    min_count: u64,
    processor: &TextProcessor,
) -> Result<(usize, usize)> {
    info!(min_count, "Pruning n-gram counts");
    let mut kept = 0;
    let mut dropped = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if processor.contains_dummy_token(&line) {
            dropped += 1;
            continue;
        }
        let (_, count) = parse_count(&line, i + 1)?;
        if count < min_count {
            dropped += 1;
            continue;
        }
        writeln!(writer, "{line}")?;
        kept += 1;
    }
    writer.flush()?;
    Ok((kept, dropped))
}

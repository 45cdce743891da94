//! Bulk pairwise distance computation over large batches of phrase pairs.
//!
//! Each worker owns a contiguous slice of the result vector, see
//! [`Partitioner`].

use std::io::{BufRead, Write};

use tracing::info;

use crate::error::{PhrasaurusError, Result};
use crate::orthography::scorer::PhraseScorer;
use crate::phrase::Phrase;
use crate::util::partition::Partitioner;

/// Normalized, permutation-aware orthographic distance for every pair.
pub fn orthographic_distances(
    pairs: &[(Phrase, Phrase)],
    scorer: &PhraseScorer,
    partitioner: &Partitioner,
) -> Vec<f64> {
    info!(
        pairs = pairs.len(),
        threads = partitioner.threads(),
        "Calculating orthographic distances"
    );
    partitioner.map(pairs.len(), |i| {
        let (a, b) = &pairs[i];
        scorer.orthographic_distance(a, b)
    })
}

/// Normalized abbreviation distance for every pair, taking the first phrase
/// of each pair as the abbreviation.
pub fn abbreviation_distances(
    pairs: &[(Phrase, Phrase)],
    scorer: &PhraseScorer,
    partitioner: &Partitioner,
) -> Vec<f64> {
    info!(
        pairs = pairs.len(),
        threads = partitioner.threads(),
        "Calculating abbreviation distances"
    );
    partitioner.map(pairs.len(), |i| {
        let (abbreviation, long_form) = &pairs[i];
        scorer.directed_abbreviation_distance(abbreviation, long_form)
    })
}

/// Read `phrase<TAB>phrase` lines. Blank lines are skipped.
pub fn read_pairs<R: BufRead>(reader: R) -> Result<Vec<(Phrase, Phrase)>> {
    let mut pairs = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (a, b) = line
            .split_once('\t')
            .ok_or_else(|| PhrasaurusError::parse(i + 1, "expected two tab-separated phrases"))?;
        let a = Phrase::parse(a).map_err(|e| PhrasaurusError::parse(i + 1, e.to_string()))?;
        let b = Phrase::parse(b).map_err(|e| PhrasaurusError::parse(i + 1, e.to_string()))?;
        pairs.push((a, b));
    }
    Ok(pairs)
}

/// Write each pair followed by its distance, tab-separated.
pub fn write_distances<W: Write>(
    mut writer: W,
    pairs: &[(Phrase, Phrase)],
    distances: &[f64],
) -> Result<()> {
    for ((a, b), distance) in pairs.iter().zip(distances) {
        writeln!(writer, "{a}\t{b}\t{distance}")?;
    }
    writer.flush()?;
    Ok(())
}

//! Incremental NPMI collocation detection over n-gram count tables.
//!
//! Orders are fed strictly in increasing order. Bigrams are scored against
//! their two unigrams. Longer n-grams are only considered when the n-gram
//! minus its first or last word is already a collocation, so collocations
//! grow one word at a time. Trigrams get one extra chance through a
//! skip-middle score that ignores the middle word (e.g. "bank of america").

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::TextProcessor;
use crate::collocation::collocations::Collocations;
use crate::collocation::ngram::{NgramRecord, NgramTable, NgramTables};
use crate::collocation::npmi::npmi;
use crate::config::CollocationConfig;
use crate::error::{PhrasaurusError, Result};
use crate::phrase::Phrase;

/// Score given to collocations synthesized by [`CollocationDetector::bootstrap`].
/// Heuristic, not a statistic.
pub const BOOTSTRAP_CONFIDENCE: f64 = 0.1;

const PROGRESS_INTERVAL: usize = 1_000_000;

/// NPMI of `p1` followed by `p2`, with `count` occurrences of the
/// concatenation. 0 when either part has no count or a zero count.
fn two_phrase_npmi(tables: &NgramTables, p1: &Phrase, p2: &Phrase, count: u64) -> f64 {
    let (Some(c1), Some(c2)) = (tables.count(p1), tables.count(p2)) else {
        return 0.0;
    };
    if c1 == 0 || c2 == 0 {
        return 0.0;
    }
    let n = tables.total_tokens() as f64;
    if n == 0.0 {
        return 0.0;
    }
    npmi(c1 as f64 / n, c2 as f64 / n, count as f64 / n)
}

/// Best score of `phrase` grown from a known collocation one order down.
/// `None` when neither the leading nor trailing sub-phrase is a collocation.
fn growth_score(
    tables: &NgramTables,
    collocations: &Collocations,
    phrase: &Phrase,
    count: u64,
) -> Option<f64> {
    let leading = phrase.without(-1)?;
    let trailing = phrase.without(0)?;
    let leading_word = phrase.one_word_phrase(0)?;
    let trailing_word = phrase.one_word_phrase(-1)?;

    let mut best: Option<f64> = None;
    if collocations.contains(&leading) {
        best = Some(two_phrase_npmi(tables, &leading, &trailing_word, count));
    }
    if collocations.contains(&trailing) {
        let score = two_phrase_npmi(tables, &leading_word, &trailing, count);
        best = Some(best.map_or(score, |b| b.max(score)));
    }
    best
}

/// NPMI of the first and last word, ignoring everything in between.
fn skip_middle_score(tables: &NgramTables, phrase: &Phrase, count: u64) -> f64 {
    match (phrase.one_word_phrase(0), phrase.one_word_phrase(-1)) {
        (Some(first), Some(last)) => two_phrase_npmi(tables, &first, &last, count),
        _ => 0.0,
    }
}

/// A collocation survives only if its first and last tokens contain an
/// alphanumeric character.
fn is_admissible(phrase: &Phrase) -> bool {
    let has_alnum = |w: &str| w.chars().any(char::is_alphanumeric);
    has_alnum(phrase.first_word()) && has_alnum(phrase.last_word())
}

/// Best-split NPMI statistics for one n-gram order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAudit {
    pub order: usize,
    pub count: usize,
    pub mean_npmi: f64,
}

/// Best-split NPMI statistics for a set of reference phrases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NpmiAudit {
    /// Phrases that had counts and could be scored.
    pub counted: usize,
    pub mean_npmi: f64,
    pub orders: Vec<OrderAudit>,
}

/// Detects collocations from per-order n-gram count files.
#[derive(Debug)]
pub struct CollocationDetector {
    config: CollocationConfig,
    max_order: usize,
    processor: TextProcessor,
    tables: NgramTables,
    collocations: Collocations,
    last_order: usize,
}

impl CollocationDetector {
    /// `max_order` is the highest n-gram order that will be fed in. Its table
    /// is scored but not retained.
    pub fn new(
        config: CollocationConfig,
        max_order: usize,
        processor: TextProcessor,
    ) -> Result<Self> {
        config.validate()?;
        if max_order == 0 {
            return Err(PhrasaurusError::invalid_argument(
                "At least one n-gram order is required",
            ));
        }
        Ok(CollocationDetector {
            config,
            max_order,
            processor,
            tables: NgramTables::new(),
            collocations: Collocations::new(),
            last_order: 0,
        })
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Read the count file for `order`, which must be exactly one above the
    /// last order processed. Returns the number of n-grams that met the
    /// minimum count.
    pub fn process_order<R: BufRead>(&mut self, order: usize, reader: R) -> Result<usize> {
        if order != self.last_order + 1 || order > self.max_order {
            return Err(PhrasaurusError::invalid_operation(format!(
                "Expected n-gram order {} (of at most {}), got {order}",
                self.last_order + 1,
                self.max_order
            )));
        }
        info!(order, "Loading n-grams");

        let min_count = self.config.min_count(order);
        let threshold = self.config.npmi_threshold(order);
        let bigram_threshold = self.config.npmi_threshold(2);
        let keep_table = order < self.max_order;
        let mut table = NgramTable::new();
        let mut accepted = 0;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || self.processor.contains_dummy_token(&line) {
                continue;
            }
            let NgramRecord { phrase, count } = NgramRecord::parse(&line, i + 1)?;
            if phrase.size() != order {
                return Err(PhrasaurusError::parse(
                    i + 1,
                    format!("expected {order} tokens, found {}", phrase.size()),
                ));
            }
            if count < min_count {
                continue;
            }

            match order {
                1 => self.tables.add_tokens(count),
                2 => {
                    let (Some(first), Some(second)) =
                        (phrase.one_word_phrase(0), phrase.one_word_phrase(1))
                    else {
                        continue;
                    };
                    let score = two_phrase_npmi(&self.tables, &first, &second, count);
                    if score > threshold {
                        self.collocations.put(phrase.clone(), score);
                    }
                }
                _ => match growth_score(&self.tables, &self.collocations, &phrase, count) {
                    Some(score) if score >= threshold => {
                        self.collocations.put(phrase.clone(), score);
                    }
                    _ if order == 3 => {
                        let score = skip_middle_score(&self.tables, &phrase, count);
                        if score > bigram_threshold {
                            self.collocations.put(phrase.clone(), score);
                        }
                    }
                    _ => {}
                },
            }

            if keep_table {
                table.add(phrase, count);
            }
            accepted += 1;
            if accepted % PROGRESS_INTERVAL == 0 {
                info!(order, lines = accepted, "n-grams processed");
            }
        }

        if keep_table {
            self.tables.push(table);
        }
        self.last_order = order;
        debug!(order, accepted, collocations = self.collocations.len(), "Order done");
        Ok(accepted)
    }

    /// Drop collocations whose first or last token has no alphanumeric
    /// character. Returns the number removed.
    pub fn finish(&mut self) -> usize {
        let before = self.collocations.len();
        self.collocations.retain(|phrase, _| is_admissible(phrase));
        let removed = before - self.collocations.len();
        info!(removed, total = self.collocations.len(), "Filtered collocations");
        removed
    }

    /// Process one reader per remaining order, then apply the admissibility
    /// filter.
    pub fn generate<I, R>(&mut self, readers: I) -> Result<&Collocations>
    where
        I: IntoIterator<Item = R>,
        R: BufRead,
    {
        for reader in readers {
            let order = self.last_order + 1;
            self.process_order(order, reader)?;
        }
        if self.last_order != self.max_order {
            return Err(PhrasaurusError::invalid_operation(format!(
                "Only {} of {} n-gram orders were supplied",
                self.last_order, self.max_order
            )));
        }
        self.finish();
        Ok(&self.collocations)
    }

    /// [`Self::generate`] over count files, unigrams first.
    pub fn generate_from_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<&Collocations> {
        let readers = paths
            .iter()
            .map(|p| File::open(p).map(BufReader::new))
            .collect::<std::io::Result<Vec<_>>>()?;
        self.generate(readers)
    }

    /// NPMI of two adjacent phrases whose concatenation occurred `count` times.
    pub fn two_phrase_npmi(&self, p1: &Phrase, p2: &Phrase, count: u64) -> f64 {
        two_phrase_npmi(&self.tables, p1, p2, count)
    }

    /// Best NPMI over splitting off the first or last word. 0 if the phrase's
    /// order was not retained or the phrase has no count.
    pub fn highest_order_npmi(&self, phrase: &Phrase) -> f64 {
        if phrase.size() < 2 {
            return 0.0;
        }
        let Some(count) = self.tables.count(phrase) else {
            return 0.0;
        };
        let (Some(leading), Some(trailing), Some(first), Some(last)) = (
            phrase.without(-1),
            phrase.without(0),
            phrase.one_word_phrase(0),
            phrase.one_word_phrase(-1),
        ) else {
            return 0.0;
        };
        if phrase.size() == 2 {
            return self.two_phrase_npmi(&first, &last, count);
        }
        self.two_phrase_npmi(&leading, &last, count)
            .max(self.two_phrase_npmi(&first, &trailing, count))
    }

    /// NPMI of the first and last word of a counted phrase. 0 if uncounted.
    pub fn skip_middle_npmi(&self, phrase: &Phrase) -> f64 {
        match self.tables.count(phrase) {
            Some(count) if phrase.size() >= 2 => skip_middle_score(&self.tables, phrase, count),
            _ => 0.0,
        }
    }

    /// Best-split NPMI of reference phrases, grouped by order. Phrases
    /// without counts are ignored.
    pub fn audit<'a, I>(&self, phrases: I) -> NpmiAudit
    where
        I: IntoIterator<Item = &'a Phrase>,
    {
        let mut by_order: BTreeMap<usize, (usize, f64)> = BTreeMap::new();
        for phrase in phrases {
            if phrase.size() < 2 || self.tables.count(phrase).is_none() {
                continue;
            }
            let score = self.highest_order_npmi(phrase);
            let slot = by_order.entry(phrase.size()).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += score;
        }

        let counted: usize = by_order.values().map(|(n, _)| n).sum();
        let total: f64 = by_order.values().map(|(_, s)| s).sum();
        NpmiAudit {
            counted,
            mean_npmi: if counted > 0 { total / counted as f64 } else { 0.0 },
            orders: by_order
                .into_iter()
                .map(|(order, (count, sum))| OrderAudit {
                    order,
                    count,
                    mean_npmi: sum / count as f64,
                })
                .collect(),
        }
    }

    /// Synthesize collocations of length `from_order + 1` by overlapping two
    /// collocations of length `from_order` that share `from_order - 1`
    /// tokens. New phrases get [`BOOTSTRAP_CONFIDENCE`]. Returns the number
    /// of phrases added.
    pub fn bootstrap(&mut self, from_order: usize) -> Result<usize> {
        if from_order < 2 {
            return Err(PhrasaurusError::invalid_argument(format!(
                "Bootstrapping needs collocations of at least 2 tokens, got {from_order}"
            )));
        }
        info!(
            length = from_order + 1,
            "Generating collocations without n-gram counts"
        );

        let sources = self.collocations.of_length(from_order);
        let mut by_prefix: AHashMap<&[String], Vec<&Phrase>> = AHashMap::new();
        for &phrase in &sources {
            by_prefix
                .entry(&phrase.words()[..from_order - 1])
                .or_default()
                .push(phrase);
        }

        let mut synthesized: AHashSet<Phrase> = AHashSet::new();
        for head in &sources {
            let suffix = &head.words()[1..];
            if let Some(tails) = by_prefix.get(suffix) {
                for tail in tails {
                    synthesized.insert(head.extended(tail.last_word()));
                }
            }
        }

        let mut added = 0;
        for phrase in synthesized {
            if !self.collocations.contains(&phrase) {
                added += 1;
            }
            self.collocations.put(phrase, BOOTSTRAP_CONFIDENCE);
        }
        info!(added, "Collocations added for this length");
        Ok(added)
    }

    /// Bootstrap from the highest counted order up to `max_phrase_length`.
    pub fn bootstrap_to(&mut self, max_phrase_length: usize) -> Result<usize> {
        let mut added = 0;
        for from_order in self.max_order.max(2)..max_phrase_length {
            added += self.bootstrap(from_order)?;
        }
        Ok(added)
    }

    pub fn collocations(&self) -> &Collocations {
        &self.collocations
    }

    pub fn into_collocations(self) -> Collocations {
        self.collocations
    }

    pub fn total_tokens(&self) -> u64 {
        self.tables.total_tokens()
    }

    pub fn tables(&self) -> &NgramTables {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIGRAMS: &str = "a\t100\nb\t50\nheart\t40\nattack\t30\nthe\t99780\n";

    const UNIGRAMS_3: &str = "heart\t40\nattack\t30\nrisk\t20\nof\t1000\nbank\t50\n\
america\t60\n--\t5\nzxzxpzdate\t500\nthe\t98795\n";
    const BIGRAMS_3: &str =
        "heart attack\t25\nattack risk\t1\nbank of\t10\nof america\t10\n-- --\t4\n";
    const TRIGRAMS_3: &str = "heart attack risk\t15\nbank of america\t9\nthe heart attack\t20\n";

    fn phrase(text: &str) -> Phrase {
        Phrase::parse(text).unwrap()
    }

    fn config(thresholds: Vec<f64>) -> CollocationConfig {
        CollocationConfig {
            npmi_thresholds: thresholds,
            ..Default::default()
        }
    }

    fn three_order_detector() -> CollocationDetector {
        let mut detector =
            CollocationDetector::new(config(vec![0.5, 0.6]), 3, TextProcessor::moderate()).unwrap();
        detector
            .generate([
                UNIGRAMS_3.as_bytes(),
                BIGRAMS_3.as_bytes(),
                TRIGRAMS_3.as_bytes(),
            ])
            .unwrap();
        detector
    }

    #[test]
    fn test_heart_attack_bigram_admitted() {
        let mut detector =
            CollocationDetector::new(config(vec![0.5]), 2, TextProcessor::moderate()).unwrap();
        detector
            .generate([UNIGRAMS.as_bytes(), "heart attack\t25\n".as_bytes()])
            .unwrap();

        assert_eq!(detector.total_tokens(), 100_000);
        let score = detector.collocations().score(&phrase("heart attack")).unwrap();
        assert!(score > 0.9 && score < 0.93, "{score}");
        // the top order is scored but not kept
        assert!(detector.tables().table(2).is_none());
    }

    #[test]
    fn test_dummy_tokens_do_not_count() {
        let detector = three_order_detector();
        assert_eq!(detector.total_tokens(), 100_000);
        assert!(detector.tables().count(&phrase("zxzxpzdate")).is_none());
    }

    #[test]
    fn test_growth_from_known_collocation() {
        let detector = three_order_detector();
        let collocations = detector.collocations();
        assert!(collocations.contains(&phrase("heart attack")));
        assert!(!collocations.contains(&phrase("attack risk")));
        assert!(collocations.score(&phrase("heart attack risk")).unwrap() >= 0.6);
    }

    #[test]
    fn test_known_subphrase_alone_is_not_enough() {
        let detector = three_order_detector();
        assert!(!detector.collocations().contains(&phrase("the heart attack")));
    }

    #[test]
    fn test_skip_middle_fallback() {
        let detector = three_order_detector();
        let collocations = detector.collocations();
        assert!(!collocations.contains(&phrase("bank of")));
        assert!(!collocations.contains(&phrase("of america")));
        let score = collocations.score(&phrase("bank of america")).unwrap();
        assert!(score > 0.5 && score < 0.65, "{score}");
    }

    #[test]
    fn test_symbol_only_collocations_filtered() {
        let detector = three_order_detector();
        assert!(!detector.collocations().contains(&phrase("-- --")));
        assert_eq!(detector.collocations().len(), 3);
    }

    #[test]
    fn test_orders_must_increase() {
        let mut detector =
            CollocationDetector::new(config(vec![0.5]), 2, TextProcessor::null()).unwrap();
        let err = detector.process_order(2, "a b\t1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PhrasaurusError::InvalidOperation(_)));
        detector.process_order(1, UNIGRAMS.as_bytes()).unwrap();
        assert!(detector.process_order(1, UNIGRAMS.as_bytes()).is_err());
        assert!(detector.process_order(3, "a b c\t1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_malformed_count_is_fatal() {
        let mut detector =
            CollocationDetector::new(config(vec![0.5]), 2, TextProcessor::null()).unwrap();
        let err = detector.process_order(1, "a\t1\nb\tmany\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PhrasaurusError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_min_count_filters_records() {
        let cfg = CollocationConfig {
            min_counts: vec![1, 30],
            ..config(vec![0.5])
        };
        let mut detector = CollocationDetector::new(cfg, 2, TextProcessor::null()).unwrap();
        detector
            .generate([UNIGRAMS.as_bytes(), "heart attack\t25\n".as_bytes()])
            .unwrap();
        assert!(detector.collocations().is_empty());
    }

    #[test]
    fn test_zero_count_parts_score_zero() {
        let cfg = CollocationConfig {
            min_counts: vec![0],
            ..config(vec![0.5])
        };
        let mut detector = CollocationDetector::new(cfg, 2, TextProcessor::null()).unwrap();
        detector
            .generate(["a\t0\nb\t10\nthe\t100\n".as_bytes(), "a b\t3\n".as_bytes()])
            .unwrap();
        assert_eq!(detector.tables().count(&phrase("a")), Some(0));
        assert_eq!(detector.two_phrase_npmi(&phrase("a"), &phrase("b"), 3), 0.0);
        assert!(detector.collocations().is_empty());
    }

    #[test]
    fn test_trigram_needs_collocation_or_skip_middle() {
        // "x y" and "y z" score 0.5, below the bigram threshold; "x" and "z"
        // are too common for the skip-middle score to pass.
        let unigrams = "x\t1000\ny\t10\nz\t1000\nthe\t97990\n";
        let bigrams = "x y\t10\ny z\t10\n";
        let trigrams = "x y z\t10\n";
        let mut detector =
            CollocationDetector::new(config(vec![0.6, 0.4]), 3, TextProcessor::null()).unwrap();
        detector
            .generate([unigrams.as_bytes(), bigrams.as_bytes(), trigrams.as_bytes()])
            .unwrap();

        let trigram = phrase("x y z");
        let split = detector.two_phrase_npmi(&phrase("x y"), &phrase("z"), 10);
        assert!(split >= 0.4, "{split}");
        assert!(detector.two_phrase_npmi(&phrase("x"), &phrase("z"), 10) < 0.6);
        assert!(!detector.collocations().contains(&phrase("x y")));
        assert!(!detector.collocations().contains(&phrase("y z")));
        assert!(!detector.collocations().contains(&trigram));
    }

    #[test]
    fn test_four_grams_grow_from_trigram_collocations() {
        let unigrams = "a\t10\nb\t10\nc\t10\nd\t10\nthe\t99960\n";
        let bigrams = "a b\t10\nb c\t1\nc d\t1\n";
        let trigrams = "a b c\t10\nb c d\t1\n";
        // "c d a b" has a strong first/last pair but no collocation inside
        let four_grams = "a b c d\t10\nc d a b\t10\n";
        let mut detector =
            CollocationDetector::new(config(vec![0.7]), 4, TextProcessor::null()).unwrap();
        detector
            .generate([
                unigrams.as_bytes(),
                bigrams.as_bytes(),
                trigrams.as_bytes(),
                four_grams.as_bytes(),
            ])
            .unwrap();

        let collocations = detector.collocations();
        assert!(collocations.contains(&phrase("a b")));
        assert!(!collocations.contains(&phrase("b c")));
        assert!(collocations.contains(&phrase("a b c")));
        assert!(!collocations.contains(&phrase("b c d")));
        assert!(collocations.score(&phrase("a b c d")).unwrap() >= 0.7);
        assert!(!collocations.contains(&phrase("c d a b")));
        assert_eq!(collocations.len(), 3);
    }

    #[test]
    fn test_side_queries() {
        let detector = three_order_detector();
        let bigram = detector.highest_order_npmi(&phrase("heart attack"));
        assert!(bigram > 0.9 && bigram < 0.93, "{bigram}");
        assert_eq!(detector.skip_middle_npmi(&phrase("heart attack")), bigram);
        assert_eq!(detector.highest_order_npmi(&phrase("heart attack risk")), 0.0);
        assert_eq!(detector.highest_order_npmi(&phrase("unseen pair")), 0.0);
        assert_eq!(detector.highest_order_npmi(&phrase("heart")), 0.0);
    }

    #[test]
    fn test_audit_groups_by_order() {
        let detector = three_order_detector();
        let reference = [phrase("heart attack"), phrase("bank of"), phrase("never seen")];
        let audit = detector.audit(&reference);
        assert_eq!(audit.counted, 2);
        assert_eq!(audit.orders.len(), 1);
        assert_eq!(audit.orders[0].order, 2);
        assert_eq!(audit.orders[0].count, 2);
        assert!(audit.mean_npmi > 0.0 && audit.mean_npmi < 1.0);
    }

    #[test]
    fn test_bootstrap_overlaps() {
        let mut detector = three_order_detector();
        detector.collocations.put(phrase("attack risk factor"), 0.8);
        let added = detector.bootstrap(3).unwrap();
        assert_eq!(added, 1);
        let grown = phrase("heart attack risk factor");
        assert_eq!(detector.collocations().score(&grown), Some(BOOTSTRAP_CONFIDENCE));
        assert!(detector.bootstrap(1).is_err());
    }

    #[test]
    fn test_bootstrap_to_extends_each_length() {
        let mut detector =
            CollocationDetector::new(config(vec![0.5]), 2, TextProcessor::null()).unwrap();
        detector.collocations.put(phrase("a b"), 0.9);
        detector.collocations.put(phrase("b c"), 0.9);
        detector.collocations.put(phrase("c d"), 0.9);
        let added = detector.bootstrap_to(4).unwrap();
        // "a b c", "b c d", then "a b c d"
        assert_eq!(added, 3);
        assert!(detector.collocations().contains(&phrase("a b c d")));
        assert_eq!(detector.collocations().max_length(), 4);
    }
}

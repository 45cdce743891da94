//! The built thesaurus: ranked entries per headword, and its text format.
//!
//! A saved thesaurus is plain text. The first line is
//! `case-sensitive thesaurus` or `non-case-sensitive thesaurus`, the second
//! names the text processor, and every following line holds a headword then
//! alternating `candidate` and `overall;semantic;ortho;abbr` fields, all
//! tab-separated.

use std::io::{BufRead, Write};

use ahash::{AHashMap, AHashSet};
use tracing::info;

use crate::analysis::{TextProcessor, TextProcessorKind};
use crate::error::{PhrasaurusError, Result};
use crate::phrase::Phrase;
use crate::thesaurus::entry::ThesaurusEntry;

const CASE_SENSITIVE_HEADER: &str = "case-sensitive thesaurus";
const NON_CASE_SENSITIVE_HEADER: &str = "non-case-sensitive thesaurus";

fn by_descending_score(a: &ThesaurusEntry, b: &ThesaurusEntry) -> std::cmp::Ordering {
    b.overall_score.total_cmp(&a.overall_score)
}

/// Headwords in insertion order, each with its equivalents.
#[derive(Debug, Clone)]
pub struct Thesaurus {
    headwords: Vec<Phrase>,
    entries: AHashMap<Phrase, Vec<ThesaurusEntry>>,
    case_sensitive: bool,
    processor: TextProcessor,
}

impl Thesaurus {
    pub fn new(case_sensitive: bool, processor: TextProcessor) -> Self {
        Thesaurus {
            headwords: Vec::new(),
            entries: AHashMap::new(),
            case_sensitive,
            processor,
        }
    }

    /// Add an entry under its headword. The reverse pairing is not added.
    pub fn add_pairing(&mut self, entry: ThesaurusEntry) {
        match self.entries.get_mut(&entry.headword) {
            Some(list) => list.push(entry),
            None => {
                self.headwords.push(entry.headword.clone());
                self.entries.insert(entry.headword.clone(), vec![entry]);
            }
        }
    }

    pub fn num_headwords(&self) -> usize {
        self.headwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headwords.is_empty()
    }

    pub fn headwords(&self) -> &[Phrase] {
        &self.headwords
    }

    pub fn num_entries(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Every entry, with one entry kept per unordered phrase pair.
    pub fn unique_pairings(&self) -> Vec<&ThesaurusEntry> {
        let mut seen: AHashSet<(&Phrase, &Phrase)> = AHashSet::new();
        let mut unique = Vec::new();
        for entry in self.iter().flat_map(|(_, list)| list) {
            let key = if entry.headword <= entry.candidate {
                (&entry.headword, &entry.candidate)
            } else {
                (&entry.candidate, &entry.headword)
            };
            if seen.insert(key) {
                unique.push(entry);
            }
        }
        unique
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn text_processor(&self) -> TextProcessor {
        self.processor
    }

    /// Headwords with their entries, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Phrase, &[ThesaurusEntry])> {
        self.headwords
            .iter()
            .filter_map(|h| self.entries.get(h).map(|list| (h, list.as_slice())))
    }

    /// Sort every headword's entries by descending overall score.
    pub fn sort_entries(&mut self) {
        for list in self.entries.values_mut() {
            list.sort_by(by_descending_score);
        }
    }

    /// Drop entries scoring below `min_overall_score`, then drop headwords
    /// left without entries. Returns the number of entries removed.
    pub fn remove_entries_below(&mut self, min_overall_score: f64) -> usize {
        info!(min_overall_score, "Removing thesaurus entries below score");
        self.sort_entries();
        let mut removed = 0;
        for list in self.entries.values_mut() {
            let keep = list
                .iter()
                .position(|e| e.overall_score < min_overall_score)
                .unwrap_or(list.len());
            removed += list.len() - keep;
            list.truncate(keep);
        }
        self.entries.retain(|_, list| !list.is_empty());
        let entries = &self.entries;
        self.headwords.retain(|h| entries.contains_key(h));
        removed
    }

    /// Entries for a query, normalized with the thesaurus's text processor
    /// and case policy first.
    pub fn equivalents(&self, query: &str) -> &[ThesaurusEntry] {
        self.equivalents_exact(&self.processor.process(query))
    }

    /// Entries for a form taken as-is apart from the case policy.
    pub fn equivalents_exact(&self, form: &str) -> &[ThesaurusEntry] {
        let form = if self.case_sensitive {
            form.to_string()
        } else {
            form.to_lowercase()
        };
        Phrase::parse(&form)
            .ok()
            .and_then(|p| self.entries.get(&p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The entry pairing `p1` with `p2`, looked up from `p1`'s side.
    pub fn entry(&self, p1: &Phrase, p2: &Phrase) -> Option<&ThesaurusEntry> {
        self.equivalents(&p1.to_string())
            .iter()
            .find(|e| &e.candidate == p2)
    }

    pub fn has_phrase(&self, phrase: &Phrase) -> bool {
        self.entries.contains_key(phrase)
    }

    /// Write in the thesaurus text format, entries sorted by descending
    /// overall score.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        let header = if self.case_sensitive {
            CASE_SENSITIVE_HEADER
        } else {
            NON_CASE_SENSITIVE_HEADER
        };
        writeln!(writer, "{header}")?;
        writeln!(writer, "{}", self.processor.name())?;
        for (headword, list) in self.iter() {
            let mut sorted: Vec<&ThesaurusEntry> = list.iter().collect();
            sorted.sort_by(|a, b| by_descending_score(a, b));
            write!(writer, "{headword}")?;
            for entry in sorted {
                write!(writer, "\t{}\t{}", entry.candidate, entry.scores_field())?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        info!(headwords = self.num_headwords(), "Saved thesaurus");
        Ok(())
    }

    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .ok_or_else(|| PhrasaurusError::parse(1, "missing thesaurus header"))??;
        let case_sensitive = match header.trim() {
            CASE_SENSITIVE_HEADER => true,
            NON_CASE_SENSITIVE_HEADER => false,
            other => {
                return Err(PhrasaurusError::parse(
                    1,
                    format!("unknown thesaurus header {other:?}"),
                ));
            }
        };
        let kind: TextProcessorKind = lines
            .next()
            .ok_or_else(|| PhrasaurusError::parse(2, "missing text processor name"))??
            .parse()
            .map_err(|e: PhrasaurusError| PhrasaurusError::parse(2, e.to_string()))?;

        let mut thesaurus = Thesaurus::new(case_sensitive, TextProcessor::new(kind));
        for (i, line) in lines.enumerate() {
            let line_no = i + 3;
            let line = line?;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                continue;
            }
            if fields.len() % 2 == 0 {
                return Err(PhrasaurusError::parse(line_no, "candidate without scores"));
            }
            let headword = Phrase::parse(fields[0])
                .map_err(|_| PhrasaurusError::parse(line_no, "empty headword"))?;
            for pair in fields[1..].chunks_exact(2) {
                let candidate = Phrase::parse(pair[0])
                    .map_err(|_| PhrasaurusError::parse(line_no, "empty candidate"))?;
                let [overall, semantic, ortho, abbr] =
                    ThesaurusEntry::parse_scores(pair[1], line_no)?;
                thesaurus.add_pairing(ThesaurusEntry::new(
                    headword.clone(),
                    candidate,
                    overall,
                    semantic,
                    ortho,
                    abbr,
                ));
            }
        }
        info!(headwords = thesaurus.num_headwords(), "Loaded thesaurus");
        Ok(thesaurus)
    }
}

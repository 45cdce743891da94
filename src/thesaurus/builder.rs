//! Builds a thesaurus from an embedding store.
//!
//! Every headword in the lexicon is scanned against the whole lexicon for
//! semantically close candidates. A candidate is admitted when either its
//! orthographic distance or its abbreviation distance is small enough, and is
//! then ranked by a blend of semantic similarity and the smaller distance.

use tracing::{debug, info};

use crate::analysis::TextProcessor;
use crate::config::ThesaurusConfig;
use crate::embedding::EmbeddingStore;
use crate::error::{PhrasaurusError, Result};
use crate::orthography::PhraseScorer;
use crate::phrase::Phrase;
use crate::thesaurus::entry::ThesaurusEntry;
use crate::thesaurus::store::Thesaurus;
use crate::util::partition::Partitioner;

const PROGRESS_INTERVAL: usize = 1000;
// Scan scores are f32, so a similarity equal to the threshold can land just below it.
const SIMILARITY_TOLERANCE: f64 = 1e-6;

fn has_letter(phrase: &Phrase) -> bool {
    phrase
        .words()
        .iter()
        .any(|w| w.chars().any(|c| c.is_ascii_alphabetic()))
}

pub struct ThesaurusBuilder {
    store: EmbeddingStore,
    config: ThesaurusConfig,
    processor: TextProcessor,
    scorer: PhraseScorer,
    partitioner: Partitioner,
}

impl ThesaurusBuilder {
    /// Normalizes the store and drops phrases without any letter.
    pub fn new(
        mut store: EmbeddingStore,
        config: &ThesaurusConfig,
        processor: TextProcessor,
    ) -> Result<Self> {
        config.validate()?;
        info!("Normalizing all embeddings");
        store.normalize_all();
        let removed = store.retain(has_letter);
        if removed > 0 {
            info!(removed, "Removed phrases without letters");
        }

        let partitioner = match config.threads {
            Some(threads) => Partitioner::new(threads)?,
            None => Partitioner::with_available_parallelism()?,
        };
        let scorer = PhraseScorer::new(
            config.orthographic_costs,
            config.abbreviation_costs,
            config.permutation_penalty,
        );
        Ok(ThesaurusBuilder {
            store,
            config: config.clone(),
            processor,
            scorer,
            partitioner,
        })
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    pub fn config(&self) -> &ThesaurusConfig {
        &self.config
    }

    pub fn scorer(&self) -> &PhraseScorer {
        &self.scorer
    }

    /// Blend of semantic similarity and the smaller of the two distances,
    /// weighted by `semantic_ortho_ratio`.
    pub fn overall_score(
        &self,
        semantic_similarity: f64,
        ortho_distance: f64,
        abbr_distance: f64,
    ) -> f64 {
        let ratio = self.config.semantic_ortho_ratio;
        (ratio * semantic_similarity + 1.0 - ortho_distance.min(abbr_distance)) / (ratio + 1.0)
    }

    /// Lexicon phrases whose cosine similarity to `headword` meets the
    /// semantic threshold, with that similarity. Includes the headword
    /// itself.
    pub fn semantic_equivalents(&self, headword: &Phrase) -> Result<Vec<(&Phrase, f64)>> {
        let query = self.store.get(headword).ok_or_else(|| {
            PhrasaurusError::invalid_argument(format!("'{headword}' has no embedding"))
        })?;
        let scores = self
            .store
            .calculate_scores_threaded(query, &self.partitioner)?;
        Ok(self
            .store
            .lexicon()
            .iter()
            .zip(scores)
            .map(|(phrase, score)| (phrase, score as f64))
            .filter(|(_, score)| {
                *score >= self.config.semantic_threshold - SIMILARITY_TOLERANCE
            })
            .collect())
    }

    /// Score one candidate. `None` if it is the headword itself, holds a
    /// dummy token, is too far by both distances, or misses the overall
    /// threshold.
    pub fn score_candidate(
        &self,
        headword: &Phrase,
        candidate: &Phrase,
        semantic_similarity: f64,
    ) -> Option<ThesaurusEntry> {
        if candidate == headword || self.processor.contains_dummy_token(&candidate.to_string()) {
            return None;
        }
        let ortho_distance = self.scorer.orthographic_distance(headword, candidate);
        let abbr_distance = self.scorer.abbreviation_distance(headword, candidate);
        if ortho_distance > self.config.ortho_max && abbr_distance > self.config.abbr_max {
            return None;
        }
        let overall = self.overall_score(semantic_similarity, ortho_distance, abbr_distance);
        if let Some(threshold) = self.config.overall_threshold
            && overall < threshold
        {
            return None;
        }
        Some(ThesaurusEntry::new(
            headword.clone(),
            candidate.clone(),
            overall,
            semantic_similarity,
            ortho_distance,
            abbr_distance,
        ))
    }

    /// Run every headword in the lexicon.
    pub fn build(&self) -> Result<Thesaurus> {
        let mut thesaurus = Thesaurus::new(self.config.case_sensitive, self.processor);
        info!(
            headwords = self.store.size(),
            threads = self.partitioner.threads(),
            "Finding matches"
        );
        for (i, headword) in self.store.lexicon().iter().enumerate() {
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!(processed = i + 1, "Headwords processed");
            }
            if self.processor.contains_dummy_token(&headword.to_string()) {
                continue;
            }
            let matches = self.semantic_equivalents(headword)?;
            if matches.len() < 2 {
                continue;
            }
            debug!(matches = matches.len(), %headword, "Semantic matches found");
            for (candidate, similarity) in matches {
                if let Some(entry) = self.score_candidate(headword, candidate, similarity) {
                    thesaurus.add_pairing(entry);
                }
            }
        }
        thesaurus.sort_entries();
        info!(
            headwords = thesaurus.num_headwords(),
            entries = thesaurus.num_entries(),
            "Thesaurus built"
        );
        Ok(thesaurus)
    }
}

impl std::fmt::Debug for ThesaurusBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThesaurusBuilder")
            .field("lexicon", &self.store.size())
            .field("config", &self.config)
            .field("processor", &self.processor)
            .field("partitioner", &self.partitioner)
            .finish()
    }
}

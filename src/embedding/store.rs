//! In-memory phrase embeddings with a threaded brute-force similarity scan.

use ahash::AHashMap;
use tracing::debug;

use crate::error::{PhrasaurusError, Result};
use crate::phrase::Phrase;
use crate::util::partition::Partitioner;
use crate::util::simd::{dot_product, norm};

/// Phrase vectors kept in lexicon order.
///
/// Scores returned by [`EmbeddingStore::calculate_scores_threaded`] line up
/// with [`EmbeddingStore::lexicon`].
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    lexicon: Vec<Phrase>,
    vectors: Vec<Vec<f32>>,
    index: AHashMap<Phrase, usize>,
    dimension: usize,
    normalized: bool,
}

impl EmbeddingStore {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(PhrasaurusError::invalid_argument(
                "Embedding dimension must be at least 1",
            ));
        }
        Ok(EmbeddingStore {
            lexicon: Vec::new(),
            vectors: Vec::new(),
            index: AHashMap::new(),
            dimension,
            normalized: false,
        })
    }

    /// Add or replace the vector for `phrase`. A replaced phrase keeps its
    /// lexicon position.
    pub fn insert(&mut self, phrase: Phrase, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(PhrasaurusError::invalid_argument(format!(
                "Vector for '{phrase}' has dimension {}, expected {}",
                vector.len(),
                self.dimension
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(PhrasaurusError::invalid_argument(format!(
                "Vector for '{phrase}' has non-finite components"
            )));
        }
        match self.index.get(&phrase) {
            Some(&i) => self.vectors[i] = vector,
            None => {
                self.index.insert(phrase.clone(), self.lexicon.len());
                self.lexicon.push(phrase);
                self.vectors.push(vector);
            }
        }
        self.normalized = false;
        Ok(())
    }

    pub fn contains(&self, phrase: &Phrase) -> bool {
        self.index.contains_key(phrase)
    }

    pub fn get(&self, phrase: &Phrase) -> Option<&[f32]> {
        self.index.get(phrase).map(|&i| self.vectors[i].as_slice())
    }

    pub fn size(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn lexicon(&self) -> &[Phrase] {
        &self.lexicon
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Phrase, &[f32])> {
        self.lexicon
            .iter()
            .zip(self.vectors.iter().map(Vec::as_slice))
    }

    /// Drop every phrase for which `keep` returns false. Returns the number
    /// removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Phrase) -> bool,
    {
        let before = self.lexicon.len();
        let lexicon = std::mem::take(&mut self.lexicon);
        let vectors = std::mem::take(&mut self.vectors);
        self.index.clear();
        for (phrase, vector) in lexicon.into_iter().zip(vectors) {
            if keep(&phrase) {
                self.index.insert(phrase.clone(), self.lexicon.len());
                self.lexicon.push(phrase);
                self.vectors.push(vector);
            }
        }
        before - self.lexicon.len()
    }

    /// Scale every vector to unit length so dot products are cosines. Zero
    /// vectors are left as they are.
    pub fn normalize_all(&mut self) {
        for vector in &mut self.vectors {
            let length = norm(vector);
            if length > 0.0 {
                vector.iter_mut().for_each(|v| *v /= length);
            }
        }
        self.normalized = true;
        debug!(size = self.size(), "Normalized embeddings");
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Cosine similarity of `query` against every lexicon entry, in lexicon
    /// order. The store must be normalized and `query` must be unit length.
    pub fn calculate_scores_threaded(
        &self,
        query: &[f32],
        partitioner: &Partitioner,
    ) -> Result<Vec<f32>> {
        if !self.normalized {
            return Err(PhrasaurusError::invalid_operation(
                "Embeddings must be normalized before scoring",
            ));
        }
        if query.len() != self.dimension {
            return Err(PhrasaurusError::invalid_argument(format!(
                "Query has dimension {}, expected {}",
                query.len(),
                self.dimension
            )));
        }
        Ok(partitioner.map(self.vectors.len(), |i| {
            dot_product(query, &self.vectors[i])
        }))
    }

    /// Cosine similarity of two stored phrases.
    pub fn similarity(&self, a: &Phrase, b: &Phrase) -> Option<f32> {
        let (va, vb) = (self.get(a)?, self.get(b)?);
        let dot = dot_product(va, vb);
        if self.normalized {
            return Some(dot);
        }
        let lengths = norm(va) * norm(vb);
        Some(if lengths > 0.0 { dot / lengths } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(text: &str) -> Phrase {
        Phrase::parse(text).unwrap()
    }

    fn sample() -> EmbeddingStore {
        let mut store = EmbeddingStore::new(2).unwrap();
        store.insert(phrase("mi"), vec![3.0, 4.0]).unwrap();
        store.insert(phrase("myocardial infarction"), vec![4.0, 3.0]).unwrap();
        store.insert(phrase("fracture"), vec![0.0, -2.0]).unwrap();
        store
    }

    #[test]
    fn test_insert_checks_vectors() {
        let mut store = sample();
        assert!(store.insert(phrase("bad"), vec![1.0]).is_err());
        assert!(store.insert(phrase("bad"), vec![f32::NAN, 1.0]).is_err());
        store.insert(phrase("mi"), vec![1.0, 0.0]).unwrap();
        assert_eq!(store.size(), 3);
        assert_eq!(store.lexicon()[0], phrase("mi"));
        assert_eq!(store.get(&phrase("mi")), Some(&[1.0, 0.0][..]));
        assert!(EmbeddingStore::new(0).is_err());
    }

    #[test]
    fn test_scores_follow_lexicon_order() {
        let mut store = sample();
        let partitioner = Partitioner::new(2).unwrap();
        let query = store.get(&phrase("mi")).unwrap().to_vec();
        assert!(store.calculate_scores_threaded(&query, &partitioner).is_err());

        store.normalize_all();
        let query = store.get(&phrase("mi")).unwrap().to_vec();
        let scores = store.calculate_scores_threaded(&query, &partitioner).unwrap();
        assert_eq!(scores.len(), 3);
        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert!((scores[1] - 0.96).abs() < 1e-6);
        assert!((scores[2] + 0.8).abs() < 1e-6);
        assert!(store.calculate_scores_threaded(&[1.0], &partitioner).is_err());
    }

    #[test]
    fn test_similarity_before_and_after_normalizing() {
        let mut store = sample();
        let raw = store
            .similarity(&phrase("mi"), &phrase("myocardial infarction"))
            .unwrap();
        store.normalize_all();
        let normalized = store
            .similarity(&phrase("mi"), &phrase("myocardial infarction"))
            .unwrap();
        assert!((raw - 0.96).abs() < 1e-6);
        assert!((normalized - 0.96).abs() < 1e-6);
        assert!(store.similarity(&phrase("mi"), &phrase("absent")).is_none());
    }

    #[test]
    fn test_retain_rebuilds_index() {
        let mut store = sample();
        let removed = store.retain(|p| p.size() == 1);
        assert_eq!(removed, 1);
        assert_eq!(store.lexicon(), &[phrase("mi"), phrase("fracture")]);
        assert_eq!(store.get(&phrase("fracture")), Some(&[0.0, -2.0][..]));
        assert!(!store.contains(&phrase("myocardial infarction")));
    }
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use tracing::debug;

use super::embedding::{cosine_similarity, EmbedError, Embedder};
use super::sequence;
use super::TARGET_SIMILARITY;

/// Highest-scoring candidate for a topic
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub candidate: String,
    pub index: usize,
    pub score: f64,
}

/// Embedding cosine similarity with a per-run vector cache
pub struct EmbeddingScorer<'a> {
    embedder: &'a dyn Embedder,
    cache: RefCell<HashMap<String, Vec<f32>>>,
}

impl<'a> EmbeddingScorer<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn is_hosted(&self) -> bool {
        self.embedder.is_hosted()
    }

    fn vector(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if let Some(vector) = self.cache.borrow().get(text) {
            return Ok(vector.clone());
        }
        let vector = self.embedder.embed(text)?;
        self.cache
            .borrow_mut()
            .insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    fn score(&self, a: &str, b: &str) -> Result<f64, EmbedError> {
        let va = self.vector(a)?;
        let vb = self.vector(b)?;
        let cosine = cosine_similarity(&va, &vb)?;
        Ok(cosine.clamp(0.0, 1.0))
    }

    pub fn cached_vectors(&self) -> usize {
        self.cache.borrow().len()
    }
}

/// Similarity strategy chosen once at the start of an analysis
pub enum SimilarityStrategy<'a> {
    Deterministic,
    EmbeddingBacked(EmbeddingScorer<'a>),
}

impl<'a> SimilarityStrategy<'a> {
    pub fn embedding(embedder: &'a dyn Embedder) -> Self {
        SimilarityStrategy::EmbeddingBacked(EmbeddingScorer::new(embedder))
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self, SimilarityStrategy::Deterministic)
    }

    /// Score in [0, 1]. Only the embedding strategy can fail.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f64, EmbedError> {
        match self {
            SimilarityStrategy::Deterministic => Ok(sequence::similarity(a, b)),
            SimilarityStrategy::EmbeddingBacked(scorer) => scorer.score(a, b),
        }
    }

    /// Scan every candidate keeping the maximum; ties keep the earlier one.
    /// No candidates, no match.
    pub fn best_match<S: AsRef<str>>(
        &self,
        topic: &str,
        candidates: &[S],
    ) -> Result<Option<BestMatch>, EmbedError> {
        best_by(topic, candidates, |a, b| self.similarity(a, b))
    }
}

/// [`SimilarityStrategy::best_match`] for the character ratio, which cannot fail
pub fn best_match_by_ratio<S: AsRef<str>>(topic: &str, candidates: &[S]) -> Option<BestMatch> {
    match best_by(topic, candidates, |a, b| Ok::<_, Infallible>(sequence::similarity(a, b))) {
        Ok(best) => best,
        Err(never) => match never {},
    }
}

fn best_by<S, E, F>(topic: &str, candidates: &[S], mut scorer: F) -> Result<Option<BestMatch>, E>
where
    S: AsRef<str>,
    F: FnMut(&str, &str) -> Result<f64, E>,
{
    let mut best: Option<BestMatch> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        let score = scorer(topic, candidate)?;
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(BestMatch {
                candidate: candidate.to_string(),
                index,
                score,
            });
        }
    }

    if let Some(found) = &best {
        debug!(
            target: TARGET_SIMILARITY,
            "Best match for '{}': '{}' ({:.3})", topic, found.candidate, found.score
        );
    }

    Ok(best)
}

use std::convert::Infallible;
use tracing::trace;

use super::config::GapConfig;
use super::types::{Buckets, Classification, Match, MatchType, MissingTopic};
use super::TARGET_GAP;
use crate::similarity::{best_match_by_ratio, BestMatch, EmbedError, SimilarityStrategy};
use crate::topic::lexicon::find_synonym;
use crate::topic::{fold, Topic, TopicExtractor};
use crate::util::truncate_chars;

// Paragraph excerpts shown as the matched text
const MATCHED_EXCERPT_CHARS: usize = 200;

/// The article under review, prepared once per analysis
#[derive(Debug, Clone)]
pub struct Candidate {
    folded: String,
    topics: Vec<Topic>,
    /// Candidate topic texts followed by the longer paragraphs
    pool: Vec<String>,
    topic_count: usize,
}

impl Candidate {
    pub fn new(text: &str, extractor: &TopicExtractor, min_paragraph_chars: usize) -> Self {
        let topics = extractor.extract(text);
        let mut pool: Vec<String> = topics.iter().map(|t| t.text().to_string()).collect();
        let topic_count = pool.len();
        pool.extend(
            text.split("\n\n")
                .map(str::trim)
                .filter(|p| p.chars().count() > min_paragraph_chars)
                .map(str::to_string),
        );

        Self {
            folded: fold(text),
            topics,
            pool,
            topic_count,
        }
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.pool[self.topic_count..]
    }

    fn topic_pool(&self) -> &[String] {
        &self.pool[..self.topic_count]
    }

    /// Texts scored by the semantic stages: topics only for the character
    /// ratio, topics and paragraphs for embeddings.
    fn match_pool(&self, strategy: &SimilarityStrategy) -> &[String] {
        if strategy.is_deterministic() {
            self.topic_pool()
        } else {
            &self.pool
        }
    }
}

/// Per-topic state machine; the first stage that matches wins
pub struct GapClassifier<'a> {
    config: &'a GapConfig,
}

impl<'a> GapClassifier<'a> {
    pub fn new(config: &'a GapConfig) -> Self {
        Self { config }
    }

    pub fn classify(
        &self,
        topic: &Topic,
        candidate: &Candidate,
        strategy: &SimilarityStrategy,
    ) -> Result<Classification, EmbedError> {
        self.classify_with(topic, candidate, |text| {
            strategy.best_match(text, candidate.match_pool(strategy))
        })
    }

    /// Classification with the character ratio, which cannot fail
    pub fn classify_deterministic(&self, topic: &Topic, candidate: &Candidate) -> Classification {
        let pool = candidate.topic_pool();
        match self.classify_with(topic, candidate, |text| {
            Ok::<_, Infallible>(best_match_by_ratio(text, pool))
        }) {
            Ok(classification) => classification,
            Err(never) => match never {},
        }
    }

    pub fn classify_all(
        &self,
        topics: &[Topic],
        candidate: &Candidate,
        strategy: &SimilarityStrategy,
    ) -> Result<Buckets, EmbedError> {
        let mut buckets = Buckets::default();
        for topic in topics {
            buckets.push(self.classify(topic, candidate, strategy)?);
        }
        Ok(buckets)
    }

    pub fn classify_all_deterministic(&self, topics: &[Topic], candidate: &Candidate) -> Buckets {
        let mut buckets = Buckets::default();
        for topic in topics {
            buckets.push(self.classify_deterministic(topic, candidate));
        }
        buckets
    }

    fn classify_with<E, F>(
        &self,
        topic: &Topic,
        candidate: &Candidate,
        best_match: F,
    ) -> Result<Classification, E>
    where
        F: FnOnce(&str) -> Result<Option<BestMatch>, E>,
    {
        let text = topic.text();

        // Exact
        let folded_topic = fold(text);
        if !folded_topic.is_empty() && candidate.folded.contains(&folded_topic) {
            trace!(target: TARGET_GAP, "'{}': exact", text);
            return Ok(Classification::Covered(Match {
                topic: text.to_string(),
                match_type: MatchType::Exact,
                confidence: 1.0,
                matched: None,
            }));
        }

        // Semantic tiers
        let thresholds = &self.config.thresholds;
        let mut weak_match = None;
        if let Some(best) = best_match(text)? {
            let matched = Some(self.excerpt(&best, candidate));
            let score = best.score;
            let semantic = |match_type| Match {
                topic: text.to_string(),
                match_type,
                confidence: score,
                matched: matched.clone(),
            };

            if score > thresholds.high {
                trace!(target: TARGET_GAP, "'{}': semantic-high {:.3}", text, score);
                return Ok(Classification::Covered(semantic(MatchType::SemanticHigh)));
            }
            if score > thresholds.medium {
                trace!(target: TARGET_GAP, "'{}': semantic-medium {:.3}", text, score);
                return Ok(Classification::Partial(semantic(MatchType::SemanticMedium)));
            }
            if score > thresholds.low {
                trace!(target: TARGET_GAP, "'{}': semantic-low {:.3}", text, score);
                weak_match = Some(semantic(MatchType::SemanticLow));
            }
        }

        // Synonym
        if let Some(synonym) = find_synonym(text, &candidate.folded) {
            trace!(target: TARGET_GAP, "'{}': synonym '{}'", text, synonym);
            return Ok(Classification::Partial(Match {
                topic: text.to_string(),
                match_type: MatchType::Synonym,
                confidence: self.config.synonym_confidence,
                matched: Some(synonym.to_string()),
            }));
        }

        trace!(target: TARGET_GAP, "'{}': missing", text);
        Ok(Classification::Missing(MissingTopic {
            topic: text.to_string(),
            priority: topic.priority(),
            category: topic.category(),
            weak_match,
        }))
    }

    fn excerpt(&self, best: &BestMatch, candidate: &Candidate) -> String {
        if best.index < candidate.topic_count {
            best.candidate.clone()
        } else {
            truncate_chars(&best.candidate, MATCHED_EXCERPT_CHARS)
        }
    }
}

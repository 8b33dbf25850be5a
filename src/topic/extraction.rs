use std::collections::{HashMap, HashSet};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::lexicon::PHRASE_PATTERNS;
use super::normalizer::{fold, TextNormalizer};
use super::types::Topic;
use super::TARGET_TOPIC;

/// Default cap on frequency-ranked tokens
pub const DEFAULT_TOPIC_CAP: usize = 20;

/// Derives a ranked topic list from raw text
#[derive(Debug, Clone)]
pub struct TopicExtractor {
    normalizer: TextNormalizer,
    topic_cap: usize,
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            topic_cap: DEFAULT_TOPIC_CAP,
        }
    }
}

impl TopicExtractor {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self {
            normalizer,
            ..Self::default()
        }
    }

    pub fn with_topic_cap(mut self, cap: usize) -> Self {
        self.topic_cap = cap;
        self
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Extract topics: frequency-ranked tokens seen more than once (capped),
    /// then lexicon phrases in sentence order. Later duplicates are dropped.
    pub fn extract(&self, text: &str) -> Vec<Topic> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let tokens = self.normalizer.tokenize(text);
        let frequent = rank_frequent(&tokens, self.topic_cap);
        let phrases = self.pattern_phrases(text);

        let mut seen = HashSet::new();
        let topics: Vec<Topic> = frequent
            .into_iter()
            .chain(phrases)
            .filter(|(text, _)| seen.insert(text.clone()))
            .map(|(text, count)| Topic::new(&text, count))
            .collect();

        debug!(
            target: TARGET_TOPIC,
            "Extracted {} topics from {} tokens", topics.len(), tokens.len()
        );

        topics
    }

    /// Lexicon phrase matches, scanning each folded sentence against every
    /// pattern. Returned in first-seen order with their occurrence counts.
    fn pattern_phrases(&self, text: &str) -> Vec<(String, usize)> {
        // Line breaks inside a phrase must not split it into two sentences
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for sentence in flat.unicode_sentences().map(fold) {
            for pattern in PHRASE_PATTERNS.iter() {
                for found in pattern.find_iter(&sentence) {
                    let phrase = found.as_str().to_string();
                    let count = counts.entry(phrase.clone()).or_insert(0);
                    if *count == 0 {
                        order.push(phrase);
                    }
                    *count += 1;
                }
            }
        }

        order
            .into_iter()
            .map(|phrase| {
                let count = counts.get(&phrase).copied().unwrap_or(1);
                (phrase, count)
            })
            .collect()
    }
}

/// Tokens occurring more than once, by descending frequency; ties keep the
/// order of first occurrence.
fn rank_frequent(tokens: &[String], cap: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, token) in tokens.iter().enumerate() {
        counts.entry(token.as_str()).or_insert((0, idx)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .filter(|(_, (count, _))| *count > 1)
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(cap)
        .map(|(token, count, _)| (token.to_string(), count))
        .collect()
}

use serde::Serialize;

use super::types::GapError;
use crate::environment::{get_env_var_or, get_env_var_parsed};
use crate::topic::extraction::DEFAULT_TOPIC_CAP;

/// Score tiers of the semantic stages; a score must be strictly above a
/// threshold to reach its tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            high: 0.8,
            medium: 0.6,
            low: 0.4,
        }
    }
}

/// Tunable parameters of the gap engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapConfig {
    pub thresholds: MatchThresholds,
    pub synonym_confidence: f64,
    /// Discount applied to partial matches in the weighted coverage
    pub partial_weight: f64,
    pub topic_cap: usize,
    pub max_recommendations: usize,
    /// High-priority topics bundled into the critical recommendation
    pub max_critical_topics: usize,
    pub max_general_recommendations: usize,
    /// Batch summaries list articles below this coverage percentage
    pub low_coverage_percentage: f64,
    pub reference_topic_limit: Option<usize>,
    /// Paragraphs shorter than this are not embedded
    pub min_paragraph_chars: usize,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
            synonym_confidence: 0.7,
            partial_weight: 0.6,
            topic_cap: DEFAULT_TOPIC_CAP,
            max_recommendations: 6,
            max_critical_topics: 3,
            max_general_recommendations: 5,
            low_coverage_percentage: 50.0,
            reference_topic_limit: None,
            min_paragraph_chars: 50,
        }
    }
}

impl GapConfig {
    /// Defaults overridden by the `GAP_*` environment variables
    pub fn from_env() -> Result<Self, GapError> {
        let defaults = Self::default();
        let config = Self {
            thresholds: MatchThresholds {
                high: get_env_var_or("GAP_HIGH_THRESHOLD", defaults.thresholds.high),
                medium: get_env_var_or("GAP_MEDIUM_THRESHOLD", defaults.thresholds.medium),
                low: get_env_var_or("GAP_LOW_THRESHOLD", defaults.thresholds.low),
            },
            synonym_confidence: get_env_var_or(
                "GAP_SYNONYM_CONFIDENCE",
                defaults.synonym_confidence,
            ),
            partial_weight: get_env_var_or("GAP_PARTIAL_WEIGHT", defaults.partial_weight),
            topic_cap: get_env_var_or("GAP_TOPIC_CAP", defaults.topic_cap),
            max_recommendations: get_env_var_or(
                "GAP_MAX_RECOMMENDATIONS",
                defaults.max_recommendations,
            ),
            reference_topic_limit: get_env_var_parsed("GAP_REFERENCE_LIMIT"),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GapError> {
        let t = &self.thresholds;
        let unit = |v: f64| (0.0..=1.0).contains(&v);

        if !(unit(t.high) && unit(t.medium) && unit(t.low)) {
            return Err(GapError::InvalidConfig(format!(
                "thresholds must lie in [0, 1] (high {}, medium {}, low {})",
                t.high, t.medium, t.low
            )));
        }
        if !(t.high > t.medium && t.medium > t.low) {
            return Err(GapError::InvalidConfig(format!(
                "thresholds must be ordered high > medium > low (high {}, medium {}, low {})",
                t.high, t.medium, t.low
            )));
        }
        if !unit(self.synonym_confidence) || !unit(self.partial_weight) {
            return Err(GapError::InvalidConfig(
                "synonym confidence and partial weight must lie in [0, 1]".to_string(),
            ));
        }
        if self.max_recommendations == 0 {
            return Err(GapError::InvalidConfig(
                "at least one recommendation must be allowed".to_string(),
            ));
        }
        Ok(())
    }
}

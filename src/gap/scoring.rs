use super::types::Buckets;
use crate::util::round2;

// Content quality components
const COVERAGE_POINTS: f64 = 40.0;
const INDICATOR_POINTS: f64 = 10.0;
const INDICATOR_CAP: f64 = 30.0;
const QUALITY_CAP: f64 = 100.0;

/// Share of reference topics in the covered bucket, 0..=1
pub fn coverage_ratio(buckets: &Buckets) -> f64 {
    match buckets.total() {
        0 => 0.0,
        total => buckets.covered.len() as f64 / total as f64,
    }
}

/// Covered / total × 100, two decimals. No reference topics gives 0.
pub fn coverage_percentage(buckets: &Buckets) -> f64 {
    round2(coverage_ratio(buckets) * 100.0)
}

/// Sum of covered confidences plus discounted partial confidences
pub fn weighted_coverage(buckets: &Buckets, partial_weight: f64) -> f64 {
    let covered: f64 = buckets.covered.iter().map(|m| m.confidence).sum();
    let partial: f64 = buckets.partial.iter().map(|m| m.confidence).sum();
    round2(covered + partial_weight * partial)
}

pub fn content_quality(coverage_ratio: f64, depth_count: usize, structure_count: usize) -> f64 {
    let indicator = |count: usize| (INDICATOR_POINTS * count as f64).min(INDICATOR_CAP);
    let score = COVERAGE_POINTS * coverage_ratio + indicator(depth_count) + indicator(structure_count);
    round2(score.min(QUALITY_CAP))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap::types::{Match, MatchType, MissingTopic};
    use crate::topic::{TopicCategory, TopicPriority};

    fn matched(topic: &str, match_type: MatchType, confidence: f64) -> Match {
        Match {
            topic: topic.to_string(),
            match_type,
            confidence,
            matched: None,
        }
    }

    fn missing(topic: &str) -> MissingTopic {
        MissingTopic {
            topic: topic.to_string(),
            priority: TopicPriority::Low,
            category: TopicCategory::General,
            weak_match: None,
        }
    }

    #[test]
    fn test_empty_buckets() {
        let buckets = Buckets::default();
        assert_eq!(coverage_percentage(&buckets), 0.0);
        assert_eq!(weighted_coverage(&buckets, 0.6), 0.0);
    }

    #[test]
    fn test_coverage_and_weighted_coverage() {
        let buckets = Buckets {
            covered: vec![
                matched("a", MatchType::Exact, 1.0),
                matched("b", MatchType::SemanticHigh, 0.9),
            ],
            partial: vec![matched("c", MatchType::Synonym, 0.7)],
            missing: vec![missing("d")],
        };
        assert_eq!(coverage_percentage(&buckets), 50.0);
        // 1.0 + 0.9 + 0.6 * 0.7
        assert_eq!(weighted_coverage(&buckets, 0.6), 2.32);
    }

    #[test]
    fn test_coverage_rounding() {
        let buckets = Buckets {
            covered: vec![matched("a", MatchType::Exact, 1.0)],
            partial: Vec::new(),
            missing: vec![missing("b"), missing("c")],
        };
        assert_eq!(coverage_percentage(&buckets), 33.33);
    }

    #[test]
    fn test_content_quality_caps() {
        assert_eq!(content_quality(0.0, 0, 0), 0.0);
        assert_eq!(content_quality(0.5, 1, 2), 50.0);
        // Indicator components saturate at 30 each
        assert_eq!(content_quality(1.0, 10, 10), 100.0);
        assert_eq!(content_quality(0.25, 5, 0), 40.0);
    }
}

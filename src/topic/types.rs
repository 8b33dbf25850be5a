use serde::{Deserialize, Serialize};
use std::fmt;

use super::lexicon::{categorize, prioritize};

/// Content category of a topic, derived from keyword lexicons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicCategory {
    #[serde(rename = "teorico")]
    Theoretical,
    #[serde(rename = "pratico")]
    Practical,
    #[serde(rename = "tecnico")]
    Technical,
    #[serde(rename = "etico")]
    Ethical,
    #[serde(rename = "economico")]
    Economic,
    #[serde(rename = "generale")]
    General,
}

impl fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicCategory::Theoretical => write!(f, "teorico"),
            TopicCategory::Practical => write!(f, "pratico"),
            TopicCategory::Technical => write!(f, "tecnico"),
            TopicCategory::Ethical => write!(f, "etico"),
            TopicCategory::Economic => write!(f, "economico"),
            TopicCategory::General => write!(f, "generale"),
        }
    }
}

/// Priority tier shared by missing topics and recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicPriority {
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "bassa")]
    Low,
}

impl TopicPriority {
    /// Sort rank, lower comes first
    pub fn rank(self) -> u8 {
        match self {
            TopicPriority::High => 0,
            TopicPriority::Medium => 1,
            TopicPriority::Low => 2,
        }
    }
}

impl fmt::Display for TopicPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicPriority::High => write!(f, "alta"),
            TopicPriority::Medium => write!(f, "media"),
            TopicPriority::Low => write!(f, "bassa"),
        }
    }
}

/// A token or short phrase extracted from text.
///
/// Topics are created once during extraction and never mutated afterwards; the
/// category and priority are derived from the text at construction time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    text: String,
    frequency: usize,
    category: TopicCategory,
    priority: TopicPriority,
}

impl Topic {
    pub fn new(text: &str, frequency: usize) -> Self {
        Topic {
            text: text.to_string(),
            frequency,
            category: categorize(text),
            priority: prioritize(text),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn frequency(&self) -> usize {
        self.frequency
    }

    pub fn category(&self) -> TopicCategory {
        self.category
    }

    pub fn priority(&self) -> TopicPriority {
        self.priority
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_derives_lexicon_attributes() {
        let topic = Topic::new("etica", 2);
        assert_eq!(topic.text(), "etica");
        assert_eq!(topic.frequency(), 2);
        assert_eq!(topic.category(), TopicCategory::Ethical);
        assert_eq!(topic.priority(), TopicPriority::Low);

        let topic = Topic::new("definizione", 1);
        assert_eq!(topic.category(), TopicCategory::Theoretical);
        assert_eq!(topic.priority(), TopicPriority::High);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&TopicCategory::Ethical).unwrap(),
            "\"etico\""
        );
        assert_eq!(
            serde_json::to_string(&TopicPriority::Medium).unwrap(),
            "\"media\""
        );
        assert_eq!(TopicCategory::Economic.to_string(), "economico");
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(TopicPriority::High.rank() < TopicPriority::Medium.rank());
        assert!(TopicPriority::Medium.rank() < TopicPriority::Low.rank());
    }
}

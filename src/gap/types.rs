use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::topic::{TopicCategory, TopicPriority};

/// How a reference topic was matched against the article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    Exact,
    SemanticHigh,
    SemanticMedium,
    SemanticLow,
    Synonym,
    None,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchType::Exact => "exact",
            MatchType::SemanticHigh => "semantic-high",
            MatchType::SemanticMedium => "semantic-medium",
            MatchType::SemanticLow => "semantic-low",
            MatchType::Synonym => "synonym",
            MatchType::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// A reference topic linked to what it matched in the article
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub topic: String,
    pub match_type: MatchType,
    pub confidence: f64,
    /// Candidate topic, paragraph excerpt or synonym that produced the match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingTopic {
    pub topic: String,
    pub priority: TopicPriority,
    pub category: TopicCategory,
    /// Semantic-low match recorded on the way to the missing bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weak_match: Option<Match>,
}

/// Outcome of the classifier for one reference topic
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Covered(Match),
    Partial(Match),
    Missing(MissingTopic),
}

/// The three disjoint coverage buckets, in reference-topic order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub covered: Vec<Match>,
    pub partial: Vec<Match>,
    pub missing: Vec<MissingTopic>,
}

impl Buckets {
    pub fn push(&mut self, classification: Classification) {
        match classification {
            Classification::Covered(m) => self.covered.push(m),
            Classification::Partial(m) => self.partial.push(m),
            Classification::Missing(t) => self.missing.push(t),
        }
    }

    pub fn total(&self) -> usize {
        self.covered.len() + self.partial.len() + self.missing.len()
    }
}

/// Which similarity path produced the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    /// Character-ratio similarity, also used after an embedding failure
    Basic,
    /// Self-hosted embedding endpoint
    SemanticApi,
    /// Hosted, authenticated embedding endpoint
    ExternalService,
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMethod::Basic => write!(f, "basic"),
            AnalysisMethod::SemanticApi => write!(f, "semantic_api"),
            AnalysisMethod::ExternalService => write!(f, "external_service"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecommendationKind {
    #[serde(rename = "critica")]
    Critical,
    #[serde(rename = "approfondimento")]
    Deepen,
    #[serde(rename = "strutturale")]
    Structural,
    #[serde(rename = "categoria")]
    Category,
    #[serde(rename = "generale")]
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: TopicPriority,
    pub title: String,
    pub description: String,
    pub impact: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
}

/// Coverage report for one (reference, article) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub total_ai_topics: usize,
    pub covered_topics: Vec<Match>,
    pub partially_covered: Vec<Match>,
    pub missing_topics: Vec<MissingTopic>,
    pub coverage_percentage: f64,
    pub weighted_coverage: f64,
    pub content_quality: f64,
    pub recommendations: Vec<Recommendation>,
    pub analysis_method: AnalysisMethod,
    pub article_topics: Vec<String>,
    pub depth_indicators: Vec<String>,
    pub structure_indicators: Vec<String>,
}

/// Either a result or the error sentinel `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Report(T),
    Error { error: String },
}

pub type GapOutcome = Outcome<GapReport>;

impl<T> Outcome<T> {
    pub fn report(&self) -> Option<&T> {
        match self {
            Outcome::Report(report) => Some(report),
            Outcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Report(_) => None,
            Outcome::Error { error } => Some(error),
        }
    }
}

impl<T> From<Result<T, GapError>> for Outcome<T> {
    fn from(result: Result<T, GapError>) -> Self {
        match result {
            Ok(report) => Outcome::Report(report),
            Err(e) => Outcome::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Input problems reported through the error sentinel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GapError {
    #[error("AI Overview non caricato")]
    NotLoaded,

    #[error("Contenuto articolo vuoto")]
    EmptyArticle,

    /// Fetch error of an article record, passed through untouched
    #[error("{0}")]
    ArticleFailed(String),

    #[error("Configurazione non valida: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_names() {
        assert_eq!(
            serde_json::to_string(&MatchType::SemanticMedium).unwrap(),
            "\"semantic-medium\""
        );
        assert_eq!(MatchType::SemanticLow.to_string(), "semantic-low");
    }

    #[test]
    fn test_error_sentinel_shape() {
        let outcome = GapOutcome::from(Err::<GapReport, _>(GapError::NotLoaded));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({ "error": "AI Overview non caricato" })
        );
        assert!(outcome.report().is_none());
        assert_eq!(outcome.error(), Some("AI Overview non caricato"));
    }

    #[test]
    fn test_recommendation_serialization() {
        let rec = Recommendation {
            kind: RecommendationKind::Deepen,
            priority: TopicPriority::Medium,
            title: "t".to_string(),
            description: "d".to_string(),
            impact: "i".to_string(),
            topics: Vec::new(),
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["type"], "approfondimento");
        assert_eq!(value["priority"], "media");
        assert!(value.get("topics").is_none());
    }

    #[test]
    fn test_buckets_total() {
        let mut buckets = Buckets::default();
        buckets.push(Classification::Covered(Match {
            topic: "dati".to_string(),
            match_type: MatchType::Exact,
            confidence: 1.0,
            matched: None,
        }));
        buckets.push(Classification::Missing(MissingTopic {
            topic: "etica".to_string(),
            priority: TopicPriority::Low,
            category: TopicCategory::Ethical,
            weak_match: None,
        }));
        assert_eq!(buckets.total(), 2);
        assert_eq!(buckets.covered.len(), 1);
        assert_eq!(buckets.missing.len(), 1);
    }
}

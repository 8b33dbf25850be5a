use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::classifier::{Candidate, GapClassifier};
use super::config::GapConfig;
use super::recommendations::RecommendationBuilder;
use super::scoring::{content_quality, coverage_percentage, coverage_ratio, weighted_coverage};
use super::types::{AnalysisMethod, Buckets, GapError, GapOutcome, GapReport};
use super::TARGET_GAP;
use crate::similarity::{Embedder, SimilarityStrategy};
use crate::sources::OverviewInput;
use crate::topic::lexicon::{indicators_present, DEPTH_INDICATORS, STRUCTURE_INDICATORS};
use crate::topic::{Topic, TopicExtractor};

// Candidate topics echoed in the report
const ARTICLE_TOPICS_PREVIEW: usize = 5;

/// Reference state for a series of analyses.
///
/// Built once from the AI Overview and never modified; loading a new overview
/// means building a new context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisContext {
    text: String,
    topics: Vec<Topic>,
}

impl AnalysisContext {
    /// No reference loaded; every analysis reports the not-loaded error
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str, extractor: &TopicExtractor) -> Self {
        extractor
            .normalizer()
            .check_language("AI Overview", text);
        let topics = extractor.extract(text);
        info!(
            target: TARGET_GAP,
            "Loaded {} topics from the AI Overview", topics.len()
        );
        Self {
            text: text.to_string(),
            topics,
        }
    }

    pub fn from_overview(overview: &OverviewInput, extractor: &TopicExtractor) -> Self {
        match overview.content() {
            Some(content) => Self::from_text(content, extractor),
            None => Self::empty(),
        }
    }

    /// Reference topics given directly instead of extracted
    pub fn from_topics<S: AsRef<str>>(text: &str, topics: &[S]) -> Self {
        Self {
            text: text.to_string(),
            topics: topics
                .iter()
                .map(|t| t.as_ref().trim())
                .filter(|t| !t.is_empty())
                .map(|t| Topic::new(t, 1))
                .collect(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.text.trim().is_empty() || !self.topics.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

/// Compares articles against an [`AnalysisContext`].
///
/// When an embedder is configured the first run tries it; any embedding
/// failure re-runs the analysis with the character ratio and leaves the
/// analyzer degraded for the rest of its life.
pub struct GapAnalyzer {
    config: GapConfig,
    extractor: TopicExtractor,
    embedder: Option<Box<dyn Embedder>>,
    degraded: AtomicBool,
}

impl GapAnalyzer {
    pub fn new(config: GapConfig) -> Self {
        let extractor = TopicExtractor::default().with_topic_cap(config.topic_cap);
        Self {
            config,
            extractor,
            embedder: None,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn with_extractor(mut self, extractor: TopicExtractor) -> Self {
        self.extractor = extractor.with_topic_cap(self.config.topic_cap);
        self
    }

    pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn config(&self) -> &GapConfig {
        &self.config
    }

    pub fn extractor(&self) -> &TopicExtractor {
        &self.extractor
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn context_from_text(&self, text: &str) -> AnalysisContext {
        AnalysisContext::from_text(text, &self.extractor)
    }

    pub fn context_from_overview(&self, overview: &OverviewInput) -> AnalysisContext {
        AnalysisContext::from_overview(overview, &self.extractor)
    }

    /// Gap report for one article, or the error sentinel
    pub fn analyze(&self, context: &AnalysisContext, article: &str) -> GapOutcome {
        self.try_analyze(context, article).into()
    }

    pub fn try_analyze(
        &self,
        context: &AnalysisContext,
        article: &str,
    ) -> Result<GapReport, GapError> {
        if !context.is_loaded() {
            return Err(GapError::NotLoaded);
        }
        if article.trim().is_empty() {
            return Err(GapError::EmptyArticle);
        }

        self.extractor.normalizer().check_language("Article", article);
        let candidate = Candidate::new(article, &self.extractor, self.config.min_paragraph_chars);
        let reference = match self.config.reference_topic_limit {
            Some(limit) => &context.topics()[..limit.min(context.topics().len())],
            None => context.topics(),
        };

        let (buckets, method) = self.classify(reference, &candidate);
        Ok(self.report(buckets, method, &candidate))
    }

    fn classify(&self, reference: &[Topic], candidate: &Candidate) -> (Buckets, AnalysisMethod) {
        let classifier = GapClassifier::new(&self.config);

        if let Some(embedder) = self.embedder.as_deref().filter(|_| !self.is_degraded()) {
            let strategy = SimilarityStrategy::embedding(embedder);
            match classifier.classify_all(reference, candidate, &strategy) {
                Ok(buckets) => {
                    let method = if embedder.is_hosted() {
                        AnalysisMethod::ExternalService
                    } else {
                        AnalysisMethod::SemanticApi
                    };
                    return (buckets, method);
                }
                Err(e) => {
                    warn!(
                        target: TARGET_GAP,
                        "Embedding similarity unavailable ({}); falling back to character ratio", e
                    );
                    self.degraded.store(true, Ordering::Relaxed);
                }
            }
        }

        (
            classifier.classify_all_deterministic(reference, candidate),
            AnalysisMethod::Basic,
        )
    }

    fn report(&self, buckets: Buckets, method: AnalysisMethod, candidate: &Candidate) -> GapReport {
        let depth: Vec<String> = indicators_present(candidate.folded(), DEPTH_INDICATORS)
            .into_iter()
            .map(str::to_string)
            .collect();
        let structure: Vec<String> = indicators_present(candidate.folded(), STRUCTURE_INDICATORS)
            .into_iter()
            .map(str::to_string)
            .collect();

        let recommendations =
            RecommendationBuilder::new(&self.config).build(&buckets, depth.len(), structure.len());

        let report = GapReport {
            total_ai_topics: buckets.total(),
            coverage_percentage: coverage_percentage(&buckets),
            weighted_coverage: weighted_coverage(&buckets, self.config.partial_weight),
            content_quality: content_quality(coverage_ratio(&buckets), depth.len(), structure.len()),
            covered_topics: buckets.covered,
            partially_covered: buckets.partial,
            missing_topics: buckets.missing,
            recommendations,
            analysis_method: method,
            article_topics: candidate
                .topics()
                .iter()
                .take(ARTICLE_TOPICS_PREVIEW)
                .map(|t| t.text().to_string())
                .collect(),
            depth_indicators: depth,
            structure_indicators: structure,
        };

        debug!(
            target: TARGET_GAP,
            "Coverage {}% ({} covered, {} partial, {} missing) via {}",
            report.coverage_percentage,
            report.covered_topics.len(),
            report.partially_covered.len(),
            report.missing_topics.len(),
            report.analysis_method
        );
        report
    }
}

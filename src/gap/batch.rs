use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use super::analyzer::{AnalysisContext, GapAnalyzer};
use super::types::{GapError, GapReport, Outcome};
use super::TARGET_GAP;
use crate::sources::ArticleInput;
use crate::util::round2;

const TOPICS_PREVIEW: usize = 5;
const MOST_COMMON_MISSING: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewSummary {
    /// In characters
    pub content_length: usize,
    pub total_topics: usize,
    pub topics_preview: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedArticle {
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub success: bool,
    #[serde(flatten)]
    pub report: GapReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedArticle {
    pub url: String,
    pub error: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArticleAnalysis {
    Analyzed(AnalyzedArticle),
    Failed(FailedArticle),
}

impl ArticleAnalysis {
    pub fn report(&self) -> Option<&AnalyzedArticle> {
        match self {
            ArticleAnalysis::Analyzed(article) => Some(article),
            ArticleAnalysis::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingTopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowCoverageArticle {
    pub url: String,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_articles_analyzed: usize,
    pub average_coverage_percentage: f64,
    pub most_common_missing_topics: Vec<MissingTopicCount>,
    pub articles_with_low_coverage: Vec<LowCoverageArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub ai_overview_summary: OverviewSummary,
    pub articles_analysis: Vec<ArticleAnalysis>,
    pub total_articles: usize,
    pub successful_analyses: usize,
    pub summary: BatchSummary,
    pub analyzed_at: String,
}

pub type BatchOutcome = Outcome<BatchReport>;

impl GapAnalyzer {
    /// Analyze every article record against the same reference context.
    /// Failed records keep their fetch error; they never stop the batch.
    pub fn analyze_articles(
        &self,
        context: &AnalysisContext,
        articles: &[ArticleInput],
    ) -> BatchOutcome {
        if !context.is_loaded() {
            return Outcome::Error {
                error: GapError::NotLoaded.to_string(),
            };
        }

        let articles_analysis: Vec<ArticleAnalysis> = articles
            .iter()
            .map(|article| self.analyze_record(context, article))
            .collect();

        let analyzed: Vec<&AnalyzedArticle> = articles_analysis
            .iter()
            .filter_map(ArticleAnalysis::report)
            .collect();
        info!(
            target: TARGET_GAP,
            "Analyzed {}/{} articles", analyzed.len(), articles.len()
        );

        Outcome::Report(BatchReport {
            ai_overview_summary: OverviewSummary {
                content_length: context.text().chars().count(),
                total_topics: context.topics().len(),
                topics_preview: context
                    .topics()
                    .iter()
                    .take(TOPICS_PREVIEW)
                    .map(|t| t.text().to_string())
                    .collect(),
            },
            total_articles: articles.len(),
            successful_analyses: analyzed.len(),
            summary: self.summarize(&analyzed),
            articles_analysis,
            analyzed_at: Utc::now().to_rfc3339(),
        })
    }

    fn analyze_record(&self, context: &AnalysisContext, article: &ArticleInput) -> ArticleAnalysis {
        let failed = |error: String| {
            warn!(target: TARGET_GAP, "Skipping {}: {}", article.url, error);
            ArticleAnalysis::Failed(FailedArticle {
                url: article.url.clone(),
                error,
                success: false,
            })
        };

        if !article.success {
            let error = article
                .error
                .clone()
                .unwrap_or_else(|| "Errore sconosciuto".to_string());
            return failed(GapError::ArticleFailed(error).to_string());
        }

        match self.try_analyze(context, &article.content) {
            Ok(report) => ArticleAnalysis::Analyzed(AnalyzedArticle {
                url: article.url.clone(),
                title: article.title.clone(),
                word_count: article.word_count,
                success: true,
                report,
            }),
            Err(e) => failed(e.to_string()),
        }
    }

    fn summarize(&self, analyzed: &[&AnalyzedArticle]) -> BatchSummary {
        let average = match analyzed.len() {
            0 => 0.0,
            n => {
                analyzed
                    .iter()
                    .map(|a| a.report.coverage_percentage)
                    .sum::<f64>()
                    / n as f64
            }
        };

        // Counted in first-seen order so ties rank stably
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for article in analyzed {
            for missing in &article.report.missing_topics {
                let count = counts.entry(missing.topic.as_str()).or_insert(0);
                if *count == 0 {
                    order.push(missing.topic.as_str());
                }
                *count += 1;
            }
        }
        let mut most_common: Vec<MissingTopicCount> = order
            .into_iter()
            .map(|topic| MissingTopicCount {
                topic: topic.to_string(),
                count: counts.get(topic).copied().unwrap_or(0),
            })
            .collect();
        most_common.sort_by(|a, b| b.count.cmp(&a.count));
        most_common.truncate(MOST_COMMON_MISSING);

        BatchSummary {
            total_articles_analyzed: analyzed.len(),
            average_coverage_percentage: round2(average),
            most_common_missing_topics: most_common,
            articles_with_low_coverage: analyzed
                .iter()
                .filter(|a| a.report.coverage_percentage < self.config().low_coverage_percentage)
                .map(|a| LowCoverageArticle {
                    url: a.url.clone(),
                    coverage: a.report.coverage_percentage,
                })
                .collect(),
        }
    }
}

//! Topic-coverage gap analysis.
//!
//! Reference topics from the AI Overview are classified against an article
//! into covered, partially covered and missing buckets, then scored and turned
//! into recommendations.

pub mod analyzer;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod recommendations;
pub mod scoring;
pub mod types;

#[cfg(test)]
mod tests;

pub use analyzer::{AnalysisContext, GapAnalyzer};
pub use batch::{BatchOutcome, BatchReport};
pub use config::{GapConfig, MatchThresholds};
pub use types::*;

pub const TARGET_GAP: &str = "gap";

pub mod embedding;
pub mod sequence;
pub mod strategy;

pub use embedding::{
    cosine_similarity, EmbedError, Embedder, EmbeddingConfig, EmbeddingProvider, HttpEmbedder,
};
pub use sequence::similarity;
pub use strategy::{best_match_by_ratio, BestMatch, EmbeddingScorer, SimilarityStrategy};

pub const TARGET_SIMILARITY: &str = "similarity";

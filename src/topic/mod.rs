pub mod extraction;
pub mod lexicon;
pub mod normalizer;
pub mod stopwords;
pub mod types;

pub use extraction::TopicExtractor;
pub use normalizer::{fold, TextNormalizer};
pub use stopwords::Stopwords;
pub use types::*;

// Module-level constants
pub const TARGET_TOPIC: &str = "topic";

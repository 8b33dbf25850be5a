use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::TARGET_TOPIC;

// Bundled lists, one word per line
const ITALIAN: &str = include_str!("../../data/stopwords/italian");
const ENGLISH: &str = include_str!("../../data/stopwords/english");

/// Used when a stopword directory is configured but cannot be read
pub const FALLBACK: &[&str] = &[
    "il", "la", "di", "che", "e", "a", "un", "per", "in", "con", "su", "da", "del", "al", "alla",
    "dei", "delle", "the", "and", "or", "but", "on", "at", "to", "for", "of", "with", "by",
];

/// Combined Italian + English stopword set
#[derive(Debug, Clone)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::bundled()
    }
}

impl Stopwords {
    /// The lists compiled into the binary
    pub fn bundled() -> Self {
        Self::from_lists(&[ITALIAN, ENGLISH])
    }

    pub fn fallback() -> Self {
        Stopwords {
            words: FALLBACK.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Load `italian` and `english` from a directory, falling back to the
    /// built-in short list when either file is unavailable.
    pub fn from_dir(dir: &Path) -> Self {
        let read = |name: &str| fs::read_to_string(dir.join(name));
        match (read("italian"), read("english")) {
            (Ok(italian), Ok(english)) => {
                let stopwords = Self::from_lists(&[&italian, &english]);
                debug!(
                    target: TARGET_TOPIC,
                    "Loaded {} stopwords from {}", stopwords.len(), dir.display()
                );
                stopwords
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    target: TARGET_TOPIC,
                    "Stopword resource unavailable in {}: {}. Using fallback list",
                    dir.display(), e
                );
                Self::fallback()
            }
        }
    }

    fn from_lists(lists: &[&str]) -> Self {
        let words = lists
            .iter()
            .flat_map(|list| list.lines())
            .map(|line| line.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Stopwords { words }
    }

    pub fn extend<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_lists() {
        let stopwords = Stopwords::bundled();
        assert!(stopwords.contains("della"));
        assert!(stopwords.contains("perché"));
        assert!(stopwords.contains("through"));
        assert!(!stopwords.contains("tecnologia"));
        assert!(stopwords.len() > 400);
    }

    #[test]
    fn test_missing_directory_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let stopwords = Stopwords::from_dir(&dir.path().join("missing"));
        assert_eq!(stopwords.len(), Stopwords::fallback().len());
        assert!(stopwords.contains("the"));
        assert!(!stopwords.contains("through"));
    }

    #[test]
    fn test_directory_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("italian"), "alfa\nbeta\n").unwrap();
        fs::write(dir.path().join("english"), "gamma\n").unwrap();
        let stopwords = Stopwords::from_dir(dir.path()).extend(["Delta"]);
        assert_eq!(stopwords.len(), 4);
        assert!(stopwords.contains("delta"));
    }
}

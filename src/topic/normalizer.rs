use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use whatlang::{detect as detect_language, Lang};

use super::stopwords::Stopwords;
use super::TARGET_TOPIC;

/// Tokens shorter than this (in characters) are discarded
pub const MIN_TOKEN_CHARS: usize = 3;

/// Fold text for literal comparisons: NFC composition, lowercase, every
/// character that is not a word character replaced by a space, whitespace
/// collapsed to single spaces.
pub fn fold(text: &str) -> String {
    text.nfc()
        .collect::<String>()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != '_' && !c.is_whitespace(), " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detect the language of a text, if whatlang is confident enough
pub fn detect(text: &str) -> Option<Lang> {
    detect_language(text)
        .filter(|info| info.is_reliable())
        .map(|info| info.lang())
}

/// Only Italian and English texts are normalized with matching stopwords
pub fn is_supported_language(lang: Lang) -> bool {
    matches!(lang, Lang::Ita | Lang::Eng)
}

/// Tokenizer with stopword removal for the two supported locales
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    stopwords: Stopwords,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stopwords(stopwords: Stopwords) -> Self {
        TextNormalizer { stopwords }
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Lowercase alphabetic tokens with punctuation stripped, stopwords removed
    /// and short tokens discarded. Empty input yields no tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        fold(text)
            .split_whitespace()
            .filter(|word| word.chars().all(char::is_alphabetic))
            .filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|word| !self.stopwords.contains(word))
            .map(str::to_string)
            .collect()
    }

    /// Log a warning when a text is outside the supported locales; the text is
    /// still processed.
    pub fn check_language(&self, label: &str, text: &str) -> Option<Lang> {
        let lang = detect(text);
        match lang {
            Some(lang) if !is_supported_language(lang) => {
                warn!(
                    target: TARGET_TOPIC,
                    "{} looks like {} ({}); stopwords cover Italian and English only",
                    label, lang.eng_name(), lang.code()
                );
            }
            Some(lang) => {
                debug!(target: TARGET_TOPIC, "{} detected as {}", label, lang.code());
            }
            None => {
                debug!(target: TARGET_TOPIC, "{}: language not detected", label);
            }
        }
        lang
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("Machine-Learning!"), "machine learning");
        assert_eq!(fold("  L'intelligenza   Artificiale. "), "l intelligenza artificiale");
        assert_eq!(fold(""), "");
        // Decomposed accents are composed before folding
        assert_eq!(fold("sanita\u{300}"), "sanità");
    }

    #[test]
    fn test_tokenize_filters() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.tokenize("Il Machine Learning è una tecnologia, nel 2024!"),
            vec!["machine", "learning", "tecnologia"]
        );
        assert_eq!(
            normalizer.tokenize("The robots are on the way to us"),
            vec!["robots", "way"]
        );
    }

    #[test]
    fn test_tokenize_empty_input() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.tokenize("").is_empty());
        assert!(normalizer.tokenize("   \n\t").is_empty());
        assert!(normalizer.tokenize("... !!! ???").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_accented_words() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.tokenize("Sanità, finanza e società"),
            vec!["sanità", "finanza", "società"]
        );
    }

    #[test]
    fn test_fallback_stopwords() {
        let normalizer = TextNormalizer::with_stopwords(Stopwords::fallback());
        // "nel" is only in the full Italian list
        assert_eq!(
            normalizer.tokenize("nel mondo della finanza"),
            vec!["nel", "mondo", "della", "finanza"]
        );
    }

    #[test]
    fn test_supported_languages() {
        assert!(is_supported_language(Lang::Ita));
        assert!(is_supported_language(Lang::Eng));
        assert!(!is_supported_language(Lang::Deu));
    }
}

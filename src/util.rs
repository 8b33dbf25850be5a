use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // (?s) lets the dot match newlines
    static ref THINKING_TAGS: Regex =
        Regex::new(r"(?s)<think>.*?</think>").expect("thinking tag pattern is valid");
}

/// Strips <think>...</think> blocks emitted by reasoning models.
///
/// If nothing is left after stripping, the original text is returned.
pub fn strip_thinking_tags(text: &str) -> String {
    let result = THINKING_TAGS.replace_all(text, "").trim().to_string();
    if result.is_empty() {
        return text.to_string();
    }
    result
}

/// First `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Round to two decimals for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_thinking_tags() {
        assert_eq!(
            strip_thinking_tags("<think>\nragiono...\n</think>\nRisposta finale"),
            "Risposta finale"
        );
        assert_eq!(strip_thinking_tags("<think>solo</think>"), "<think>solo</think>");
        assert_eq!(strip_thinking_tags("niente tag"), "niente tag");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("sanità pubblica", 6), "sanità");
        assert_eq!(truncate_chars("breve", 200), "breve");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }
}

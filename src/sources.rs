//! Flat-file inputs and outputs.
//!
//! The scraper writes the AI Overview panel as a JSON object, the article
//! fetcher writes a JSON array of records. Both are read leniently: content
//! fields that are not strings are kept as their JSON text instead of failing
//! the whole file.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Any JSON value as text; `null` becomes the empty string
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_word_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().unwrap_or(0) as usize,
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Scraper output for one search results page
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OverviewInput {
    #[serde(default)]
    pub found: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expanded_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_content: String,
}

impl OverviewInput {
    /// The panel text, present only when the scraper found the panel
    pub fn content(&self) -> Option<&str> {
        if self.found && !self.full_content.trim().is_empty() {
            Some(&self.full_content)
        } else {
            None
        }
    }
}

/// Article fetcher record
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArticleInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_word_count")]
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArticleInput {
    /// A successfully fetched article built from plain text
    pub fn from_text(url: &str, title: &str, content: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            success: true,
            word_count: content.split_whitespace().count(),
            error: None,
        }
    }
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse<T: for<'de> Deserialize<'de>>(path: &Path, raw: &str) -> Result<T, SourceError> {
    serde_json::from_str(raw).map_err(|source| SourceError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_overview(path: &Path) -> Result<OverviewInput, SourceError> {
    let overview: OverviewInput = parse(path, &read(path)?)?;
    if overview.content().is_none() {
        info!("AI Overview not found in {}", path.display());
    }
    Ok(overview)
}

/// Accepts a single record or an array of records
pub fn load_articles(path: &Path) -> Result<Vec<ArticleInput>, SourceError> {
    let raw = read(path)?;
    let value: Value = parse(path, &raw)?;
    let articles = match value {
        Value::Array(_) => parse(path, &raw)?,
        _ => vec![parse(path, &raw)?],
    };
    debug!("Loaded {} article records from {}", articles.len(), path.display());
    Ok(articles)
}

/// Pretty-printed UTF-8 JSON
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), SourceError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| SourceError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!("Report saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_found_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overview.json");

        fs::write(&path, r#"{"found": true, "text": "", "full_content": "Il machine learning"}"#)
            .unwrap();
        let overview = load_overview(&path).unwrap();
        assert_eq!(overview.content(), Some("Il machine learning"));

        fs::write(&path, r#"{"found": false, "full_content": "ignorato"}"#).unwrap();
        assert_eq!(load_overview(&path).unwrap().content(), None);

        fs::write(&path, r#"{"found": true, "full_content": "   "}"#).unwrap();
        assert_eq!(load_overview(&path).unwrap().content(), None);
    }

    #[test]
    fn test_non_string_content_is_coerced() {
        let overview: OverviewInput =
            serde_json::from_str(r#"{"found": true, "full_content": {"testo": 1}}"#).unwrap();
        assert_eq!(overview.full_content, r#"{"testo":1}"#);

        let article: ArticleInput =
            serde_json::from_str(r#"{"url": "u", "content": 42, "success": true, "word_count": "7"}"#)
                .unwrap();
        assert_eq!(article.content, "42");
        assert_eq!(article.word_count, 7);
        assert_eq!(article.title, "");
    }

    #[test]
    fn test_load_articles_array_or_single() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");

        fs::write(
            &path,
            r#"[{"url": "a", "content": "x", "success": true},
                {"url": "b", "success": false, "error": "Timeout"}]"#,
        )
        .unwrap();
        let articles = load_articles(&path).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].error.as_deref(), Some("Timeout"));

        fs::write(&path, r#"{"url": "c", "content": "y", "success": true}"#).unwrap();
        assert_eq!(load_articles(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_errors_and_save() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_overview(&dir.path().join("missing.json")),
            Err(SourceError::Io { .. })
        ));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(load_overview(&path), Err(SourceError::Json { .. })));

        let out = dir.path().join("report.json");
        save_json(&ArticleInput::from_text("u", "Titolo", "sanità e finanza"), &out).unwrap();
        let saved = fs::read_to_string(&out).unwrap();
        assert!(saved.contains("sanità"));
        assert!(saved.contains("\"word_count\": 3"));
    }
}

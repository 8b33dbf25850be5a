//! Free-text channel.
//!
//! Prose from the LLM is never parsed back into a report. The only structure
//! recovered from it is an optional trailing `{"chart": ...}` or
//! `{"table": ...}` block, and any failure there leaves the text untouched.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::gap::GapReport;
use crate::llm::generate_llm_response;
use crate::prompts::{chat_prompt, recommendations_prompt};
use crate::LLMParams;

const CHART_KEYWORDS: &[&str] = &[
    "grafico", "grafica", "chart", "plot", "visualizza", "diagramma", "istogramma", "barre",
    "linee", "torta",
];

const TABLE_KEYWORDS: &[&str] = &[
    "tabella", "table", "elenco", "lista strutturata", "confronto", "comparazione",
];

/// Visual the user asked for in a chat question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualRequest {
    Chart,
    Table,
    None,
}

impl VisualRequest {
    /// Charts take precedence when both kinds of keyword appear
    pub fn detect(question: &str) -> Self {
        let lower = question.to_lowercase();
        if CHART_KEYWORDS.iter().any(|k| lower.contains(k)) {
            VisualRequest::Chart
        } else if TABLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            VisualRequest::Table
        } else {
            VisualRequest::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProseResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Value>,
}

impl ProseResponse {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            chart: None,
            table: None,
        }
    }

    /// Split a trailing visual block from the text. Malformed blocks are
    /// left in place.
    pub fn parse(raw: &str) -> Self {
        let Some(start) = raw.find("{\"chart\"").or_else(|| raw.find("{\"table\"")) else {
            return Self::plain(raw);
        };
        let Some(end) = matching_brace(raw, start) else {
            return Self::plain(raw);
        };

        let visual: Value = match serde_json::from_str(&raw[start..end]) {
            Ok(value) => value,
            Err(e) => {
                debug!("Ignoring malformed visual block: {}", e);
                return Self::plain(raw);
            }
        };

        Self {
            text: raw[..start].trim().to_string(),
            chart: visual.get("chart").cloned(),
            table: visual.get("table").cloned(),
        }
    }
}

/// Byte index just past the brace closing the one at `start`
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Editorial prose for a report, or `None` when the service is unavailable
pub async fn recommendation_prose(
    overview_text: &str,
    report: &GapReport,
    params: &LLMParams,
) -> Option<String> {
    let prompt = recommendations_prompt(overview_text, report);
    generate_llm_response(&prompt, params).await
}

/// Answer a chat question, extracting a requested chart or table if present
pub async fn answer_question(
    question: &str,
    overview_text: &str,
    report: Option<&GapReport>,
    params: &LLMParams,
) -> Option<ProseResponse> {
    let visual = VisualRequest::detect(question);
    let prompt = chat_prompt(question, overview_text, report, visual);
    let raw = generate_llm_response(&prompt, params).await?;
    Some(match visual {
        VisualRequest::None => ProseResponse::plain(&raw),
        _ => ProseResponse::parse(&raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_visual_request() {
        assert_eq!(VisualRequest::detect("Fammi un GRAFICO a barre"), VisualRequest::Chart);
        assert_eq!(VisualRequest::detect("Un confronto in tabella"), VisualRequest::Table);
        assert_eq!(VisualRequest::detect("Cosa manca?"), VisualRequest::None);
    }

    #[test]
    fn test_parse_trailing_chart() {
        let raw = "Ecco l'analisi.\n\n{\"chart\": {\"type\": \"bar\", \"title\": \"Gap {x}\", \
                   \"data\": {\"x\": [\"a\", \"b\"], \"y\": [1, 2]}}}";
        let response = ProseResponse::parse(raw);
        assert_eq!(response.text, "Ecco l'analisi.");
        let chart = response.chart.unwrap();
        assert_eq!(chart["type"], "bar");
        assert_eq!(chart["title"], "Gap {x}");
        assert!(response.table.is_none());
    }

    #[test]
    fn test_parse_table() {
        let raw = "Tabella:\n{\"table\": {\"title\": \"T\", \"headers\": [\"A\"], \"rows\": [[\"1\"]]}}\n";
        let response = ProseResponse::parse(raw);
        assert_eq!(response.text, "Tabella:");
        assert_eq!(response.table.unwrap()["headers"][0], "A");
    }

    #[test]
    fn test_malformed_block_falls_back_to_text() {
        for raw in [
            "Testo {\"chart\": {\"type\": }}",
            "Testo {\"chart\": {\"type\": \"bar\"",
            "Solo testo",
        ] {
            let response = ProseResponse::parse(raw);
            assert_eq!(response.text, raw.trim());
            assert!(response.chart.is_none() && response.table.is_none());
        }
    }
}

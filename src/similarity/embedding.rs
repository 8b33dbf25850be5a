use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::TARGET_EMBEDDING_REQUEST;

pub const DEFAULT_OLLAMA_EMBEDDING_URL: &str = "http://localhost:11434/api/embeddings";
pub const DEFAULT_OPENAI_EMBEDDING_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(10);

// Inputs longer than this are truncated before being sent
const MAX_INPUT_CHARS: usize = 8_000;

/// Failures of the embedding service or of the vectors it returned
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Transport(String),

    #[error("embedding service returned HTTP {0}")]
    Status(u16),

    #[error("malformed embedding response: {0}")]
    Malformed(String),

    #[error("vector dimensions don't match: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    #[error("zero magnitude vector detected")]
    ZeroMagnitude,
}

impl From<reqwest::Error> for EmbedError {
    fn from(err: reqwest::Error) -> Self {
        EmbedError::Transport(err.to_string())
    }
}

/// Text → fixed-length vector
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Hosted, authenticated services are reported separately in the
    /// analysis method
    fn is_hosted(&self) -> bool {
        false
    }
}

/// Wire protocol of the embedding endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `{"model", "prompt"}` → `{"embedding": [...]}`
    Ollama,
    /// `{"model", "input"}` → `{"data": [{"embedding": [...]}]}`
    OpenAi,
}

impl EmbeddingProvider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ollama" => Some(EmbeddingProvider::Ollama),
            "openai" => Some(EmbeddingProvider::OpenAi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl EmbeddingConfig {
    pub fn for_provider(provider: EmbeddingProvider) -> Self {
        let (endpoint, model) = match provider {
            EmbeddingProvider::Ollama => {
                (DEFAULT_OLLAMA_EMBEDDING_URL, DEFAULT_OLLAMA_EMBEDDING_MODEL)
            }
            EmbeddingProvider::OpenAi => {
                (DEFAULT_OPENAI_EMBEDDING_URL, DEFAULT_OPENAI_EMBEDDING_MODEL)
            }
        };
        Self {
            provider,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: None,
            timeout: DEFAULT_EMBEDDING_TIMEOUT,
        }
    }
}

/// Blocking HTTP embedder with a bounded timeout and no retry
pub struct HttpEmbedder {
    client: reqwest::blocking::Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    fn payload(&self, text: &str) -> Value {
        let input: String = text.chars().take(MAX_INPUT_CHARS).collect();
        match self.config.provider {
            EmbeddingProvider::Ollama => json!({ "model": self.config.model, "prompt": input }),
            EmbeddingProvider::OpenAi => json!({ "model": self.config.model, "input": input }),
        }
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        debug!(
            target: TARGET_EMBEDDING_REQUEST,
            "Requesting embedding for {} chars from {}", text.len(), self.config.endpoint
        );

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&self.payload(text));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                target: TARGET_EMBEDDING_REQUEST,
                "Embedding service at {} returned {}", self.config.endpoint, status
            );
            return Err(EmbedError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .map_err(|e| EmbedError::Malformed(e.to_string()))?;
        parse_embedding_response(self.config.provider, &body)
    }

    fn is_hosted(&self) -> bool {
        self.config.provider == EmbeddingProvider::OpenAi
    }
}

/// Extract the vector from either response shape
pub fn parse_embedding_response(
    provider: EmbeddingProvider,
    body: &Value,
) -> Result<Vec<f32>, EmbedError> {
    let values = match provider {
        EmbeddingProvider::Ollama => body.get("embedding"),
        EmbeddingProvider::OpenAi => body
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|item| item.get("embedding")),
    }
    .and_then(Value::as_array)
    .ok_or_else(|| EmbedError::Malformed(format!("missing embedding in {}", body)))?;

    if values.is_empty() {
        return Err(EmbedError::Malformed("empty embedding".to_string()));
    }

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbedError::Malformed(format!("non-numeric component {}", v)))
        })
        .collect()
}

/// Cosine similarity between two vectors
pub fn cosine_similarity(vec1: &[f32], vec2: &[f32]) -> Result<f64, EmbedError> {
    if vec1.len() != vec2.len() {
        return Err(EmbedError::DimensionMismatch(vec1.len(), vec2.len()));
    }

    // f64 accumulation keeps integer ratios exact
    let magnitude = |v: &[f32]| v.iter().map(|&x| f64::from(x).powi(2)).sum::<f64>().sqrt();
    let mag1 = magnitude(vec1);
    let mag2 = magnitude(vec2);

    if mag1 < 0.001 || mag2 < 0.001 {
        return Err(EmbedError::ZeroMagnitude);
    }

    let dot_product: f64 = vec1
        .iter()
        .zip(vec2.iter())
        .map(|(&a, &b)| f64::from(a) * f64::from(b))
        .sum();
    Ok(dot_product / (mag1 * mag2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let score = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]).unwrap();
        assert!(score.abs() < 1e-6);
        let score = cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]).unwrap();
        assert!((score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_errors() {
        assert!(matches!(
            cosine_similarity(&[1.0, 0.0], &[1.0]),
            Err(EmbedError::DimensionMismatch(2, 1))
        ));
        assert!(matches!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]),
            Err(EmbedError::ZeroMagnitude)
        ));
    }

    #[test]
    fn test_parse_ollama_response() {
        let body = json!({ "embedding": [0.5, -0.25, 1] });
        let vector = parse_embedding_response(EmbeddingProvider::Ollama, &body).unwrap();
        assert_eq!(vector, vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_parse_openai_response() {
        let body = json!({ "data": [{ "embedding": [0.1, 0.2] }], "model": "x" });
        let vector = parse_embedding_response(EmbeddingProvider::OpenAi, &body).unwrap();
        assert_eq!(vector.len(), 2);
    }

    #[test]
    fn test_parse_malformed_responses() {
        let cases = [
            json!({}),
            json!({ "embedding": [] }),
            json!({ "embedding": ["a", "b"] }),
            json!({ "embedding": "nope" }),
        ];
        for body in cases {
            assert!(matches!(
                parse_embedding_response(EmbeddingProvider::Ollama, &body),
                Err(EmbedError::Malformed(_))
            ));
        }
        // Shape of the other provider is not accepted
        let body = json!({ "embedding": [1.0] });
        assert!(parse_embedding_response(EmbeddingProvider::OpenAi, &body).is_err());
    }

    #[test]
    fn test_provider_parse_and_defaults() {
        assert_eq!(EmbeddingProvider::parse("Ollama"), Some(EmbeddingProvider::Ollama));
        assert_eq!(EmbeddingProvider::parse("openai"), Some(EmbeddingProvider::OpenAi));
        assert_eq!(EmbeddingProvider::parse("gemini"), None);

        let config = EmbeddingConfig::for_provider(EmbeddingProvider::OpenAi);
        assert_eq!(config.endpoint, DEFAULT_OPENAI_EMBEDDING_URL);
        assert_eq!(config.timeout, DEFAULT_EMBEDDING_TIMEOUT);
    }

    #[test]
    fn test_unreachable_service_is_transport_error() {
        let mut config = EmbeddingConfig::for_provider(EmbeddingProvider::Ollama);
        config.endpoint = "http://127.0.0.1:9/api/embeddings".to_string();
        config.timeout = Duration::from_millis(500);
        let embedder = HttpEmbedder::new(config).unwrap();
        assert!(!embedder.is_hosted());
        assert!(matches!(
            embedder.embed("ciao"),
            Err(EmbedError::Transport(_))
        ));
    }
}

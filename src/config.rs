use anyhow::{anyhow, Context, Result};
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::environment::{get_env_var, get_env_var_as_vec, get_env_var_or};
use crate::gap::{GapAnalyzer, GapConfig};
use crate::similarity::embedding::DEFAULT_EMBEDDING_TIMEOUT;
use crate::similarity::{EmbeddingConfig, EmbeddingProvider, HttpEmbedder};
use crate::topic::{Stopwords, TextNormalizer, TopicExtractor};
use crate::{LLMClient, LLMParams};

/// Prose service settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// `ollama` or `openai`
    pub llm_type: String,
    pub model: String,
    pub temperature: f32,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub openai_api_key: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            llm_type: get_env_var("LLM_TYPE")
                .unwrap_or_else(|| "ollama".to_string())
                .to_lowercase(),
            model: get_env_var("LLM_MODEL").unwrap_or_else(|| "llama3".to_string()),
            temperature: get_env_var_or("LLM_TEMPERATURE", 0.2),
            ollama_host: get_env_var("OLLAMA_HOST").unwrap_or_else(|| "localhost".to_string()),
            ollama_port: get_env_var_or("OLLAMA_PORT", 11434),
            openai_api_key: get_env_var("OPENAI_API_KEY"),
        }
    }

    pub fn params(&self) -> Result<LLMParams> {
        let llm_client = match self.llm_type.as_str() {
            "openai" => {
                let api_key = self
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| anyhow!("OPENAI_API_KEY must be set when LLM_TYPE=openai"))?;
                let config = OpenAIConfig::new().with_api_key(api_key);
                LLMClient::OpenAI(OpenAIClient::with_config(config))
            }
            _ => {
                let base_url = if self.ollama_host.starts_with("http://")
                    || self.ollama_host.starts_with("https://")
                {
                    self.ollama_host.clone()
                } else {
                    format!("http://{}", self.ollama_host)
                };
                info!("Connecting to Ollama at {}:{}", base_url, self.ollama_port);
                LLMClient::Ollama(Ollama::new(base_url, self.ollama_port))
            }
        };

        Ok(LLMParams {
            llm_client,
            model: self.model.clone(),
            temperature: self.temperature,
            strip_thinking_tags: true,
        })
    }
}

/// Application configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gap: GapConfig,
    pub stopwords_dir: Option<PathBuf>,
    pub extra_stopwords: Vec<String>,
    /// Set only when `EMBEDDING_PROVIDER` names a known provider
    pub embedding: Option<EmbeddingConfig>,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let gap = GapConfig::from_env().context("invalid gap analysis settings")?;

        let embedding = match get_env_var("EMBEDDING_PROVIDER") {
            None => None,
            Some(name) => {
                let provider = EmbeddingProvider::parse(&name)
                    .ok_or_else(|| anyhow!("unknown EMBEDDING_PROVIDER '{}'", name))?;
                let mut config = EmbeddingConfig::for_provider(provider);
                if let Some(url) = get_env_var("EMBEDDING_URL") {
                    config.endpoint = url;
                }
                if let Some(model) = get_env_var("EMBEDDING_MODEL") {
                    config.model = model;
                }
                config.api_key = get_env_var("EMBEDDING_API_KEY");
                config.timeout = Duration::from_secs(get_env_var_or(
                    "EMBEDDING_TIMEOUT_SECS",
                    DEFAULT_EMBEDDING_TIMEOUT.as_secs(),
                ));
                Some(config)
            }
        };

        Ok(Self {
            gap,
            stopwords_dir: get_env_var("STOPWORDS_DIR").map(PathBuf::from),
            extra_stopwords: get_env_var_as_vec("EXTRA_STOPWORDS", ';'),
            embedding,
            llm: LlmConfig::from_env(),
        })
    }

    pub fn stopwords(&self) -> Stopwords {
        let base = match &self.stopwords_dir {
            Some(dir) => Stopwords::from_dir(dir),
            None => Stopwords::bundled(),
        };
        base.extend(&self.extra_stopwords)
    }

    pub fn extractor(&self) -> TopicExtractor {
        TopicExtractor::new(TextNormalizer::with_stopwords(self.stopwords()))
            .with_topic_cap(self.gap.topic_cap)
    }

    /// Analyzer with the configured stopwords, plus the embedding service
    /// when requested and configured
    pub fn analyzer(&self, use_embeddings: bool) -> Result<GapAnalyzer> {
        let mut analyzer = GapAnalyzer::new(self.gap.clone()).with_extractor(self.extractor());

        if use_embeddings {
            let config = self
                .embedding
                .clone()
                .ok_or_else(|| anyhow!("embeddings requested but EMBEDDING_PROVIDER is not set"))?;
            info!(
                "Using {:?} embeddings ({}) at {}",
                config.provider, config.model, config.endpoint
            );
            let embedder = HttpEmbedder::new(config).context("cannot build embedding client")?;
            analyzer = analyzer.with_embedder(Box::new(embedder));
        }

        Ok(analyzer)
    }

    /// Run `f` with a freshly built analyzer on the blocking thread pool.
    ///
    /// The embedding client is a blocking HTTP client; it must be created,
    /// used and dropped outside the async runtime.
    pub async fn with_analyzer<T, F>(&self, use_embeddings: bool, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&GapAnalyzer) -> T + Send + 'static,
    {
        let config = self.clone();
        tokio::task::spawn_blocking(move || -> Result<T> {
            let analyzer = config.analyzer(use_embeddings)?;
            Ok(f(&analyzer))
        })
        .await?
    }
}

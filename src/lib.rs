pub mod config;
pub mod environment;
pub mod gap;
pub mod llm;
pub mod logging;
pub mod prompts;
pub mod prose;
pub mod similarity;
pub mod sources;
pub mod topic;
pub mod util;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;

pub const TARGET_EMBEDDING_REQUEST: &str = "embedding_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

/// Everything needed to ask the prose service for text
#[derive(Clone, Debug)]
pub struct LLMParams {
    pub llm_client: LLMClient,
    pub model: String,
    pub temperature: f32,
    pub strip_thinking_tags: bool,
}

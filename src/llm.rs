use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use std::time::Duration;
use tokio::time::sleep;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::util::strip_thinking_tags;
use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// One request to whichever backend is configured
async fn request_once(prompt: &str, params: &LLMParams) -> anyhow::Result<String> {
    match &params.llm_client {
        LLMClient::Ollama(ollama) => {
            let mut request = GenerationRequest::new(params.model.clone(), prompt.to_string());
            request.options = Some(GenerationOptions::default().temperature(params.temperature));
            let response = ollama.generate(request).await?;
            Ok(response.response)
        }
        LLMClient::OpenAI(client) => {
            let request = CreateChatCompletionRequestArgs::default()
                .model(params.model.clone())
                .temperature(params.temperature)
                .messages([ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into()])
                .build()?;
            let response = client.chat().create(request).await?;
            Ok(response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default())
        }
    }
}

/// Prose from the LLM with a timeout, retries and exponential backoff.
/// Returns `None` when every attempt failed; callers fall back to the
/// structured report alone.
pub async fn generate_llm_response(prompt: &str, params: &LLMParams) -> Option<String> {
    let mut response_text = String::new();
    let mut backoff = 2;

    debug!(target: TARGET_LLM_REQUEST, "Starting LLM response generation for prompt: {}", prompt);

    for retry_count in 0..MAX_RETRIES {
        match timeout(REQUEST_TIMEOUT, request_once(prompt, params)).await {
            Ok(Ok(response)) => {
                response_text = response;
                debug!(target: TARGET_LLM_REQUEST, "LLM response received: {}", response_text);
                break;
            }
            Ok(Err(e)) => {
                warn!(target: TARGET_LLM_REQUEST, "Error generating response: {}", e);
                if retry_count < MAX_RETRIES - 1 {
                    info!(target: TARGET_LLM_REQUEST, "Retrying LLM request... ({}/{})", retry_count + 1, MAX_RETRIES);
                } else {
                    error!(target: TARGET_LLM_REQUEST, "Failed to generate response after {} retries", MAX_RETRIES);
                }
            }
            Err(_) => {
                warn!(target: TARGET_LLM_REQUEST, "LLM request timed out");
                if retry_count < MAX_RETRIES - 1 {
                    info!(target: TARGET_LLM_REQUEST, "Retrying LLM request... ({}/{})", retry_count + 1, MAX_RETRIES);
                } else {
                    error!(target: TARGET_LLM_REQUEST, "Failed to generate response after {} retries due to timeouts", MAX_RETRIES);
                }
            }
        }

        if retry_count < MAX_RETRIES - 1 {
            debug!(target: TARGET_LLM_REQUEST, "Backing off for {} seconds before retry", backoff);
            sleep(Duration::from_secs(backoff)).await;
            backoff *= 2; // Exponential backoff
        }
    }

    if response_text.trim().is_empty() {
        error!(target: TARGET_LLM_REQUEST, "No response generated after all retries");
        None
    } else if params.strip_thinking_tags {
        Some(strip_thinking_tags(&response_text))
    } else {
        Some(response_text)
    }
}

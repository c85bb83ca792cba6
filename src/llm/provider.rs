use async_trait::async_trait;

use crate::config::{HttpConfig, OpenAIConfig};
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for an LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
}

/// Build the adapter for a named provider.
pub fn create_adapter(
    provider: &LLMProviderConfig,
    openai: &OpenAIConfig,
    http: &HttpConfig,
) -> AppResult<Box<dyn LLMAdapter>> {
    match provider.name.as_str() {
        "openai" => Ok(Box::new(crate::llm::openai::OpenAIAdapter::new(
            &provider.api_key,
            &openai.api_base,
            http,
        )?)),
        other => Err(AppError::Config(format!("Unsupported LLM provider: {}", other))),
    }
}

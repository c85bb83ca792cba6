use std::time::Duration;

use async_openai::config::OpenAIConfig as ClientConfig;
use async_openai::error::OpenAIError;
use async_openai::Client;
use backoff::ExponentialBackoffBuilder;

use crate::config::HttpConfig;
use crate::types::{AppError, AppResult};

/// Shared builder for outbound API clients so every call honours the configured timeout.
pub fn http_client(config: &HttpConfig) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("vector-news/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// OpenAI client over the shared HTTP client. The library's own rate-limit
/// backoff is disabled so `HTTP_MAX_ATTEMPTS` alone decides retries.
pub fn openai_client(api_key: &str, api_base: &str, http: &HttpConfig) -> AppResult<Client<ClientConfig>> {
    let config = ClientConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base.trim_end_matches('/'));

    let no_backoff = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Ok(Client::with_config(config)
        .with_http_client(http_client(http)?)
        .with_backoff(no_backoff))
}

/// Human-readable cause of an OpenAI failure.
pub fn describe_openai_error(error: &OpenAIError) -> String {
    match error {
        OpenAIError::ApiError(api) => match &api.r#type {
            Some(kind) => format!("OpenAI API error: {} (type: {})", api.message, kind),
            None => format!("OpenAI API error: {}", api.message),
        },
        OpenAIError::Reqwest(e) => format!("request failed: {}", e),
        OpenAIError::JSONDeserialize(e) => format!("malformed response: {}", e),
        other => other.to_string(),
    }
}

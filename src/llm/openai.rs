// OpenAI chat completions adapter
// API Reference: https://platform.openai.com/docs/api-reference/chat/create

use async_openai::config::OpenAIConfig as ClientConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, FinishReason,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::HttpConfig;
use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, LLMResponse, TokenUsage};
use crate::utils::{describe_openai_error, openai_client, with_retry};

pub struct OpenAIAdapter {
    client: Client<ClientConfig>,
    max_attempts: u32,
}

fn llm_error(error: async_openai::error::OpenAIError) -> AppError {
    AppError::LLMApi(describe_openai_error(&error))
}

fn to_request_message(message: &LLMMessage) -> AppResult<ChatCompletionRequestMessage> {
    let content = message.content.clone();
    let converted = match message.role.as_str() {
        "user" => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(llm_error)?
            .into(),
        "assistant" => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(llm_error)?
            .into(),
        "system" => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(llm_error)?
            .into(),
        other => {
            return Err(AppError::InvalidRequest(format!("Unknown message role: {}", other)));
        }
    };
    Ok(converted)
}

fn finish_reason_label(reason: Option<FinishReason>) -> &'static str {
    match reason {
        Some(FinishReason::Stop) => "stop",
        Some(FinishReason::Length) => "length",
        Some(FinishReason::ToolCalls) => "tool_calls",
        Some(FinishReason::ContentFilter) => "content_filter",
        Some(FinishReason::FunctionCall) => "function_call",
        None => "unknown",
    }
}

impl OpenAIAdapter {
    pub fn new(api_key: &str, api_base: &str, http: &HttpConfig) -> AppResult<Self> {
        Ok(Self {
            client: openai_client(api_key, api_base, http)?,
            max_attempts: http.max_attempts,
        })
    }

    async fn send(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let messages = request
            .messages
            .iter()
            .map(to_request_message)
            .collect::<AppResult<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&request.model).messages(messages);
        if let Some(max_tokens) = request.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            args.temperature(temperature);
        }
        let chat_request = args.build().map_err(llm_error)?;

        let response = self.client.chat().create(chat_request).await.map_err(llm_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMApi("OpenAI returned no choices".to_string()))?;

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: finish_reason_label(choice.finish_reason).to_string(),
            usage,
        })
    }
}

#[async_trait]
impl LLMAdapter for OpenAIAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        debug!(model = %request.model, messages = request.messages.len(), "Calling OpenAI chat completion");

        let response = with_retry(|| self.send(request), self.max_attempts)
            .await
            .map_err(|e| {
                error!(error = %e, model = %request.model, "Chat completion failed");
                e
            })?;

        debug!(total_tokens = response.usage.total_tokens, "Chat completion finished");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn adapter_for(url: &str) -> OpenAIAdapter {
        let http = HttpConfig {
            timeout_secs: 5,
            max_attempts: 1,
        };
        OpenAIAdapter::new("sk-test", url, &http).unwrap()
    }

    fn request() -> LLMRequest {
        LLMRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![LLMMessage::user("질문")],
            max_tokens: Some(64),
            temperature: Some(0.0),
        }
    }

    #[tokio::test]
    async fn test_chat_completion_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{ "role": "user", "content": "질문" }],
                "temperature": 0.0,
                "max_completion_tokens": 64
            })))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "id": "chatcmpl-1",
                    "object": "chat.completion",
                    "created": 1710000000,
                    "model": "gpt-4o-mini",
                    "choices": [{
                        "index": 0,
                        "message": { "role": "assistant", "content": "답변입니다" },
                        "finish_reason": "stop"
                    }],
                    "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let response = adapter_for(&server.url())
            .create_chat_completion(&request())
            .await
            .unwrap();

        assert_eq!(response.content, "답변입니다");
        assert_eq!(response.finish_reason, "stop");
        assert_eq!(response.usage.total_tokens, 15);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_completion_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let err = adapter_for(&server.url())
            .create_chat_completion(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LLMApi(_)));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let err = to_request_message(&LLMMessage::new("narrator", "x")).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_no_choices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"id": "chatcmpl-2", "object": "chat.completion", "created": 1710000000, "model": "gpt-4o-mini", "choices": []}"#,
            )
            .create_async()
            .await;

        assert!(adapter_for(&server.url())
            .create_chat_completion(&request())
            .await
            .is_err());
    }
}

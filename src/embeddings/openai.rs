// OpenAI embeddings client
// API Reference: https://platform.openai.com/docs/api-reference/embeddings

use async_openai::config::OpenAIConfig as ClientConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::{HttpConfig, OpenAIConfig};
use crate::embeddings::provider::EmbeddingProvider;
use crate::types::{AppError, AppResult};
use crate::utils::{describe_openai_error, openai_client, with_retry};

pub struct OpenAIEmbeddings {
    client: Client<ClientConfig>,
    model: String,
    dimension: usize,
    max_attempts: u32,
}

impl OpenAIEmbeddings {
    pub fn new(openai: &OpenAIConfig, http: &HttpConfig) -> AppResult<Self> {
        Ok(Self {
            client: openai_client(&openai.api_key, &openai.api_base, http)?,
            model: openai.embedding_model.clone(),
            dimension: openai.embedding_dimension,
            max_attempts: http.max_attempts,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request_embedding(&self, text: &str) -> AppResult<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()
            .map_err(|e| AppError::Embedding(describe_openai_error(&e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| AppError::Embedding(describe_openai_error(&e)))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::Embedding("response contained no embedding".to_string()))?;

        if embedding.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.dimension,
                embedding.len()
            )));
        }

        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    async fn generate_embedding(&self, text: &str) -> AppResult<Vec<f32>> {
        debug!(model = %self.model, text_len = text.len(), "Generating embedding");

        with_retry(|| self.request_embedding(text), self.max_attempts)
            .await
            .map_err(|e| {
                error!(error = %e, model = %self.model, "Embedding generation failed");
                e
            })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

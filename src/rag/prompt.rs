//! Prompt templates and the single-turn LLM chain.

use std::collections::HashMap;
use std::sync::Arc;

use tera::{Context, Tera};
use tracing::debug;

use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

pub const RAG_TEMPLATE: &str =
    "다음 정보를 바탕으로 질문에 답변해주세요:\n\n정보:\n{{ context }}\n\n질문: {{ question }}\n\n답변:";

/// Tera template rendered with named string variables. Autoescaping is off:
/// the output is a prompt, not HTML.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn rag() -> Self {
        Self::new(RAG_TEMPLATE)
    }

    /// Render with `values`. A variable the template uses but `values` lacks is an error.
    pub fn format(&self, values: &HashMap<&str, &str>) -> AppResult<String> {
        let mut context = Context::new();
        for (name, value) in values {
            context.insert(*name, value);
        }

        Tera::one_off(&self.template, &context, false)
            .map_err(|e| AppError::Internal(format!("failed to render prompt: {}", e)))
    }
}

/// Formats a template and sends it as one user message.
#[derive(Clone)]
pub struct LLMChain {
    template: PromptTemplate,
    llm: Arc<dyn LLMAdapter>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LLMChain {
    pub fn new(
        template: PromptTemplate,
        llm: Arc<dyn LLMAdapter>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            template,
            llm,
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    pub async fn run(&self, values: &HashMap<&str, &str>) -> AppResult<String> {
        let prompt = self.template.format(values)?;
        debug!(model = %self.model, prompt_len = prompt.len(), "Running LLM chain");

        let request = LLMRequest {
            model: self.model.clone(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let response = self.llm.create_chat_completion(&request).await?;
        Ok(response.content.trim().to_string())
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::OpenAIConfig;
use crate::embeddings::VectorStoreManager;
use crate::llm::LLMAdapter;
use crate::models::{RagResponse, ScoredDocument};
use crate::rag::prompt::{LLMChain, PromptTemplate};
use crate::types::AppResult;

pub const NO_DOCUMENTS_ANSWER: &str = "관련 문서를 찾을 수 없어 질문에 답변할 수 없습니다.";

/// Answers questions from the documents nearest to them. Keeps no state between calls.
#[derive(Clone)]
pub struct RagGenerator {
    store: VectorStoreManager,
    chain: LLMChain,
}

impl RagGenerator {
    pub fn new(store: VectorStoreManager, llm: Arc<dyn LLMAdapter>, openai: &OpenAIConfig) -> Self {
        let chain = LLMChain::new(
            PromptTemplate::rag(),
            llm,
            openai.completion_model.clone(),
            openai.temperature,
            openai.max_tokens,
        );
        Self { store, chain }
    }

    pub async fn answer(&self, query: &str, limit: i64) -> AppResult<RagResponse> {
        let sources = self.store.search_similar_documents(query, limit, None).await?;

        if sources.is_empty() {
            info!("No documents retrieved, skipping generation");
            return Ok(RagResponse {
                answer: NO_DOCUMENTS_ANSWER.to_string(),
                sources,
            });
        }

        let context = build_context(&sources);
        let values = HashMap::from([("context", context.as_str()), ("question", query)]);
        let answer = self.chain.run(&values).await?;

        info!(sources = sources.len(), answer_len = answer.len(), "RAG answer generated");
        Ok(RagResponse { answer, sources })
    }
}

/// Numbered `문서 n:` blocks separated by blank lines.
pub fn build_context(documents: &[ScoredDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("문서 {}:\n{}", i + 1, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

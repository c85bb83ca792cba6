//! In-memory doubles shared by unit tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::db::{DocumentRepository, NewDocument};
use crate::embeddings::{EmbeddingProvider, VectorStoreManager};
use crate::llm::LLMAdapter;
use crate::models::{AppState, Document, Metadata, ScoredDocument};
use crate::news::NewsClient;
use crate::rag::RagGenerator;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

/// Bag-of-words hashing embedder: identical texts map to identical unit vectors.
pub struct HashEmbedder {
    reported: usize,
    produced: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            reported: dimension,
            produced: dimension,
        }
    }

    /// Claims one dimension but emits vectors of another.
    pub fn misreporting(reported: usize, produced: usize) -> Self {
        Self { reported, produced }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn generate_embedding(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut vector = vec![0f32; self.produced];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            vector[(hasher.finish() % self.produced as u64) as usize] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.reported
    }
}

pub struct FailingEmbedder;

/// Delegates to a [`HashEmbedder`] but fails on one chosen call (1-based).
pub struct FlakyEmbedder {
    inner: HashEmbedder,
    calls: AtomicUsize,
    fail_on: usize,
}

impl FlakyEmbedder {
    pub fn failing_on(call: usize) -> Self {
        Self {
            inner: HashEmbedder::new(1536),
            calls: AtomicUsize::new(0),
            fail_on: call,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn generate_embedding(&self, text: &str) -> AppResult<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(AppError::Embedding(format!("call {} rejected", call)));
        }
        self.inner.generate_embedding(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn generate_embedding(&self, _text: &str) -> AppResult<Vec<f32>> {
        Err(AppError::Embedding("embedding service unavailable".to_string()))
    }

    fn dimension(&self) -> usize {
        1536
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    rows: Mutex<Vec<Document>>,
    next_id: Mutex<i32>,
    writes: AtomicUsize,
    writes_allowed: Option<usize>,
}

impl MemoryRepository {
    /// Accepts `writes` insert calls, then fails every later one with a database error.
    pub fn failing_after(writes: usize) -> Self {
        Self {
            writes_allowed: Some(writes),
            ..Self::default()
        }
    }

    fn check_write(&self) -> AppResult<()> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        match self.writes_allowed {
            Some(allowed) if write > allowed => Err(AppError::Database(sqlx::Error::PoolTimedOut)),
            _ => Ok(()),
        }
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[async_trait]
impl DocumentRepository for MemoryRepository {
    async fn insert(&self, content: &str, metadata: Option<&Metadata>, embedding: &[f32]) -> AppResult<i32> {
        self.check_write()?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.rows.lock().unwrap().push(Document {
            id: *next_id,
            content: content.to_string(),
            metadata: metadata.cloned(),
            embedding: embedding.to_vec(),
        });
        Ok(*next_id)
    }

    async fn insert_many(&self, documents: &[NewDocument]) -> AppResult<Vec<i32>> {
        self.check_write()?;
        let mut next_id = self.next_id.lock().unwrap();
        let mut rows = self.rows.lock().unwrap();
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            *next_id += 1;
            rows.push(Document {
                id: *next_id,
                content: document.content.clone(),
                metadata: document.metadata.clone(),
                embedding: document.embedding.clone(),
            });
            ids.push(*next_id);
        }
        Ok(ids)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Document>> {
        Ok(self.rows.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|d| d.id != id);
        Ok(rows.len() != before)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }

    async fn nearest(&self, embedding: &[f32], limit: i64) -> AppResult<Vec<ScoredDocument>> {
        let rows = self.rows.lock().unwrap();
        let mut scored: Vec<ScoredDocument> = rows
            .iter()
            .map(|d| {
                ScoredDocument::new(
                    d.id,
                    d.content.clone(),
                    d.metadata.clone(),
                    l2_distance(&d.embedding, embedding),
                )
            })
            .collect();
        scored.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.id.cmp(&b.id)));
        scored.truncate(limit.max(0) as usize);
        Ok(scored)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}

/// Answers with the prompt it received so tests can inspect it.
#[derive(Default)]
pub struct EchoLLM {
    pub requests: Mutex<Vec<LLMRequest>>,
}

#[async_trait]
impl LLMAdapter for EchoLLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(LLMResponse {
            content: format!("ANSWER<{}>", prompt),
            finish_reason: "stop".to_string(),
            usage: TokenUsage::default(),
        })
    }
}

pub struct FailingLLM;

#[async_trait]
impl LLMAdapter for FailingLLM {
    async fn create_chat_completion(&self, _request: &LLMRequest) -> AppResult<LLMResponse> {
        Err(AppError::LLMApi("model overloaded".to_string()))
    }
}

pub fn test_config() -> Config {
    let settings = config::Config::builder()
        .set_override("openai_api_key", "sk-test")
        .unwrap()
        .build()
        .unwrap();
    Config::from_settings(&settings).unwrap()
}

pub fn memory_store() -> VectorStoreManager {
    VectorStoreManager::new(Arc::new(MemoryRepository::default()), Arc::new(HashEmbedder::new(1536)))
}

pub fn sample_news() -> NewsClient {
    NewsClient::sample()
}

pub fn test_state_with(store: VectorStoreManager, llm: Arc<dyn LLMAdapter>) -> AppState {
    let config = Arc::new(test_config());
    let rag = RagGenerator::new(store.clone(), llm, &config.openai);
    AppState {
        config,
        store,
        news: sample_news(),
        rag,
    }
}

pub fn test_state() -> AppState {
    test_state_with(memory_store(), Arc::new(EchoLLM::default()))
}

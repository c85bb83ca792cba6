use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::Config;
use crate::embeddings::VectorStoreManager;
use crate::news::NewsClient;
use crate::rag::RagGenerator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: VectorStoreManager,
    pub news: NewsClient,
    pub rag: RagGenerator,
}

/// Open-ended document metadata; any JSON object is accepted.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored document row. `embedding` always has the configured dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i32,
    pub content: String,
    pub metadata: Option<Metadata>,
    pub embedding: Vec<f32>,
}

/// Row returned by a nearest-neighbour query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub id: i32,
    pub content: String,
    pub metadata: Option<Metadata>,
    /// L2 distance to the query vector; lower is closer.
    pub score: f64,
    pub similarity: f64,
}

impl ScoredDocument {
    pub fn new(id: i32, content: String, metadata: Option<Metadata>, distance: f64) -> Self {
        Self {
            id,
            content,
            metadata,
            score: distance,
            similarity: 1.0 - distance,
        }
    }
}

/// A news article as returned by the news source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

// API Request/Response types

#[derive(Debug, Deserialize, Validate)]
pub struct DocumentCreate {
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub use_splitter: bool,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<i32>>,
    pub content: String,
    pub metadata: Option<Metadata>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            ids: None,
            content: document.content,
            metadata: document.metadata,
        }
    }
}

fn default_search_limit() -> i64 {
    5
}

fn default_import_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
    #[serde(default = "default_search_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[validate(range(min = -1.0, max = 1.0))]
    pub score_threshold: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RagQuery {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
    #[serde(default = "default_search_limit")]
    #[validate(range(min = 1, max = 20))]
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<ScoredDocument>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct NewsImportRequest {
    pub query: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_import_limit")]
    #[validate(range(min = 1, max = 50))]
    pub limit: i64,
    #[serde(default)]
    pub use_splitter: bool,
}

#[derive(Debug, Serialize)]
pub struct NewsImportResponse {
    pub success: bool,
    pub message: String,
    pub imported_count: usize,
    pub document_ids: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub database: String,
    pub document_count: Option<i64>,
    pub using_sample_data: bool,
    pub bigkinds_api_available: bool,
}

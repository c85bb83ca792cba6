//! Vector store manager
//!
//! Owns the document repository and the embedding provider and is the only
//! place where rows are written: every stored document gets its embedding
//! here, and a failed embedding never produces a row.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::{self, DocumentRepository, NewDocument, PgDocumentRepository};
use crate::embeddings::provider::EmbeddingProvider;
use crate::embeddings::text_chunker::TextChunker;
use crate::models::{Document, Metadata, NewsArticle, ScoredDocument};
use crate::news::NewsClient;
use crate::types::{AppError, AppResult};

#[derive(Clone)]
pub struct VectorStoreManager {
    repository: Arc<dyn DocumentRepository>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: TextChunker,
}

/// Which news listing an import pulls from.
#[derive(Debug, Clone, Default)]
pub struct NewsImport {
    pub query: Option<String>,
    pub category: Option<String>,
    pub limit: usize,
    pub use_splitter: bool,
}

/// Documents stored by an import, and the error that stopped it early, if any.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub document_ids: Vec<i32>,
    pub error: Option<AppError>,
}

impl VectorStoreManager {
    pub fn new(repository: Arc<dyn DocumentRepository>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            repository,
            embedder,
            chunker: TextChunker::default(),
        }
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Open the PostgreSQL pool, applying pending migrations when `migrate` is set.
    /// Connection failures are returned, not retried.
    pub async fn connect(config: &Config, embedder: Arc<dyn EmbeddingProvider>, migrate: bool) -> AppResult<Self> {
        let pool = db::create_pool(config).await?;
        if migrate {
            db::run_migrations(&pool).await?;
        }
        Ok(Self::new(Arc::new(PgDocumentRepository::new(pool)), embedder))
    }

    pub async fn disconnect(&self) {
        self.repository.close().await;
        info!("Vector store disconnected");
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let embedding = self.embedder.generate_embedding(text).await?;
        if embedding.len() != self.dimension() {
            return Err(AppError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.dimension(),
                embedding.len()
            )));
        }
        Ok(embedding)
    }

    /// Embed `content` and store it as one row.
    pub async fn add_document(&self, content: &str, metadata: Option<&Metadata>) -> AppResult<i32> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidRequest("content must not be empty".to_string()));
        }

        let embedding = self.embed(content).await?;
        let id = self.repository.insert(content, metadata, &embedding).await?;

        info!(id, content_len = content.len(), "Document added");
        Ok(id)
    }

    /// Store `content` whole, or as one row per chunk when `use_splitter` is set.
    /// Chunk rows carry `chunk_index` and `chunk_count` in their metadata.
    pub async fn add_document_chunks(
        &self,
        content: &str,
        metadata: Option<&Metadata>,
        use_splitter: bool,
    ) -> AppResult<Vec<i32>> {
        if !use_splitter {
            return Ok(vec![self.add_document(content, metadata).await?]);
        }

        let chunks = self.chunker.split(content);
        if chunks.is_empty() {
            return Err(AppError::InvalidRequest("content must not be empty".to_string()));
        }

        // Embed every chunk before writing so a failure leaves no partial document.
        let chunk_count = chunks.len();
        let mut rows = Vec::with_capacity(chunk_count);
        for (index, chunk) in chunks.into_iter().enumerate() {
            let mut chunk_metadata = metadata.cloned().unwrap_or_default();
            chunk_metadata.insert("chunk_index".to_string(), index.into());
            chunk_metadata.insert("chunk_count".to_string(), chunk_count.into());

            let embedding = self.embed(&chunk).await?;
            rows.push(NewDocument {
                content: chunk,
                metadata: Some(chunk_metadata),
                embedding,
            });
        }

        let ids = self.repository.insert_many(&rows).await?;
        info!(chunks = ids.len(), content_len = content.len(), "Document added in chunks");
        Ok(ids)
    }

    pub async fn get_document(&self, id: i32) -> AppResult<Document> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("document {}", id)))
    }

    /// Idempotent: removing an unknown id succeeds.
    pub async fn delete_document(&self, id: i32) -> AppResult<()> {
        let removed = self.repository.delete(id).await?;
        info!(id, removed, "Document delete requested");
        Ok(())
    }

    pub async fn delete_collection(&self) -> AppResult<u64> {
        let removed = self.repository.delete_all().await?;
        warn!(removed, "Document collection cleared");
        Ok(removed)
    }

    /// Up to `limit` documents nearest to `query_text`, closest first.
    /// With a threshold, hits whose similarity falls below it are dropped.
    pub async fn search_similar_documents(
        &self,
        query_text: &str,
        limit: i64,
        score_threshold: Option<f64>,
    ) -> AppResult<Vec<ScoredDocument>> {
        if query_text.trim().is_empty() {
            return Err(AppError::InvalidRequest("query must not be empty".to_string()));
        }
        if limit < 1 {
            return Err(AppError::InvalidRequest("limit must be positive".to_string()));
        }

        let embedding = self.embed(query_text).await?;
        let mut results = self.repository.nearest(&embedding, limit).await?;

        if let Some(threshold) = score_threshold {
            results.retain(|r| r.similarity >= threshold);
        }

        info!(limit, hits = results.len(), "Similarity search completed");
        Ok(results)
    }

    /// Fetch articles and store each one. Articles whose embedding fails are
    /// skipped; any other failure stops the import, and the outcome still lists
    /// the documents stored before it.
    pub async fn import_news_data(&self, news: &NewsClient, import: &NewsImport) -> ImportOutcome {
        let fetched = match (&import.query, &import.category) {
            (Some(query), _) if !query.trim().is_empty() => news.search_news(query, import.limit).await,
            (_, Some(category)) if !category.trim().is_empty() => {
                news.get_news_by_category(category, import.limit).await
            }
            _ => news.get_recent_news(import.limit).await,
        };

        let articles = match fetched {
            Ok(articles) => articles,
            Err(e) => {
                return ImportOutcome {
                    document_ids: Vec::new(),
                    error: Some(e),
                }
            }
        };

        let mut outcome = ImportOutcome::default();
        for article in &articles {
            let content = format!("{}\n\n{}", article.title, article.content);
            let metadata = article_metadata(article);

            match self
                .add_document_chunks(&content, Some(&metadata), import.use_splitter)
                .await
            {
                Ok(mut new_ids) => outcome.document_ids.append(&mut new_ids),
                Err(AppError::Embedding(reason)) => {
                    warn!(news_id = %article.id, %reason, "Skipping article without embedding");
                }
                Err(e) => {
                    warn!(news_id = %article.id, stored = outcome.document_ids.len(), "News import interrupted");
                    outcome.error = Some(e);
                    return outcome;
                }
            }
        }

        info!(fetched = articles.len(), stored = outcome.document_ids.len(), "News import completed");
        outcome
    }

    pub async fn count_documents(&self) -> AppResult<i64> {
        self.repository.count().await
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

fn article_metadata(article: &NewsArticle) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), article.source.clone().into());
    metadata.insert("date".to_string(), article.date.clone().into());
    metadata.insert("category".to_string(), article.category.clone().into());
    metadata.insert("keywords".to_string(), article.keywords.clone().into());
    metadata.insert("news_id".to_string(), article.id.clone().into());
    metadata
}

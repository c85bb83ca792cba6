//! Persistence for the `documents` table.
//!
//! Each row holds free text, an optional JSON metadata object and a pgvector
//! embedding. Nearest-neighbour queries use the L2 operator (`<->`) so they can
//! be served by the HNSW index created in the migrations.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use crate::models::{Document, Metadata, ScoredDocument};
use crate::types::AppResult;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a row and return its database-assigned id.
    async fn insert(
        &self,
        content: &str,
        metadata: Option<&Metadata>,
        embedding: &[f32],
    ) -> AppResult<i32>;

    /// Insert every row or none of them; ids come back in input order.
    async fn insert_many(&self, documents: &[NewDocument]) -> AppResult<Vec<i32>>;

    async fn get(&self, id: i32) -> AppResult<Option<Document>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> AppResult<bool>;

    async fn delete_all(&self) -> AppResult<u64>;

    /// Up to `limit` rows ordered by ascending distance, ties by id.
    async fn nearest(&self, embedding: &[f32], limit: i64) -> AppResult<Vec<ScoredDocument>>;

    async fn count(&self) -> AppResult<i64>;

    async fn ping(&self) -> AppResult<()>;

    /// Release every pooled connection.
    async fn close(&self);
}

/// A row ready to be written: content plus its already-computed embedding.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub content: String,
    pub metadata: Option<Metadata>,
    pub embedding: Vec<f32>,
}

const INSERT_DOCUMENT: &str = r#"
    INSERT INTO documents (content, metadata, embedding)
    VALUES ($1, $2, $3)
    RETURNING id
"#;

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i32,
    content: String,
    metadata: Option<Json<Metadata>>,
    embedding: Vector,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            metadata: row.metadata.map(|m| m.0),
            embedding: row.embedding.to_vec(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScoredRow {
    id: i32,
    content: String,
    metadata: Option<Json<Metadata>>,
    distance: f64,
}

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(
        &self,
        content: &str,
        metadata: Option<&Metadata>,
        embedding: &[f32],
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(INSERT_DOCUMENT)
            .bind(content)
            .bind(metadata.map(Json))
            .bind(Vector::from(embedding.to_vec()))
            .fetch_one(&self.pool)
            .await?;

        debug!(id, "Inserted document");
        Ok(id)
    }

    async fn insert_many(&self, documents: &[NewDocument]) -> AppResult<Vec<i32>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(documents.len());

        for document in documents {
            let id: i32 = sqlx::query_scalar(INSERT_DOCUMENT)
                .bind(&document.content)
                .bind(document.metadata.as_ref().map(Json))
                .bind(Vector::from(document.embedding.clone()))
                .fetch_one(&mut *tx)
                .await?;
            ids.push(id);
        }

        tx.commit().await?;
        debug!(count = ids.len(), "Inserted documents");
        Ok(ids)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, content, metadata, embedding FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM documents")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn nearest(&self, embedding: &[f32], limit: i64) -> AppResult<Vec<ScoredDocument>> {
        let rows = sqlx::query_as::<_, ScoredRow>(
            r#"
            SELECT id, content, metadata, distance
            FROM (
                SELECT id, content, metadata, (embedding <-> $1)::float8 AS distance
                FROM documents
                ORDER BY embedding <-> $1
                LIMIT $2
            ) nearest
            ORDER BY distance, id
            "#,
        )
        .bind(Vector::from(embedding.to_vec()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                ScoredDocument::new(row.id, row.content, row.metadata.map(|m| m.0), row.distance)
            })
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> AppResult<()> {
        super::health_check(&self.pool).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

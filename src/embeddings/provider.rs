use async_trait::async_trait;

use crate::types::AppResult;

/// Converts text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Errors are logged by the implementation before being returned.
    async fn generate_embedding(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;
}

// Embeddings and vector search

pub mod openai;
pub mod provider;
pub mod text_chunker;
pub mod vector_search;

pub use openai::OpenAIEmbeddings;
pub use provider::EmbeddingProvider;
pub use text_chunker::TextChunker;
pub use vector_search::{ImportOutcome, NewsImport, VectorStoreManager};

// Retrieval-augmented answer generation

pub mod generator;
pub mod prompt;

pub use generator::RagGenerator;
pub use prompt::{LLMChain, PromptTemplate};

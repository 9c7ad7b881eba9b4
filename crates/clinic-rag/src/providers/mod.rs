//! Provider abstractions for embeddings, LLM, vision and vector storage
//!
//! Trait-based seams so pipelines receive their external clients as explicit
//! dependencies rather than process-wide singletons; tests substitute stub
//! implementations behind the same traits.

pub mod embedding;
pub mod google;
pub mod llm;
pub mod memory;
pub mod pinecone;
pub mod vector_store;
pub mod vision;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use vector_store::{RetrievalScope, ScoredRecord, VectorRecord, VectorStoreProvider};
pub use vision::VisionProvider;

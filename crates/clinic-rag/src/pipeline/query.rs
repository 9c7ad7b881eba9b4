//! Retrieval-augmented query pipeline
//!
//! Embeds the doctor's question, fetches the nearest records inside a
//! mandatory patient or file scope, and asks the LLM for an answer grounded
//! in the retrieved text. The top-ranked record's filename is returned as
//! the cited source.

use std::sync::Arc;

use crate::error::Result;
use crate::providers::vector_store::RetrievalScope;
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::types::report::{ChatReply, PipelineStatus};

use super::cleanup::strip_code_fences;
use super::prompt;

/// Query pipeline with injected providers
#[derive(Clone)]
pub struct QueryPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    /// Nearest records fetched per query
    top_k: usize,
}

impl QueryPipeline {
    /// Create a pipeline from provider handles
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            llm,
            vector_store,
            top_k,
        }
    }

    /// Answer a question inside the given scope.
    ///
    /// Never returns an error: failures are converted into a reply with
    /// `status == Error`.
    pub async fn answer(&self, question: &str, scope: RetrievalScope) -> ChatReply {
        match self.run(question, scope).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Query failed ({}): {}", scope, e);
                ChatReply::error(e.to_string())
            }
        }
    }

    async fn run(&self, question: &str, scope: RetrievalScope) -> Result<ChatReply> {
        tracing::info!("Question ({}): \"{}\"", scope, question);

        let query_embedding = self.embedder.embed(question).await?;
        let retrieved = self
            .vector_store
            .search(&query_embedding, self.top_k, &scope)
            .await?;

        // Attribution comes from the single highest-ranked record
        let source_document = retrieved.first().map(|r| r.metadata.source.clone());

        let texts: Vec<String> = retrieved.into_iter().map(|r| r.text).collect();
        let context = prompt::build_context(&texts);

        let raw_answer = self.llm.generate(&prompt::chat_prompt(&context, question)).await?;
        let answer = strip_code_fences(&raw_answer);

        tracing::info!(
            "Answered with {} context record(s), source: {:?}",
            texts.len(),
            source_document
        );

        Ok(ChatReply {
            status: PipelineStatus::Success,
            answer: Some(answer),
            source_document,
            message: None,
        })
    }
}

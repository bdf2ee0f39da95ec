//! Embedding provider (injected collaborator, spec §1 — "Embedding model"
//! is explicitly out of scope). Grounded on the teacher's
//! `embeddings/mod.rs::EmbeddingModel` trait shape; the real E5/ONNX
//! model that backed it is dropped along with the rest of `embeddings/`.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Supplies dense vectors for text. The real implementation (a sentence
/// embedding model) lives outside this crate's scope; callers inject
/// whichever implementation they have, defaulting to
/// [`memory::HashingEmbeddingProvider`] for tests and standalone runs.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

//! Vector Index (spec §4.4): injected interface over a dense-vector
//! nearest-neighbor store. Grounded on the teacher's
//! `storage/lance_store.rs::LanceStore` for the operation shape
//! (store/store_batch/search/delete/stats); the real durable/ANN backend
//! is out of scope per spec §1, so [`memory::InMemoryVectorIndex`] is the
//! default reference implementation.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::ChunkId;

#[derive(Debug, Clone, Copy)]
pub struct VectorStats {
    pub count: usize,
    pub dimension: usize,
}

/// One nearest-neighbor hit: the chunk and its similarity score (higher
/// is more similar; cosine similarity for the default backend).
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub chunk_id: ChunkId,
    pub score: f64,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn dimension(&self) -> usize;

    async fn store(&self, chunk_id: ChunkId, vector: Vec<f32>) -> Result<()>;

    async fn store_batch(&self, items: Vec<(ChunkId, Vec<f32>)>) -> Result<()> {
        for (id, vector) in items {
            self.store(id, vector).await?;
        }
        Ok(())
    }

    /// Top-`top_k` nearest neighbors to `query`, optionally filtered to a
    /// minimum similarity `threshold`.
    async fn search(&self, query: &[f32], top_k: usize, threshold: Option<f64>) -> Result<Vec<VectorHit>>;

    async fn delete(&self, chunk_id: &ChunkId) -> Result<bool>;

    async fn delete_batch(&self, chunk_ids: &[ChunkId]) -> Result<u64> {
        let mut deleted = 0u64;
        for id in chunk_ids {
            if self.delete(id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<bool>;

    async fn stats(&self) -> Result<VectorStats>;
}

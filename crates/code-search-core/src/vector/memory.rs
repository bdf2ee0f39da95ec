//! Brute-force cosine-similarity [`VectorIndex`] backed by a
//! `parking_lot::RwLock`-guarded map. Reference default for the injected
//! vector-store interface; fine for the in-process test/demo scale this
//! crate targets, not intended to replace a real ANN store.

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{VectorHit, VectorIndex, VectorStats};
use crate::types::ChunkId;

pub struct InMemoryVectorIndex {
    dimension: usize,
    vectors: RwLock<HashMap<ChunkId, Vec<f32>>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: RwLock::new(HashMap::new()),
        }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            bail!(
                "vector dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            );
        }
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn store(&self, chunk_id: ChunkId, vector: Vec<f32>) -> Result<()> {
        self.check_dimension(&vector)?;
        self.vectors.write().insert(chunk_id, vector);
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize, threshold: Option<f64>) -> Result<Vec<VectorHit>> {
        self.check_dimension(query)?;
        let vectors = self.vectors.read();

        let mut scored: Vec<VectorHit> = vectors
            .iter()
            .map(|(id, v)| VectorHit {
                chunk_id: id.clone(),
                score: cosine_similarity(query, v),
            })
            .filter(|hit| threshold.map_or(true, |t| hit.score >= t))
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete(&self, chunk_id: &ChunkId) -> Result<bool> {
        Ok(self.vectors.write().remove(chunk_id).is_some())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn stats(&self) -> Result<VectorStats> {
        Ok(VectorStats {
            count: self.vectors.read().len(),
            dimension: self.dimension,
        })
    }
}

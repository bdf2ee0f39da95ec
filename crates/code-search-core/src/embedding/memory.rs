//! A deterministic, non-semantic [`EmbeddingProvider`] stand-in. This is a
//! test double, NOT a real embedding model — it hashes tokens into a
//! fixed-size bucket vector so the rest of the pipeline (vector index,
//! hybrid scorer, merger) has something real to exercise without a model
//! dependency. Relevance from this provider's vectors should not be
//! trusted; swap in a real [`EmbeddingProvider`] for production ranking.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::EmbeddingProvider;
use crate::analyzer::CodeAnalyzer;

pub struct HashingEmbeddingProvider {
    dimension: usize,
    analyzer: CodeAnalyzer,
}

impl HashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            analyzer: CodeAnalyzer::default(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in self.analyzer.analyze(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimension;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let provider = HashingEmbeddingProvider::new(64);
        let a = provider.embed("fn getUserName").await.unwrap();
        let b = provider.embed("fn getUserName").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn vector_has_requested_dimension() {
        let provider = HashingEmbeddingProvider::new(128);
        let v = provider.embed("anything").await.unwrap();
        assert_eq!(v.len(), 128);
    }

    #[tokio::test]
    async fn vector_is_unit_normalized_when_nonempty() {
        let provider = HashingEmbeddingProvider::new(64);
        let v = provider.embed("some real text here").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}

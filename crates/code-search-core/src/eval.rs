//! A/B retrieval-evaluation harness. Grounded on the teacher's
//! `rag/eval.rs` (precision/recall/MRR/nDCG computation and aggregation
//! shape), re-targeted at this crate's [`ChunkId`]-keyed results instead
//! of the teacher's RAG-specific `EvalResult`, plus a weight-change
//! recommender the teacher did not have.

use std::collections::HashSet;

use crate::scorer::HybridWeights;
use crate::types::ChunkId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalMetrics {
    pub precision_at_k: f64,
    pub recall_at_k: f64,
    pub mrr: f64,
    pub ndcg_at_k: f64,
}

/// Precision@k: fraction of the top-`k` retrieved results that are relevant.
pub fn precision_at_k(retrieved: &[ChunkId], relevant: &HashSet<ChunkId>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let top_k = &retrieved[..retrieved.len().min(k)];
    if top_k.is_empty() {
        return 0.0;
    }
    let hits = top_k.iter().filter(|id| relevant.contains(id)).count();
    hits as f64 / top_k.len() as f64
}

/// Recall@k: fraction of all relevant chunks found within the top-`k`.
pub fn recall_at_k(retrieved: &[ChunkId], relevant: &HashSet<ChunkId>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let top_k = &retrieved[..retrieved.len().min(k)];
    let hits = top_k.iter().filter(|id| relevant.contains(id)).count();
    hits as f64 / relevant.len() as f64
}

/// Mean Reciprocal Rank: `1 / rank` of the first relevant hit, `0.0` if none.
pub fn mrr(retrieved: &[ChunkId], relevant: &HashSet<ChunkId>) -> f64 {
    retrieved
        .iter()
        .position(|id| relevant.contains(id))
        .map(|pos| 1.0 / (pos as f64 + 1.0))
        .unwrap_or(0.0)
}

/// nDCG@k with binary relevance.
pub fn ndcg_at_k(retrieved: &[ChunkId], relevant: &HashSet<ChunkId>, k: usize) -> f64 {
    let top_k = &retrieved[..retrieved.len().min(k)];
    let dcg: f64 = top_k
        .iter()
        .enumerate()
        .filter(|(_, id)| relevant.contains(*id))
        .map(|(i, _)| 1.0 / ((i as f64 + 2.0).log2()))
        .sum();

    let ideal_hits = relevant.len().min(k);
    let idcg: f64 = (0..ideal_hits).map(|i| 1.0 / ((i as f64 + 2.0).log2())).sum();

    if idcg == 0.0 {
        0.0
    } else {
        dcg / idcg
    }
}

/// Computes the full [`EvalMetrics`] set for one query's retrieved list
/// against its relevance judgments.
pub fn evaluate(retrieved: &[ChunkId], relevant: &HashSet<ChunkId>, k: usize) -> EvalMetrics {
    EvalMetrics {
        precision_at_k: precision_at_k(retrieved, relevant, k),
        recall_at_k: recall_at_k(retrieved, relevant, k),
        mrr: mrr(retrieved, relevant),
        ndcg_at_k: ndcg_at_k(retrieved, relevant, k),
    }
}

/// Averages per-query [`EvalMetrics`] into one aggregate result. Empty
/// input returns all-zero metrics rather than panicking on division by
/// zero.
pub fn aggregate(metrics: &[EvalMetrics]) -> EvalMetrics {
    if metrics.is_empty() {
        return EvalMetrics {
            precision_at_k: 0.0,
            recall_at_k: 0.0,
            mrr: 0.0,
            ndcg_at_k: 0.0,
        };
    }
    let n = metrics.len() as f64;
    EvalMetrics {
        precision_at_k: metrics.iter().map(|m| m.precision_at_k).sum::<f64>() / n,
        recall_at_k: metrics.iter().map(|m| m.recall_at_k).sum::<f64>() / n,
        mrr: metrics.iter().map(|m| m.mrr).sum::<f64>() / n,
        ndcg_at_k: metrics.iter().map(|m| m.ndcg_at_k).sum::<f64>() / n,
    }
}

#[derive(Debug, Clone)]
pub struct WeightRecommendation {
    pub weights: HybridWeights,
    pub mean_precision_at_k: f64,
    pub rationale: String,
}

/// Compares two hybrid-weight configurations' aggregate metrics and
/// recommends whichever scored a higher mean precision@k, breaking ties
/// toward `candidate_a` (the currently-configured weights, by convention).
pub fn recommend_weights(
    weights_a: HybridWeights,
    metrics_a: &[EvalMetrics],
    weights_b: HybridWeights,
    metrics_b: &[EvalMetrics],
) -> WeightRecommendation {
    let agg_a = aggregate(metrics_a);
    let agg_b = aggregate(metrics_b);

    if agg_b.precision_at_k > agg_a.precision_at_k {
        WeightRecommendation {
            weights: weights_b,
            mean_precision_at_k: agg_b.precision_at_k,
            rationale: format!(
                "candidate weights (keyword={:.2}, vector={:.2}) scored {:.3} precision@k vs {:.3} for the current weights",
                weights_b.keyword(),
                weights_b.vector(),
                agg_b.precision_at_k,
                agg_a.precision_at_k
            ),
        }
    } else {
        WeightRecommendation {
            weights: weights_a,
            mean_precision_at_k: agg_a.precision_at_k,
            rationale: format!(
                "current weights (keyword={:.2}, vector={:.2}) scored {:.3} precision@k, at least as good as the candidate's {:.3}",
                weights_a.keyword(),
                weights_a.vector(),
                agg_a.precision_at_k,
                agg_b.precision_at_k
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<ChunkId> {
        names.iter().map(|n| ChunkId::new("f.rs", n, 1, 2)).collect()
    }

    fn relevant_set(names: &[&str]) -> HashSet<ChunkId> {
        ids(names).into_iter().collect()
    }

    #[test]
    fn precision_counts_hits_in_top_k() {
        let retrieved = ids(&["a", "b", "c", "d"]);
        let relevant = relevant_set(&["a", "c"]);
        assert!((precision_at_k(&retrieved, &relevant, 4) - 0.5).abs() < 1e-9);
        assert!((precision_at_k(&retrieved, &relevant, 2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recall_divides_by_total_relevant() {
        let retrieved = ids(&["a", "b"]);
        let relevant = relevant_set(&["a", "c"]);
        assert!((recall_at_k(&retrieved, &relevant, 2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn mrr_finds_first_relevant_rank() {
        let retrieved = ids(&["a", "b", "c"]);
        let relevant = relevant_set(&["b"]);
        assert!((mrr(&retrieved, &relevant) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn mrr_zero_when_no_relevant_found() {
        let retrieved = ids(&["a", "b"]);
        let relevant = relevant_set(&["z"]);
        assert_eq!(mrr(&retrieved, &relevant), 0.0);
    }

    #[test]
    fn ndcg_perfect_ranking_is_one() {
        let retrieved = ids(&["a", "b"]);
        let relevant = relevant_set(&["a", "b"]);
        assert!((ndcg_at_k(&retrieved, &relevant, 2) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_of_empty_is_zero() {
        let agg = aggregate(&[]);
        assert_eq!(agg.precision_at_k, 0.0);
    }

    #[test]
    fn recommend_prefers_higher_precision() {
        let a = HybridWeights::new(0.6, 0.4).unwrap();
        let b = HybridWeights::new(0.3, 0.7).unwrap();
        let metrics_a = [EvalMetrics { precision_at_k: 0.4, recall_at_k: 0.0, mrr: 0.0, ndcg_at_k: 0.0 }];
        let metrics_b = [EvalMetrics { precision_at_k: 0.7, recall_at_k: 0.0, mrr: 0.0, ndcg_at_k: 0.0 }];
        let rec = recommend_weights(a, &metrics_a, b, &metrics_b);
        assert_eq!(rec.weights.vector(), 0.7);
    }
}

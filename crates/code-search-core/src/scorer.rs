//! Hybrid Scorer (spec §4.6): combines a normalized keyword score and a
//! normalized vector score via a validated linear blend. Grounded on the
//! teacher's `search/hybrid.rs::weighted_fusion` alpha-blend, generalized
//! into a validated two-weight struct.

use crate::error::SearchError;

/// Validated weight pair for hybrid combination. `keyword + vector` must
/// sum to `1.0` (within tolerance) and each weight must sit in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    keyword: f32,
    vector: f32,
}

const WEIGHT_TOLERANCE: f32 = 1e-6;

impl HybridWeights {
    pub fn new(keyword: f32, vector: f32) -> Result<Self, SearchError> {
        if !(0.0..=1.0).contains(&keyword) || !(0.0..=1.0).contains(&vector) {
            return Err(SearchError::InvariantViolation(
                "hybrid weights must each be in [0, 1]".into(),
            ));
        }
        if (keyword + vector - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(SearchError::InvariantViolation(format!(
                "hybrid weights must sum to 1.0 (got {})",
                keyword + vector
            )));
        }
        Ok(Self { keyword, vector })
    }

    pub fn keyword(&self) -> f32 {
        self.keyword
    }

    pub fn vector(&self) -> f32 {
        self.vector
    }
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            keyword: 0.6,
            vector: 0.4,
        }
    }
}

/// Combines already-normalized keyword/vector scores under a fixed
/// [`HybridWeights`] pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridScorer {
    weights: HybridWeights,
}

impl HybridScorer {
    pub fn new(weights: HybridWeights) -> Self {
        Self { weights }
    }

    /// `keyword_score * w_keyword + vector_score * w_vector`. Both inputs
    /// are expected to already be normalized to `[0, 1]`; a missing source
    /// is passed as `0.0` by the caller (the Result Merger does this).
    pub fn combine(&self, keyword_score: f32, vector_score: f32) -> f32 {
        keyword_score * self.weights.keyword() + vector_score * self.weights.vector()
    }

    pub fn weights(&self) -> HybridWeights {
        self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = HybridWeights::default();
        assert!((w.keyword() + w.vector() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_sum() {
        assert!(HybridWeights::new(0.7, 0.7).is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(HybridWeights::new(-0.1, 1.1).is_err());
    }

    #[test]
    fn combine_keyword_only() {
        let scorer = HybridScorer::default();
        assert!((scorer.combine(1.0, 0.0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn combine_vector_only() {
        let scorer = HybridScorer::default();
        assert!((scorer.combine(0.0, 1.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn combine_even_split() {
        let scorer = HybridScorer::default();
        assert!((scorer.combine(0.5, 0.5) - 0.5).abs() < 1e-6);
    }
}

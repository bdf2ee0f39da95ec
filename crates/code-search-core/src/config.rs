//! Process configuration (spec §6): field boosts, hybrid weights, facet
//! limit, transitive-depth defaults, and the embedding dimension. Loaded
//! once at startup, validated, immutable for the process lifetime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::SearchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub boosts: BoostConfig,
    pub hybrid: HybridConfig,
    pub facet_limit: usize,
    pub transitive: TransitiveConfig,
    pub embedding: EmbeddingDimConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostConfig {
    pub entity_name: f32,
    pub entity_name_keyword: f32,
    pub doc_summary: f32,
    pub content: f32,
    pub language: f32,
    pub entity_type: f32,
    pub repository: f32,
}

impl BoostConfig {
    /// Field → boost mapping used by the query parser's default fanout.
    pub fn as_map(&self) -> HashMap<&'static str, f32> {
        HashMap::from([
            ("entity_name", self.entity_name),
            ("entity_name_keyword", self.entity_name_keyword),
            ("doc_summary", self.doc_summary),
            ("content", self.content),
            ("language", self.language),
            ("entity_type", self.entity_type),
            ("repository", self.repository),
        ])
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            entity_name: 3.0,
            entity_name_keyword: 3.0,
            doc_summary: 2.0,
            content: 1.0,
            language: 1.0,
            entity_type: 1.0,
            repository: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HybridConfig {
    pub keyword_weight: f32,
    pub vector_weight: f32,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            keyword_weight: 0.6,
            vector_weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitiveConfig {
    pub default_depth: usize,
    pub max_depth: usize,
}

impl Default for TransitiveConfig {
    fn default() -> Self {
        Self {
            default_depth: 5,
            max_depth: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmbeddingDimConfig {
    pub dimension: usize,
}

impl Default for EmbeddingDimConfig {
    fn default() -> Self {
        Self { dimension: 384 }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            boosts: BoostConfig::default(),
            hybrid: HybridConfig::default(),
            facet_limit: 10,
            transitive: TransitiveConfig::default(),
            embedding: EmbeddingDimConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Validate config values, returning errors for clearly broken
    /// configurations. Called once at startup; a failure here is fatal
    /// (spec §7 `InvariantViolation`).
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.embedding.dimension == 0 {
            return Err(SearchError::InvariantViolation(
                "embedding.dimension must be > 0".into(),
            ));
        }
        let sum = self.hybrid.keyword_weight + self.hybrid.vector_weight;
        if !(0.0..=1.0).contains(&self.hybrid.keyword_weight)
            || !(0.0..=1.0).contains(&self.hybrid.vector_weight)
            || (sum - 1.0).abs() > 1e-6
        {
            return Err(SearchError::InvariantViolation(format!(
                "hybrid.keyword_weight + hybrid.vector_weight must sum to 1.0 (got {sum})"
            )));
        }
        if self.transitive.max_depth == 0 || self.transitive.max_depth > 10 {
            return Err(SearchError::InvariantViolation(
                "transitive.max_depth must be in [1, 10]".into(),
            ));
        }
        if self.transitive.default_depth == 0
            || self.transitive.default_depth > self.transitive.max_depth
        {
            return Err(SearchError::InvariantViolation(
                "transitive.default_depth must be in [1, transitive.max_depth]".into(),
            ));
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing
    /// fields that implement `Default` via `#[serde(default)]` in callers'
    /// own config overlays; this loader itself requires all fields present.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Validation(format!("failed to read config file: {e}")))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| SearchError::Validation(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SearchConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_weight_sum() {
        let mut cfg = SearchConfig::default();
        cfg.hybrid.keyword_weight = 0.9;
        cfg.hybrid.vector_weight = 0.9;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_dimension() {
        let mut cfg = SearchConfig::default();
        cfg.embedding.dimension = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_depth() {
        let mut cfg = SearchConfig::default();
        cfg.transitive.max_depth = 11;
        assert!(cfg.validate().is_err());
        cfg.transitive.max_depth = 10;
        cfg.transitive.default_depth = 11;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn weight_sum_tolerance() {
        let mut cfg = SearchConfig::default();
        cfg.hybrid.keyword_weight = 0.6000001;
        cfg.hybrid.vector_weight = 0.4;
        cfg.validate().unwrap();
    }
}

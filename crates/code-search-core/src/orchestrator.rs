//! Search Orchestrator (spec §4.10): the single entry point that
//! dispatches a request to the keyword and/or vector backends, normalizes
//! and merges their scores, computes facets, and — for structural
//! queries — augments results with a transitive graph path. Grounded on
//! the teacher's `rag_engine.rs::RAGEngine::search_single_query`
//! (candidate sizing, concurrent keyword+vector dispatch, fusion) and
//! `search_comprehensive` (public entry point shape); the transitive-path
//! augmentation step has no teacher counterpart.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{SearchError, SearchResult};
use crate::graph::GraphQueryService;
use crate::keyword::KeywordIndex;
use crate::merger::{self, MergedResult};
use crate::normalize::{normalize_scores_f32, normalize_scores_f64};
use crate::query;
use crate::scorer::{HybridScorer, HybridWeights};
use crate::types::SearchFilters;
use crate::vector::VectorIndex;

const FACET_FIELDS: &[&str] = &["language", "entity_type", "repository"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Hybrid,
    Keyword,
    Vector,
}

impl SearchMode {
    /// `None`/blank → [`SearchMode::Hybrid`] (spec §4.10). An unrecognized
    /// non-empty string is a validation error, not a silent fallback.
    pub fn parse(raw: Option<&str>) -> SearchResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(SearchMode::Hybrid),
            Some(s) => match s.to_lowercase().as_str() {
                "hybrid" => Ok(SearchMode::Hybrid),
                "keyword" => Ok(SearchMode::Keyword),
                "vector" => Ok(SearchMode::Vector),
                other => Err(SearchError::Validation(format!("unknown search mode: {other}"))),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub filters: SearchFilters,
    pub mode: SearchMode,
    pub limit: usize,
    pub offset: usize,
    pub transitive: bool,
    pub depth: Option<usize>,
}

impl SearchRequest {
    pub fn validate(&self, max_depth: usize) -> SearchResult<()> {
        if let Some(depth) = self.depth {
            if depth == 0 || depth > max_depth {
                return Err(SearchError::Validation(format!(
                    "depth must be between 1 and {max_depth}"
                )));
            }
        }
        if self.limit == 0 {
            return Err(SearchError::Validation("limit must be greater than 0".into()));
        }
        Ok(())
    }
}

pub struct OrchestratorResult {
    pub merged_results: Vec<MergedResult>,
    pub facets: HashMap<String, Vec<(String, u64)>>,
}

pub struct SearchOrchestrator {
    keyword: KeywordIndex,
    vector: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    graph: GraphQueryService,
    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(
        keyword: KeywordIndex,
        vector: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        graph: GraphQueryService,
        config: SearchConfig,
    ) -> Self {
        Self {
            keyword,
            vector,
            embedder,
            graph,
            config,
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> SearchResult<OrchestratorResult> {
        request.validate(self.config.transitive.max_depth)?;

        let node = query::parse_query(&request.query);
        let fetch_count = request.limit + request.offset;

        let (keyword_hits, vector_hits) = match request.mode {
            SearchMode::Hybrid => {
                let (k, v) = tokio::join!(
                    self.run_keyword(&node, &request.filters, fetch_count, 0),
                    self.run_vector(&request.query, fetch_count)
                );
                match (k, v) {
                    (Ok(k), Ok(v)) => (k, v),
                    (Ok(k), Err(e)) => {
                        tracing::warn!(error = %e, "vector backend failed in hybrid search, degrading to keyword-only");
                        (k, Vec::new())
                    }
                    (Err(e), Ok(v)) => {
                        tracing::warn!(error = %e, "keyword backend failed in hybrid search, degrading to vector-only");
                        (Vec::new(), v)
                    }
                    (Err(ek), Err(ev)) => {
                        return Err(SearchError::BackendUnavailable(format!(
                            "both keyword ({ek}) and vector ({ev}) backends failed"
                        )));
                    }
                }
            }
            SearchMode::Keyword => (self.run_keyword(&node, &request.filters, fetch_count, 0).await?, Vec::new()),
            SearchMode::Vector => {
                let hits = self.run_vector(&request.query, fetch_count).await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "vector search failed, returning empty results");
                    Vec::new()
                });
                (Vec::new(), hits)
            }
        };

        let keyword_scores: Vec<f32> = keyword_hits.iter().map(|(_, s)| *s).collect();
        let normalized_keyword: Vec<f32> = normalize_scores_f32(&keyword_scores);
        let keyword_normalized: Vec<_> = keyword_hits
            .into_iter()
            .zip(normalized_keyword)
            .map(|((doc, _), norm)| (doc, norm))
            .collect();

        let vector_scores: Vec<f64> = vector_hits.iter().map(|h| h.score).collect();
        let normalized_vector_scores = normalize_scores_f64(&vector_scores);
        let vector_normalized: Vec<_> = vector_hits
            .into_iter()
            .zip(normalized_vector_scores)
            .map(|(mut hit, norm)| {
                hit.score = norm;
                hit
            })
            .collect();

        let weights = HybridWeights::new(self.config.hybrid.keyword_weight, self.config.hybrid.vector_weight)?;
        let scorer = HybridScorer::new(weights);
        let mut merged = merger::merge(&keyword_normalized, &vector_normalized, &scorer);

        if request.transitive {
            match self.graph.query(&request.query, request.depth).await {
                Ok(Some(hits)) if !hits.is_empty() => {
                    let names: Vec<String> = hits.iter().map(|h| h.entity_name.clone()).collect();
                    match self.keyword.lookup_by_entity_names(&names, fetch_count, &request.filters).await {
                        Ok(resolved) => {
                            let transitive = merger::merge_transitive(&resolved, &hits, &scorer);
                            merged.extend(transitive);
                            merged.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap());
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "entity-name keyword lookup failed, skipping transitive augmentation");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "graph lookup failed, skipping transitive augmentation");
                }
            }
        }

        if merged.len() > request.offset {
            merged.drain(..request.offset);
        } else {
            merged.clear();
        }
        merged.truncate(request.limit);

        let facets = self.compute_facets().await?;

        Ok(OrchestratorResult {
            merged_results: merged,
            facets,
        })
    }

    async fn run_keyword(
        &self,
        node: &query::QueryNode,
        filters: &SearchFilters,
        limit: usize,
        offset: usize,
    ) -> SearchResult<Vec<(crate::types::Document, f32)>> {
        self.keyword
            .search_with_scores(node, filters, &self.config.boosts, limit.max(1), offset)
            .await
            .map_err(|e| SearchError::BackendUnavailable(e.to_string()))
    }

    async fn run_vector(&self, query_text: &str, limit: usize) -> SearchResult<Vec<crate::vector::VectorHit>> {
        let embedding = self
            .embedder
            .embed(query_text)
            .await
            .map_err(|e| SearchError::BackendUnavailable(e.to_string()))?;
        self.vector
            .search(&embedding, limit.max(1), None)
            .await
            .map_err(|e| SearchError::BackendUnavailable(e.to_string()))
    }

    async fn compute_facets(&self) -> SearchResult<HashMap<String, Vec<(String, u64)>>> {
        let mut facets = HashMap::new();
        for field in FACET_FIELDS {
            let values = self
                .keyword
                .compute_facets(field, self.config.facet_limit)
                .await
                .map_err(|e| SearchError::BackendUnavailable(e.to_string()))?;
            facets.insert(field.to_string(), values);
        }
        Ok(facets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::memory::HashingEmbeddingProvider;
    use crate::graph::memory::InMemoryGraphStore;
    use crate::types::{ChunkId, TextChunk};
    use crate::vector::{VectorHit, VectorIndex, VectorStats};
    use std::collections::HashMap as Map;

    struct FailingVectorIndex;

    #[async_trait::async_trait]
    impl VectorIndex for FailingVectorIndex {
        fn dimension(&self) -> usize {
            8
        }
        async fn store(&self, _chunk_id: ChunkId, _vector: Vec<f32>) -> anyhow::Result<()> {
            Ok(())
        }
        async fn search(&self, _query: &[f32], _top_k: usize, _threshold: Option<f64>) -> anyhow::Result<Vec<VectorHit>> {
            Err(anyhow::anyhow!("vector backend unreachable"))
        }
        async fn delete(&self, _chunk_id: &ChunkId) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn health_check(&self) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn stats(&self) -> anyhow::Result<VectorStats> {
            Ok(VectorStats { count: 0, dimension: 8 })
        }
    }

    async fn orchestrator_with_failing_vector() -> SearchOrchestrator {
        let dir = tempfile::tempdir().unwrap();
        let keyword = KeywordIndex::open_or_create(dir.path()).unwrap();
        keyword
            .add_chunks(&[TextChunk {
                content: "fn foo()".into(),
                language: "rust".into(),
                entity_type: "function".into(),
                entity_name: "foo".into(),
                file_path: "src/foo.rs".into(),
                start_line: 1,
                end_line: 1,
                start_byte: 0,
                end_byte: 10,
                attributes: Map::new(),
            }])
            .await
            .unwrap();

        let vector: Arc<dyn VectorIndex> = Arc::new(FailingVectorIndex);
        let embedder = Arc::new(HashingEmbeddingProvider::new(8));
        let graph_store: Arc<dyn crate::graph::GraphStore> = Arc::new(InMemoryGraphStore::default());
        let graph = GraphQueryService::new(graph_store, 5);

        SearchOrchestrator::new(keyword, vector, embedder, graph, SearchConfig::default())
    }

    fn plain_request(mode: SearchMode) -> SearchRequest {
        SearchRequest {
            query: "foo".into(),
            filters: SearchFilters::default(),
            mode,
            limit: 10,
            offset: 0,
            transitive: false,
            depth: None,
        }
    }

    #[tokio::test]
    async fn hybrid_degrades_to_keyword_only_when_vector_backend_fails() {
        let orchestrator = orchestrator_with_failing_vector().await;
        let result = orchestrator.search(&plain_request(SearchMode::Hybrid)).await.unwrap();
        assert!(!result.merged_results.is_empty());
        assert!(result.merged_results.iter().all(|r| !r.from_both_sources));
    }

    #[tokio::test]
    async fn vector_mode_yields_empty_results_without_error_on_backend_failure() {
        let orchestrator = orchestrator_with_failing_vector().await;
        let result = orchestrator.search(&plain_request(SearchMode::Vector)).await.unwrap();
        assert!(result.merged_results.is_empty());
    }

    #[test]
    fn blank_mode_defaults_to_hybrid() {
        assert_eq!(SearchMode::parse(None).unwrap(), SearchMode::Hybrid);
        assert_eq!(SearchMode::parse(Some("")).unwrap(), SearchMode::Hybrid);
    }

    #[test]
    fn unknown_mode_is_validation_error() {
        assert!(SearchMode::parse(Some("bogus")).is_err());
    }

    #[test]
    fn depth_out_of_range_rejected() {
        let request = SearchRequest {
            query: "foo".into(),
            filters: SearchFilters::default(),
            mode: SearchMode::Hybrid,
            limit: 10,
            offset: 0,
            transitive: true,
            depth: Some(20),
        };
        assert!(request.validate(10).is_err());
    }

    #[test]
    fn zero_limit_rejected() {
        let request = SearchRequest {
            query: "foo".into(),
            filters: SearchFilters::default(),
            mode: SearchMode::Hybrid,
            limit: 0,
            offset: 0,
            transitive: false,
            depth: None,
        };
        assert!(request.validate(10).is_err());
    }
}

//! Graph Query Service (spec §4.9): resolves `implements`/`extends`
//! structural queries into transitive closures over a directed type graph.
//! Grounded on the teacher's `graph/knowledge_graph.rs::KnowledgeGraph` —
//! BFS with a depth cutoff over a `petgraph::DiGraph` and a name→node
//! index — generalized from undirected "related doc_ids" to directed,
//! edge-typed closures that carry the full relationship path.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SearchError;
use crate::query::structural;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Implements,
    Extends,
}

/// One entity reached by a transitive closure, with the path of entity
/// names from the closure's target back to it.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphHit {
    pub entity_name: String,
    pub relationship_path: Vec<String>,
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn add_edge(&self, from: &str, to: &str, kind: EdgeKind) -> Result<()>;

    /// All entities that reach `target` via `kind` edges, within `depth`
    /// hops (BFS, depth clamped to `[1, 10]` by callers per spec §4.9).
    async fn transitive_closure(&self, target: &str, kind: EdgeKind, depth: usize) -> Result<Vec<GraphHit>>;

    async fn node_count(&self) -> Result<usize>;
}

pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 10;

fn clamp_depth(depth: usize) -> usize {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

/// Dispatches raw structural query text to a [`GraphStore`] by first
/// recognizing its `implements:`/`extends:` form via
/// [`structural::parse_implements_target`] / [`structural::parse_extends_target`].
#[derive(Clone)]
pub struct GraphQueryService {
    store: Arc<dyn GraphStore>,
    default_depth: usize,
}

impl GraphQueryService {
    pub fn new(store: Arc<dyn GraphStore>, default_depth: usize) -> Self {
        Self {
            store,
            default_depth: clamp_depth(default_depth),
        }
    }

    /// `None` if `query` is not a recognized structural query — callers
    /// should fall back to keyword/hybrid search in that case rather than
    /// treating it as an error.
    pub async fn query(&self, query: &str, depth: Option<usize>) -> Result<Option<Vec<GraphHit>>, SearchError> {
        let depth = clamp_depth(depth.unwrap_or(self.default_depth));

        if let Some(target) = structural::parse_implements_target(query) {
            let hits = self
                .store
                .transitive_closure(&target, EdgeKind::Implements, depth)
                .await
                .map_err(|e| SearchError::BackendUnavailable(e.to_string()))?;
            return Ok(Some(hits));
        }

        if let Some(target) = structural::parse_extends_target(query) {
            let hits = self
                .store
                .transitive_closure(&target, EdgeKind::Extends, depth)
                .await
                .map_err(|e| SearchError::BackendUnavailable(e.to_string()))?;
            return Ok(Some(hits));
        }

        Ok(None)
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_clamped_to_valid_range() {
        assert_eq!(clamp_depth(0), 1);
        assert_eq!(clamp_depth(50), 10);
        assert_eq!(clamp_depth(5), 5);
    }
}

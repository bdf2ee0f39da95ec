//! `petgraph`-backed [`GraphStore`] default. Edges point from subtype to
//! supertype (`Foo implements Bar` → edge `Foo -> Bar`); a transitive
//! closure on `Bar` walks edges in reverse to find every (transitive)
//! subtype.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};

use super::{EdgeKind, GraphHit, GraphStore};

struct Inner {
    graph: DiGraph<String, EdgeKind>,
    name_to_node: HashMap<String, NodeIndex>,
}

pub struct InMemoryGraphStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                graph: DiGraph::new(),
                name_to_node: HashMap::new(),
            }),
        }
    }
}

impl Inner {
    fn node_for(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.name_to_node.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.name_to_node.insert(name.to_string(), idx);
        idx
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn add_edge(&self, from: &str, to: &str, kind: EdgeKind) -> Result<()> {
        let mut inner = self.inner.write();
        let from_idx = inner.node_for(from);
        let to_idx = inner.node_for(to);
        inner.graph.add_edge(from_idx, to_idx, kind);
        Ok(())
    }

    async fn transitive_closure(&self, target: &str, kind: EdgeKind, depth: usize) -> Result<Vec<GraphHit>> {
        let inner = self.inner.read();
        let Some(&start) = inner.name_to_node.get(target) else {
            return Ok(Vec::new());
        };

        let mut visited = HashMap::new();
        visited.insert(start, vec![target.to_string()]);
        let mut queue = VecDeque::new();
        queue.push_back((start, 0usize));

        let mut hits = Vec::new();

        while let Some((node, dist)) = queue.pop_front() {
            if dist >= depth {
                continue;
            }
            for edge in inner.graph.edges_directed(node, Direction::Incoming) {
                if *edge.weight() != kind {
                    continue;
                }
                let neighbor = edge.source();
                if visited.contains_key(&neighbor) {
                    continue;
                }
                let mut path = visited[&node].clone();
                path.push(inner.graph[neighbor].clone());
                visited.insert(neighbor, path.clone());

                hits.push(GraphHit {
                    entity_name: inner.graph[neighbor].clone(),
                    relationship_path: path,
                });
                queue.push_back((neighbor, dist + 1));
            }
        }

        Ok(hits)
    }

    async fn node_count(&self) -> Result<usize> {
        Ok(self.inner.read().graph.node_count())
    }
}

//! Result Merger (spec §4.7): deduplicates keyword and vector hits that
//! refer to the same [`ChunkId`], combines their normalized scores, and
//! produces a stable-ordered result list. Grounded on the teacher's
//! `search/hybrid.rs` `HashMap<String, (f32, HybridSource)>` accumulator
//! pattern (present in all three of its fusion functions), generalized to
//! carry full keyword/vector payloads plus an optional transitive path.

use std::collections::HashMap;

use crate::graph::GraphHit;
use crate::scorer::HybridScorer;
use crate::types::{ChunkId, Document};
use crate::vector::VectorHit;

/// One merged, de-duplicated search result.
#[derive(Debug, Clone)]
pub struct MergedResult {
    pub chunk_id: ChunkId,
    pub document: Option<Document>,
    pub vector_score: Option<f64>,
    pub combined_score: f32,
    pub from_both_sources: bool,
    pub transitive_path: Option<Vec<String>>,
}

struct Accumulator {
    chunk_id: ChunkId,
    document: Option<Document>,
    keyword_score: Option<f32>,
    vector_score: Option<f64>,
    transitive_path: Option<Vec<String>>,
    first_seen: usize,
}

/// Merges normalized keyword hits `(Document, f32)` and normalized vector
/// hits `(VectorHit with f64 score)` into a single ranked list. Scores
/// passed in MUST already be normalized (spec §4.5) — this stage only
/// combines and dedups, it does not normalize.
pub fn merge(
    keyword_hits: &[(Document, f32)],
    vector_hits: &[VectorHit],
    scorer: &HybridScorer,
) -> Vec<MergedResult> {
    let mut order = HashMap::new();
    let mut acc: HashMap<ChunkId, Accumulator> = HashMap::new();
    let mut next_order = 0usize;

    for (doc, score) in keyword_hits {
        let chunk_id = doc.chunk_id();
        let entry = acc.entry(chunk_id.clone()).or_insert_with(|| {
            let idx = next_order;
            next_order += 1;
            order.insert(chunk_id.clone(), idx);
            Accumulator {
                chunk_id: chunk_id.clone(),
                document: None,
                keyword_score: None,
                vector_score: None,
                transitive_path: None,
                first_seen: idx,
            }
        });
        entry.document = Some(doc.clone());
        entry.keyword_score = Some(*score);
    }

    for hit in vector_hits {
        let chunk_id = hit.chunk_id.clone();
        let entry = acc.entry(chunk_id.clone()).or_insert_with(|| {
            let idx = next_order;
            next_order += 1;
            order.insert(chunk_id.clone(), idx);
            Accumulator {
                chunk_id: chunk_id.clone(),
                document: None,
                keyword_score: None,
                vector_score: None,
                transitive_path: None,
                first_seen: idx,
            }
        });
        entry.vector_score = Some(hit.score);
    }

    let mut results: Vec<MergedResult> = acc
        .into_values()
        .map(|entry| {
            let keyword = entry.keyword_score.unwrap_or(0.0);
            let vector = entry.vector_score.unwrap_or(0.0) as f32;
            MergedResult {
                chunk_id: entry.chunk_id,
                document: entry.document,
                vector_score: entry.vector_score,
                combined_score: scorer.combine(keyword, vector),
                from_both_sources: entry.keyword_score.is_some() && entry.vector_score.is_some(),
                transitive_path: entry.transitive_path,
            }
        })
        .collect();

    // Stable sort: descending score, first-seen order breaks ties.
    let first_seen: HashMap<ChunkId, usize> = order;
    results.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap()
            .then_with(|| first_seen[&a.chunk_id].cmp(&first_seen[&b.chunk_id]))
    });

    results
}

/// Build new `MergedResult`s for a transitive graph closure (spec §4.10
/// step 5b-5c): `resolved` are the [`Document`]s the keyword index returned
/// for the graph hits' entity names (via `lookup_by_entity_names`) — these
/// go through a keyword-only call to [`merge`] (no vector hits), then each
/// resulting entry is tagged with the relationship path of the `GraphHit`
/// it came from. Direct (non-graph) `base_results` are never touched here;
/// per spec they keep `transitive_path = None` even if a hit happens to
/// share their entity name — the caller concatenates this function's
/// output with `base_results` and re-sorts.
pub fn merge_transitive(resolved: &[Document], hits: &[GraphHit], scorer: &HybridScorer) -> Vec<MergedResult> {
    let by_name: HashMap<&str, &GraphHit> = hits.iter().map(|h| (h.entity_name.as_str(), h)).collect();

    // Every resolved document is an exact entity-name match, not a ranked
    // hit — a uniform raw score normalizes to 1.0 for all of them (spec §4.5).
    let scored: Vec<(Document, f32)> = resolved.iter().cloned().map(|d| (d, 1.0)).collect();
    let mut merged = merge(&scored, &[], scorer);

    for result in merged.iter_mut() {
        if let Some(doc) = &result.document {
            if let Some(hit) = by_name.get(doc.entity_name.as_str()) {
                result.transitive_path = Some(hit.relationship_path.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::HybridWeights;
    use std::collections::HashMap as Map;

    fn doc(entity_name: &str) -> Document {
        Document {
            document_id: format!("f1.java:{entity_name}:10:20"),
            content: "content".into(),
            language: "java".into(),
            entity_type: "class".into(),
            entity_name: entity_name.into(),
            file_path: "f1.java".into(),
            repository: "unknown".into(),
            start_line: 10,
            end_line: 20,
            start_byte: 0,
            end_byte: 0,
            doc_summary: None,
            meta: Map::new(),
        }
    }

    #[test]
    fn dedup_and_combine_from_both_sources() {
        let scorer = HybridScorer::new(HybridWeights::default());
        let keyword_hits = vec![(doc("C1"), 0.8_f32)];
        let vector_hits = vec![VectorHit {
            chunk_id: ChunkId::new("f1.java", "C1", 10, 20),
            score: 0.9,
        }];

        let merged = merge(&keyword_hits, &vector_hits, &scorer);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].from_both_sources);
        assert!((merged[0].combined_score - 0.84).abs() < 1e-3);
    }

    #[test]
    fn keyword_only_hit_not_marked_both_sources() {
        let scorer = HybridScorer::new(HybridWeights::default());
        let merged = merge(&[(doc("Solo"), 0.5)], &[], &scorer);
        assert_eq!(merged.len(), 1);
        assert!(!merged[0].from_both_sources);
    }

    #[test]
    fn sorted_descending_with_stable_tie_break() {
        let scorer = HybridScorer::new(HybridWeights::default());
        let keyword_hits = vec![(doc("First"), 0.5), (doc("Second"), 0.5)];
        let merged = merge(&keyword_hits, &[], &scorer);
        assert_eq!(merged[0].chunk_id.as_str(), "f1.java:First:10:20");
        assert_eq!(merged[1].chunk_id.as_str(), "f1.java:Second:10:20");
    }

    #[test]
    fn merge_transitive_tags_resolved_documents() {
        let scorer = HybridScorer::new(HybridWeights::default());
        let hits = vec![GraphHit {
            entity_name: "Dog".into(),
            relationship_path: vec!["Animal".into(), "Dog".into()],
        }];
        let merged = merge_transitive(&[doc("Dog")], &hits, &scorer);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].transitive_path,
            Some(vec!["Animal".to_string(), "Dog".to_string()])
        );
    }

    #[test]
    fn merge_transitive_surfaces_entities_absent_from_base_results() {
        // The typical case per spec §8 scenario 6: the transitively-reached
        // entity was never in the base keyword/vector hits at all.
        let scorer = HybridScorer::new(HybridWeights::default());
        let base_results = merge(&[(doc("IRepository"), 0.9)], &[], &scorer);
        let hits = vec![GraphHit {
            entity_name: "ConcreteRepo".into(),
            relationship_path: vec!["IRepository".into(), "ConcreteRepo".into()],
        }];
        let transitive = merge_transitive(&[doc("ConcreteRepo")], &hits, &scorer);

        let mut combined = base_results;
        combined.extend(transitive);
        assert_eq!(combined.len(), 2);
        assert!(combined.iter().any(|r| r.document.as_ref().unwrap().entity_name == "ConcreteRepo"
            && r.transitive_path.is_some()));
        assert!(combined.iter().any(|r| r.document.as_ref().unwrap().entity_name == "IRepository"
            && r.transitive_path.is_none()));
    }
}

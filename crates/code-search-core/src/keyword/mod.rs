//! Keyword Index (spec §4.3): a tantivy-backed inverted index over
//! [`TextChunk`]s. Grounded on the teacher's `search/text_search.rs`
//! (`TextSearch`) — writer behind a lock, `ReloadPolicy::OnCommitWithDelay`,
//! delete-by-term, segment-reader iteration for field-value bulk
//! operations — generalized to the full spec §3 field schema and to
//! boosted multi-field query execution.

pub mod schema;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tantivy::collector::TopDocs;
use tantivy::query::{AllQuery, BooleanQuery, BoostQuery, Occur, PhraseQuery, Query, RegexQuery, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Term, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use crate::analyzer::CodeAnalyzer;
use crate::config::BoostConfig;
use crate::query::QueryNode;
use crate::types::{sanitize_attr_key, ChunkId, Document, SearchFilters, TextChunk};

use schema::KeywordSchema;

const WRITER_HEAP_BYTES: usize = 64 * 1024 * 1024;

pub struct IndexStats {
    pub num_docs: u64,
    pub num_segments: usize,
}

struct Inner {
    index: Index,
    schema: KeywordSchema,
    writer: Mutex<IndexWriter>,
    reader: IndexReader,
    analyzer: CodeAnalyzer,
}

/// Handle to a tantivy-backed keyword index. Cheaply cloneable; all
/// mutation goes through the single writer behind `Inner::writer`.
#[derive(Clone)]
pub struct KeywordIndex {
    inner: Arc<Inner>,
}

impl KeywordIndex {
    pub fn open_or_create(path: &Path) -> Result<Self> {
        let schema = KeywordSchema::build();
        std::fs::create_dir_all(path).context("creating keyword index directory")?;
        let dir = tantivy::directory::MmapDirectory::open(path).context("opening index directory")?;
        let index = Index::open_or_create(dir, schema.schema.clone())
            .context("opening or creating tantivy index")?;
        let writer = index
            .writer(WRITER_HEAP_BYTES)
            .context("constructing index writer")?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .context("constructing index reader")?;

        Ok(Self {
            inner: Arc::new(Inner {
                index,
                schema,
                writer: Mutex::new(writer),
                reader,
                analyzer: CodeAnalyzer::default(),
            }),
        })
    }

    /// Buffered write + commit (spec §4.3).
    pub async fn add_chunks(&self, chunks: &[TextChunk]) -> Result<usize> {
        let this = self.clone();
        let chunks = chunks.to_vec();
        tokio::task::spawn_blocking(move || {
            let count = chunks.len();
            for chunk in &chunks {
                this.index_chunk_blocking(chunk)?;
            }
            this.commit_blocking()?;
            Ok::<_, anyhow::Error>(count)
        })
        .await?
    }

    /// `add_chunks`, chunked into groups of `batch_size` so the writer
    /// commits (and releases its in-memory buffer) after each group rather
    /// than holding the whole input in the writer's segment buffer at once.
    pub async fn add_chunks_batch(&self, chunks: &[TextChunk], batch_size: usize) -> Result<usize> {
        let batch_size = batch_size.max(1);
        let mut total = 0;
        for batch in chunks.chunks(batch_size) {
            total += self.add_chunks(batch).await?;
        }
        Ok(total)
    }

    /// Delete-by-`document_id` then add, one commit (spec §4.3).
    pub async fn update_document(&self, chunk: &TextChunk) -> Result<()> {
        let this = self.clone();
        let chunk = chunk.clone();
        tokio::task::spawn_blocking(move || {
            this.index_chunk_blocking(&chunk)?;
            this.commit_blocking()
        })
        .await?
    }

    /// `update_document` for each chunk, one shared commit.
    pub async fn update_documents(&self, chunks: &[TextChunk]) -> Result<usize> {
        self.add_chunks(chunks).await
    }

    /// Delete every chunk indexed under `file_path`, committing immediately.
    pub async fn remove_chunks_for_file(&self, file_path: &str) -> Result<u64> {
        let this = self.clone();
        let file_path = file_path.to_string();
        tokio::task::spawn_blocking(move || {
            let removed = this.delete_by_field_blocking("file_path", &file_path)?;
            this.commit_blocking()?;
            Ok::<_, anyhow::Error>(removed)
        })
        .await?
    }

    /// Atomic replace: delete every chunk under `file_path`, then add
    /// `new_chunks`, in a single commit (the §3 atomicity invariant — the
    /// index never observes a state with neither the old nor the new set).
    pub async fn update_chunks_for_file(&self, file_path: &str, new_chunks: &[TextChunk]) -> Result<usize> {
        let this = self.clone();
        let file_path = file_path.to_string();
        let new_chunks = new_chunks.to_vec();
        tokio::task::spawn_blocking(move || {
            this.delete_by_field_blocking("file_path", &file_path)?;
            for chunk in &new_chunks {
                this.index_chunk_blocking(chunk)?;
            }
            this.commit_blocking()?;
            Ok::<_, anyhow::Error>(new_chunks.len())
        })
        .await?
    }

    fn index_chunk_blocking(&self, chunk: &TextChunk) -> Result<()> {
        let s = &self.inner.schema;
        let doc = Document::from_chunk(chunk);

        let mut tantivy_doc = TantivyDocument::default();
        tantivy_doc.add_text(s.document_id, &doc.document_id);
        tantivy_doc.add_text(s.content, &doc.content);
        tantivy_doc.add_text(s.entity_name, &doc.entity_name);
        tantivy_doc.add_text(s.entity_name_keyword, &doc.entity_name);
        tantivy_doc.add_text(s.language, &doc.language);
        tantivy_doc.add_text(s.entity_type, &doc.entity_type);
        tantivy_doc.add_text(s.file_path, &doc.file_path);
        tantivy_doc.add_text(s.repository, &doc.repository);
        tantivy_doc.add_text(s.doc_summary, doc.doc_summary.as_deref().unwrap_or(""));
        tantivy_doc.add_u64(s.start_line, doc.start_line as u64);
        tantivy_doc.add_u64(s.end_line, doc.end_line as u64);
        tantivy_doc.add_u64(s.start_byte, doc.start_byte);
        tantivy_doc.add_u64(s.end_byte, doc.end_byte);

        let meta_json: serde_json::Map<String, serde_json::Value> = doc
            .meta
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        tantivy_doc.add_object(s.meta, meta_json);

        let writer = self.inner.writer.lock();
        writer.delete_term(Term::from_field_text(s.document_id, &doc.document_id));
        writer.add_document(tantivy_doc)?;
        Ok(())
    }

    pub async fn commit(&self) -> Result<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.commit_blocking()).await?
    }

    fn commit_blocking(&self) -> Result<()> {
        self.inner.writer.lock().commit()?;
        Ok(())
    }

    /// Delete the chunk identified by `id`, committing immediately. Returns
    /// tantivy's opstamp for the delete, an opaque monotonically increasing
    /// counter — NOT a count of documents removed (tantivy does not report
    /// that synchronously; see spec §9 Open Question on `remove_document`'s
    /// return value).
    pub async fn remove_document(&self, id: &ChunkId) -> Result<u64> {
        let this = self.clone();
        let id = id.clone();
        tokio::task::spawn_blocking(move || {
            let s = &this.inner.schema;
            let opstamp = {
                let writer = this.inner.writer.lock();
                writer.delete_term(Term::from_field_text(s.document_id, id.as_str()))
            };
            this.commit_blocking()?;
            Ok::<_, anyhow::Error>(opstamp)
        })
        .await?
    }

    /// `remove_document` for each id, one shared commit. The returned
    /// counter is the opaque sum of the per-delete opstamps (spec §9).
    pub async fn remove_documents(&self, ids: &[ChunkId]) -> Result<u64> {
        let this = self.clone();
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || {
            let s = &this.inner.schema;
            let mut total = 0u64;
            {
                let writer = this.inner.writer.lock();
                for id in &ids {
                    total += writer.delete_term(Term::from_field_text(s.document_id, id.as_str()));
                }
            }
            this.commit_blocking()?;
            Ok::<_, anyhow::Error>(total)
        })
        .await?
    }

    fn delete_by_field_blocking(&self, field_name: &str, value: &str) -> Result<u64> {
        let s = &self.inner.schema;
        let field = s
            .exact_field(field_name)
            .with_context(|| format!("{field_name} is not an exact-match field"))?;

        let matching_ids = self.collect_document_ids_for(field, value)?;
        let writer = self.inner.writer.lock();
        for doc_id in &matching_ids {
            writer.delete_term(Term::from_field_text(s.document_id, doc_id));
        }
        Ok(matching_ids.len() as u64)
    }

    fn collect_document_ids_for(&self, field: Field, value: &str) -> Result<Vec<String>> {
        let searcher = self.inner.reader.searcher();
        let query = TermQuery::new(
            Term::from_field_text(field, value),
            IndexRecordOption::Basic,
        );
        let top = searcher.search(&query, &TopDocs::with_limit(searcher.num_docs() as usize))?;
        let s = &self.inner.schema;
        let mut ids = Vec::with_capacity(top.len());
        for (_score, addr) in top {
            let retrieved: TantivyDocument = searcher.doc(addr)?;
            if let Some(id) = retrieved.get_first(s.document_id).and_then(|v| v.as_str()) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Plain-text search with no filters, default boosts, no offset (spec
    /// §4.3 `search(query, limit)`).
    pub async fn search(&self, query_text: &str, limit: usize) -> Result<Vec<(Document, f32)>> {
        let node = crate::query::parse_query(query_text);
        self.search_with_scores(&node, &SearchFilters::default(), &BoostConfig::default(), limit, 0)
            .await
    }

    /// Analyzed (or exact, depending on `field_name`) query restricted to a
    /// single field (spec §4.3 `search_field(field, value, limit)`).
    pub async fn search_field(&self, field_name: &str, value: &str, limit: usize) -> Result<Vec<(Document, f32)>> {
        let node = QueryNode::Field(field_name.to_string(), Box::new(QueryNode::Term(value.to_string())));
        self.search_with_scores(&node, &SearchFilters::default(), &BoostConfig::default(), limit, 0)
            .await
    }

    pub async fn search_with_scores(
        &self,
        node: &QueryNode,
        filters: &SearchFilters,
        boosts: &BoostConfig,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<(Document, f32)>> {
        let this = self.clone();
        let node = node.clone();
        let filters = filters.clone();
        let boosts = boosts.clone();
        tokio::task::spawn_blocking(move || this.search_blocking(&node, &filters, &boosts, limit, offset))
            .await?
    }

    /// Disjunction on `entity_name_keyword` (spec §4.3
    /// `lookup_by_entity_names(names, limit, filters)`), used by the
    /// orchestrator's transitive-augmentation step (§4.10 step 5b) to turn
    /// graph-resolved entity names into real, fully-populated `Document`s.
    pub async fn lookup_by_entity_names(
        &self,
        names: &[String],
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<Document>> {
        let this = self.clone();
        let names = names.to_vec();
        let filters = filters.clone();
        tokio::task::spawn_blocking(move || this.lookup_by_entity_names_blocking(&names, limit, &filters)).await?
    }

    fn lookup_by_entity_names_blocking(
        &self,
        names: &[String],
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<Document>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let s = &self.inner.schema;

        let clauses: Vec<(Occur, Box<dyn Query>)> = names
            .iter()
            .map(|n| {
                let q: Box<dyn Query> = Box::new(TermQuery::new(
                    Term::from_field_text(s.entity_name_keyword, n),
                    IndexRecordOption::Basic,
                ));
                (Occur::Should, q)
            })
            .collect();
        let name_query: Box<dyn Query> = Box::new(BooleanQuery::new(clauses));

        let query: Box<dyn Query> = match self.compile_filters(filters) {
            Some(filter) => Box::new(BooleanQuery::new(vec![(Occur::Must, name_query), (Occur::Must, filter)])),
            None => name_query,
        };

        let searcher = self.inner.reader.searcher();
        let top = searcher.search(query.as_ref(), &TopDocs::with_limit(limit.max(1)))?;
        let mut out = Vec::with_capacity(top.len());
        for (_score, addr) in top {
            let retrieved: TantivyDocument = searcher.doc(addr)?;
            out.push(self.document_from_tantivy(&retrieved, s));
        }
        Ok(out)
    }

    fn search_blocking(
        &self,
        node: &QueryNode,
        filters: &SearchFilters,
        boosts: &BoostConfig,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<(Document, f32)>> {
        let searcher = self.inner.reader.searcher();
        let query = self.compile_full_query(node, filters, boosts);

        let fetch = limit + offset;
        let top = searcher.search(query.as_ref(), &TopDocs::with_limit(fetch.max(1)))?;
        let s = &self.inner.schema;

        let mut out = Vec::new();
        for (score, addr) in top.into_iter().skip(offset) {
            let retrieved: TantivyDocument = searcher.doc(addr)?;
            out.push((self.document_from_tantivy(&retrieved, s), score));
        }
        Ok(out)
    }

    fn document_from_tantivy(&self, doc: &TantivyDocument, s: &KeywordSchema) -> Document {
        let text = |f: Field| doc.get_first(f).and_then(|v| v.as_str()).unwrap_or("").to_string();
        let num = |f: Field| doc.get_first(f).and_then(|v| v.as_u64()).unwrap_or(0);

        let doc_summary = doc
            .get_first(s.doc_summary)
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .map(String::from);

        let mut meta = HashMap::new();
        if let Some(obj) = doc.get_first(s.meta).and_then(|v| v.as_object()) {
            for (k, v) in obj {
                if let Some(s) = v.as_str() {
                    meta.insert(k.to_string(), s.to_string());
                }
            }
        }

        Document {
            document_id: text(s.document_id),
            content: text(s.content),
            language: text(s.language),
            entity_type: text(s.entity_type),
            entity_name: text(s.entity_name),
            file_path: text(s.file_path),
            repository: text(s.repository),
            start_line: num(s.start_line) as u32,
            end_line: num(s.end_line) as u32,
            start_byte: num(s.start_byte),
            end_byte: num(s.end_byte),
            doc_summary,
            meta,
        }
    }

    pub async fn compute_facets(&self, field_name: &str, limit: usize) -> Result<Vec<(String, u64)>> {
        let this = self.clone();
        let field_name = field_name.to_string();
        tokio::task::spawn_blocking(move || this.compute_facets_blocking(&field_name, limit)).await?
    }

    fn compute_facets_blocking(&self, field_name: &str, limit: usize) -> Result<Vec<(String, u64)>> {
        let s = &self.inner.schema;
        let field = s
            .exact_field(field_name)
            .with_context(|| format!("{field_name} is not a facetable field"))?;

        let searcher = self.inner.reader.searcher();
        let top = searcher.search(&AllQuery, &TopDocs::with_limit(searcher.num_docs() as usize))?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for (_score, addr) in top {
            let retrieved: TantivyDocument = searcher.doc(addr)?;
            if let Some(v) = retrieved.get_first(field).and_then(|v| v.as_str()) {
                *counts.entry(v.to_string()).or_insert(0) += 1;
            }
        }

        let mut pairs: Vec<(String, u64)> = counts.into_iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(limit);
        Ok(pairs)
    }

    pub async fn get_index_stats(&self) -> Result<IndexStats> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            let searcher = this.inner.reader.searcher();
            Ok::<_, anyhow::Error>(IndexStats {
                num_docs: searcher.num_docs(),
                num_segments: searcher.segment_readers().len(),
            })
        })
        .await?
    }

    fn compile_full_query(&self, node: &QueryNode, filters: &SearchFilters, boosts: &BoostConfig) -> Box<dyn Query> {
        let text_query = self.compile_node(node, boosts);
        let filter_query = self.compile_filters(filters);

        match filter_query {
            Some(filter) => Box::new(BooleanQuery::new(vec![
                (Occur::Must, text_query),
                (Occur::Must, filter),
            ])),
            None => text_query,
        }
    }

    fn compile_filters(&self, filters: &SearchFilters) -> Option<Box<dyn Query>> {
        if filters.is_empty() {
            return None;
        }
        let s = &self.inner.schema;
        let mut dims: Vec<Box<dyn Query>> = Vec::new();

        let dim = |field: Field, values: &[String]| -> Option<Box<dyn Query>> {
            if values.is_empty() {
                return None;
            }
            let clauses: Vec<(Occur, Box<dyn Query>)> = values
                .iter()
                .map(|v| {
                    let q: Box<dyn Query> = Box::new(TermQuery::new(
                        Term::from_field_text(field, v),
                        IndexRecordOption::Basic,
                    ));
                    (Occur::Should, q)
                })
                .collect();
            Some(Box::new(BooleanQuery::new(clauses)))
        };

        if let Some(q) = dim(s.language, &filters.languages) {
            dims.push(q);
        }
        if let Some(q) = dim(s.repository, &filters.repositories) {
            dims.push(q);
        }
        if let Some(q) = dim(s.entity_type, &filters.entity_types) {
            dims.push(q);
        }
        if !filters.file_path_prefixes.is_empty() {
            let clauses: Vec<(Occur, Box<dyn Query>)> = filters
                .file_path_prefixes
                .iter()
                .map(|prefix| {
                    let pattern = format!("{}.*", regex::escape(prefix));
                    let q: Box<dyn Query> = Box::new(
                        RegexQuery::from_pattern(&pattern, s.file_path)
                            .expect("prefix filter compiles to a valid regex"),
                    );
                    (Occur::Should, q)
                })
                .collect();
            dims.push(Box::new(BooleanQuery::new(clauses)));
        }

        if dims.is_empty() {
            return None;
        }
        let must: Vec<(Occur, Box<dyn Query>)> = dims.into_iter().map(|q| (Occur::Must, q)).collect();
        Some(Box::new(BooleanQuery::new(must)))
    }

    fn compile_node(&self, node: &QueryNode, boosts: &BoostConfig) -> Box<dyn Query> {
        match node {
            QueryNode::MatchAll => Box::new(AllQuery),
            QueryNode::Field(name, inner) => self.compile_field(name, inner, boosts),
            QueryNode::And(nodes) => {
                let clauses = nodes
                    .iter()
                    .map(|n| (Occur::Must, self.compile_node(n, boosts)))
                    .collect();
                Box::new(BooleanQuery::new(clauses))
            }
            QueryNode::Or(nodes) => {
                let clauses = nodes
                    .iter()
                    .map(|n| (Occur::Should, self.compile_node(n, boosts)))
                    .collect();
                Box::new(BooleanQuery::new(clauses))
            }
            QueryNode::Not(inner) => Box::new(BooleanQuery::new(vec![
                (Occur::Must, Box::new(AllQuery) as Box<dyn Query>),
                (Occur::MustNot, self.compile_node(inner, boosts)),
            ])),
            QueryNode::Group(inner) => self.compile_node(inner, boosts),
            QueryNode::Term(_) | QueryNode::Phrase(_) | QueryNode::Wildcard(_) => {
                self.compile_default_fanout(node, boosts)
            }
        }
    }

    /// An unscoped leaf searches every default field (spec §4.2), each
    /// boost-wrapped per [`BoostConfig`].
    fn compile_default_fanout(&self, node: &QueryNode, boosts: &BoostConfig) -> Box<dyn Query> {
        // compile_field already applies each field's boost; don't double it here.
        let clauses: Vec<(Occur, Box<dyn Query>)> = crate::query::DEFAULT_FIELDS
            .iter()
            .map(|field| (Occur::Should, self.compile_field(field, node, boosts)))
            .collect();
        Box::new(BooleanQuery::new(clauses))
    }

    fn compile_field(&self, field_name: &str, inner: &QueryNode, boosts: &BoostConfig) -> Box<dyn Query> {
        let s = &self.inner.schema;
        let boost = boosts.as_map().get(field_name).copied().unwrap_or(1.0);

        let compiled: Box<dyn Query> = if let Some(field) = s.exact_field(field_name) {
            self.compile_exact_leaf(field, inner)
        } else if let Some(field) = s.text_field(field_name) {
            self.compile_analyzed_leaf(field, inner)
        } else {
            Box::new(AllQuery)
        };

        self.boosted(compiled, boost)
    }

    fn boosted(&self, query: Box<dyn Query>, boost: f32) -> Box<dyn Query> {
        if (boost - 1.0).abs() < f32::EPSILON {
            query
        } else {
            Box::new(BoostQuery::new(query, boost))
        }
    }

    fn compile_exact_leaf(&self, field: Field, node: &QueryNode) -> Box<dyn Query> {
        match node {
            QueryNode::Phrase(text) | QueryNode::Term(text) => Box::new(TermQuery::new(
                Term::from_field_text(field, &text.to_lowercase()),
                IndexRecordOption::Basic,
            )),
            QueryNode::Wildcard(pattern) => {
                let regex = glob_to_anchored_regex(&pattern.to_lowercase());
                Box::new(
                    RegexQuery::from_pattern(&regex, field).unwrap_or_else(|_| {
                        RegexQuery::from_pattern(".^", field).expect("empty-match regex is valid")
                    }),
                )
            }
            other => self.compile_node_as_exact_fallback(other, field),
        }
    }

    fn compile_node_as_exact_fallback(&self, node: &QueryNode, field: Field) -> Box<dyn Query> {
        match node {
            QueryNode::Group(inner) => self.compile_exact_leaf(field, inner),
            _ => Box::new(AllQuery),
        }
    }

    fn compile_analyzed_leaf(&self, field: Field, node: &QueryNode) -> Box<dyn Query> {
        match node {
            QueryNode::Term(text) => {
                let tokens = self.inner.analyzer.analyze(text);
                if tokens.is_empty() {
                    return Box::new(AllQuery);
                }
                let clauses: Vec<(Occur, Box<dyn Query>)> = tokens
                    .into_iter()
                    .map(|t| {
                        let q: Box<dyn Query> =
                            Box::new(TermQuery::new(Term::from_field_text(field, &t), IndexRecordOption::Basic));
                        (Occur::Should, q)
                    })
                    .collect();
                Box::new(BooleanQuery::new(clauses))
            }
            QueryNode::Phrase(text) => {
                let terms: Vec<Term> = text
                    .split_whitespace()
                    .map(|w| Term::from_field_text(field, &w.to_lowercase()))
                    .collect();
                if terms.len() < 2 {
                    return terms
                        .first()
                        .map(|t| Box::new(TermQuery::new(t.clone(), IndexRecordOption::Basic)) as Box<dyn Query>)
                        .unwrap_or_else(|| Box::new(AllQuery));
                }
                Box::new(PhraseQuery::new(terms))
            }
            QueryNode::Wildcard(pattern) => {
                let regex = glob_to_anchored_regex(&pattern.to_lowercase());
                Box::new(
                    RegexQuery::from_pattern(&regex, field).unwrap_or_else(|_| {
                        RegexQuery::from_pattern(".^", field).expect("empty-match regex is valid")
                    }),
                )
            }
            QueryNode::Group(inner) => self.compile_analyzed_leaf(field, inner),
            _ => Box::new(AllQuery),
        }
    }
}

/// Translate a glob pattern (`*` = any sequence, `?` = single char, anywhere
/// in the term — spec §4.2) into a regex anchored to match the whole field
/// value, for `RegexQuery`. Every other character is escaped literally.
fn glob_to_anchored_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

/// Convenience used by ingestion-adjacent callers that only have a raw
/// attribute key, not a `Document` already built.
pub fn meta_field_name(key: &str) -> String {
    format!("meta_{}", sanitize_attr_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoostConfig;

    fn sample_chunk(name: &str, content: &str) -> TextChunk {
        TextChunk {
            content: content.to_string(),
            language: "rust".to_string(),
            entity_type: "function".to_string(),
            entity_name: name.to_string(),
            file_path: format!("src/{name}.rs"),
            start_line: 1,
            end_line: 10,
            start_byte: 0,
            end_byte: 100,
            attributes: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn index_and_search_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        index.add_chunks(&[sample_chunk("getUserName", "fn getUserName() -> String")]).await.unwrap();

        let node = crate::query::parse_query("user");
        let boosts = BoostConfig::default();
        let results = index
            .search_with_scores(&node, &SearchFilters::default(), &boosts, 10, 0)
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].0.entity_name, "getUserName");
    }

    #[tokio::test]
    async fn filters_restrict_results() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        index.add_chunks(&[sample_chunk("alpha", "fn alpha()")]).await.unwrap();

        let node = crate::query::parse_query("alpha");
        let boosts = BoostConfig::default();
        let filters = SearchFilters {
            languages: vec!["python".to_string()],
            ..Default::default()
        };
        let results = index.search_with_scores(&node, &filters, &boosts, 10, 0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn remove_document_removes_from_results() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        let chunk = sample_chunk("zeta", "fn zeta()");
        index.add_chunks(&[chunk.clone()]).await.unwrap();

        index.remove_document(&chunk.chunk_id()).await.unwrap();

        let node = crate::query::parse_query("zeta");
        let boosts = BoostConfig::default();
        let results = index
            .search_with_scores(&node, &SearchFilters::default(), &boosts, 10, 0)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn add_chunks_batch_indexes_everything_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        let chunks = vec![
            sample_chunk("one", "fn one()"),
            sample_chunk("two", "fn two()"),
            sample_chunk("three", "fn three()"),
        ];
        let indexed = index.add_chunks_batch(&chunks, 2).await.unwrap();
        assert_eq!(indexed, 3);

        let results = index.search("one OR two OR three", 10).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn remove_chunks_for_file_deletes_only_that_file() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        let mut kept = sample_chunk("kept", "fn kept()");
        kept.file_path = "src/other.rs".into();
        index.add_chunks(&[sample_chunk("gone", "fn gone()"), kept]).await.unwrap();

        let removed = index.remove_chunks_for_file("src/gone.rs").await.unwrap();
        assert_eq!(removed, 1);

        let results = index.search("gone", 10).await.unwrap();
        assert!(results.is_empty());
        let survivors = index.search("kept", 10).await.unwrap();
        assert_eq!(survivors.len(), 1);
    }

    #[tokio::test]
    async fn update_chunks_for_file_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        let mut old = sample_chunk("old_fn", "fn old_fn()");
        old.file_path = "src/m.rs".into();
        index.add_chunks(&[old]).await.unwrap();

        let mut new_chunk = sample_chunk("new_fn", "fn new_fn()");
        new_chunk.file_path = "src/m.rs".into();
        index.update_chunks_for_file("src/m.rs", std::slice::from_ref(&new_chunk)).await.unwrap();

        assert!(index.search("old_fn", 10).await.unwrap().is_empty());
        assert_eq!(index.search("new_fn", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookup_by_entity_names_finds_exact_matches() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        index
            .add_chunks(&[sample_chunk("ConcreteRepo", "class ConcreteRepo"), sample_chunk("Other", "class Other")])
            .await
            .unwrap();

        let docs = index
            .lookup_by_entity_names(&["ConcreteRepo".to_string()], 10, &SearchFilters::default())
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].entity_name, "ConcreteRepo");
    }

    #[tokio::test]
    async fn wildcard_search_matches_mid_term_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let index = KeywordIndex::open_or_create(dir.path()).unwrap();
        index.add_chunks(&[sample_chunk("user", "class user")]).await.unwrap();

        let node = crate::query::parse_query("entity_name_keyword:us?r");
        let boosts = BoostConfig::default();
        let results = index
            .search_with_scores(&node, &SearchFilters::default(), &boosts, 10, 0)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }
}

//! Core data model (spec §3): the immutable [`TextChunk`], its canonical
//! [`ChunkId`], repository-tag derivation, and search filters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An immutable unit of retrieval — a class, method, function body (or
/// similar) plus its metadata. Created by ingestion; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub content: String,
    pub language: String,
    pub entity_type: String,
    pub entity_name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_byte: u64,
    pub end_byte: u64,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl TextChunk {
    /// Repository tag derived from `file_path` (spec §3): the penultimate
    /// path segment after stripping a known host prefix, else the directory
    /// immediately above the filename; `"unknown"` if there is no parent.
    pub fn repository(&self) -> String {
        derive_repository(&self.file_path)
    }

    pub fn chunk_id(&self) -> ChunkId {
        ChunkId::new(&self.file_path, &self.entity_name, self.start_line, self.end_line)
    }

    pub fn doc_summary(&self) -> Option<&str> {
        self.attributes.get("doc_summary").map(String::as_str)
    }

    pub fn visibility(&self) -> Option<&str> {
        self.attributes.get("visibility").map(String::as_str)
    }
}

const KNOWN_HOST_PREFIXES: [&str; 2] = ["github.com/", "gitlab.com/"];

fn derive_repository(file_path: &str) -> String {
    for prefix in KNOWN_HOST_PREFIXES {
        if let Some(rest) = file_path.strip_prefix(prefix) {
            let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
            // rest looks like "owner/repo/path/to/file" — the repo name is
            // the segment right after the owner.
            if segments.len() >= 2 {
                return segments[1].to_string();
            }
            if let Some(first) = segments.first() {
                return first.to_string();
            }
            return "unknown".to_string();
        }
    }

    let segments: Vec<&str> = file_path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() >= 2 {
        segments[segments.len() - 2].to_string()
    } else {
        "unknown".to_string()
    }
}

/// Canonical chunk identity: `"{file_path}:{entity_name}:{start_line}:{end_line}"`.
/// Used to dedup keyword and vector hits that refer to the same logical chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn new(file_path: &str, entity_name: &str, start_line: u32, end_line: u32) -> Self {
        Self(format!("{file_path}:{entity_name}:{start_line}:{end_line}"))
    }

    /// Parse a wire-format ChunkId string. Callers MUST otherwise treat the
    /// on-the-wire string as opaque (spec §6).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sanitize an arbitrary attribute key into a valid `meta_{k}` field name:
/// lowercase, non-alphanumeric bytes replaced with `_`.
pub fn sanitize_attr_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Filters applied to both keyword search and structural lookups (spec §4.3).
/// Each dimension is a (possibly empty) list; across dimensions is AND,
/// within one dimension is OR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub file_path_prefixes: Vec<String>,
    #[serde(default)]
    pub entity_types: Vec<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
            && self.repositories.is_empty()
            && self.file_path_prefixes.is_empty()
            && self.entity_types.is_empty()
    }
}

/// A stored/returned document: the subset of [`TextChunk`] the keyword index
/// surfaces, plus its document-level identity fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub document_id: String,
    pub content: String,
    pub language: String,
    pub entity_type: String,
    pub entity_name: String,
    pub file_path: String,
    pub repository: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_byte: u64,
    pub end_byte: u64,
    pub doc_summary: Option<String>,
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl Document {
    pub fn from_chunk(chunk: &TextChunk) -> Self {
        let mut meta = HashMap::new();
        for (k, v) in &chunk.attributes {
            if k == "doc_summary" {
                continue;
            }
            meta.insert(format!("meta_{}", sanitize_attr_key(k)), v.clone());
        }

        Self {
            document_id: chunk.chunk_id().as_str().to_string(),
            content: chunk.content.clone(),
            language: chunk.language.clone(),
            entity_type: chunk.entity_type.clone(),
            entity_name: chunk.entity_name.clone(),
            file_path: chunk.file_path.clone(),
            repository: chunk.repository(),
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            start_byte: chunk.start_byte,
            end_byte: chunk.end_byte,
            doc_summary: chunk.doc_summary().map(String::from),
            meta,
        }
    }

    pub fn chunk_id(&self) -> ChunkId {
        ChunkId::from_raw(self.document_id.clone())
    }
}

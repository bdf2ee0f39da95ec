//! Query Parser (spec §4.2): turns raw query text into a [`QueryNode`]
//! tree, always succeeding from the caller's perspective — a syntax
//! failure degrades to a per-field analyzed-term disjunction rather than
//! propagating, and blank input becomes the explicit match-all sentinel.

pub mod parser;
pub mod structural;

pub use parser::QueryNode;

/// Fields searched when a leaf term carries no explicit `field:` prefix.
/// Boost-wrapping against [`crate::config::BoostConfig`] happens where the
/// tree is compiled against a backing index (`keyword::compile_query`),
/// not here — this module only produces the unscoped syntax tree.
pub const DEFAULT_FIELDS: &[&str] = &[
    "content",
    "entity_name",
    "entity_name_keyword",
    "doc_summary",
    "language",
    "entity_type",
    "repository",
];

/// Parse `text` into a query tree. Never fails:
/// - blank/whitespace-only input → [`QueryNode::MatchAll`]
/// - a syntactically invalid query → a disjunction of each whitespace
///   token, field-scoped across [`DEFAULT_FIELDS`]
/// - otherwise, the parsed tree
pub fn parse_query(text: &str) -> QueryNode {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return QueryNode::MatchAll;
    }

    match parser::parse(trimmed) {
        Ok(node) => node,
        Err(_) => fallback_disjunction(trimmed),
    }
}

fn fallback_disjunction(text: &str) -> QueryNode {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return QueryNode::MatchAll;
    }

    let terms: Vec<QueryNode> = words
        .iter()
        .flat_map(|w| {
            DEFAULT_FIELDS.iter().map(move |field| {
                QueryNode::Field(
                    (*field).to_string(),
                    Box::new(QueryNode::Term(w.to_lowercase())),
                )
            })
        })
        .collect();

    QueryNode::Or(terms)
}

/// Strict-mode validity check used by callers that want to reject rather
/// than degrade (e.g. a "verify my query syntax" UI affordance). Delegates
/// to the underlying grammar's own strict check — unlike [`parse_query`]
/// this does NOT treat a parse failure as valid-via-fallback.
pub fn is_valid(text: &str) -> bool {
    parser::is_valid(text)
}

//! Error taxonomy for the search pipeline (spec §7).
//!
//! Leaves (analyzer, keyword index, vector index, graph backends) return
//! `anyhow::Result` for internal plumbing; the orchestrator classifies
//! failures into this taxonomy at its boundary rather than leaves throwing
//! typed errors directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// User input violates a constraint (blank query, out-of-range depth, bad weights).
    #[error("validation error: {0}")]
    Validation(String),

    /// Query syntax invalid. Not meant to reach the caller — §4.2 says the
    /// parser falls back to a disjunction instead of surfacing this, but the
    /// variant exists for components that want to report it explicitly.
    #[error("parse error: {0}")]
    Parse(String),

    /// Keyword/vector/graph/embedding backend unavailable or timed out.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A process-wide invariant was violated (vector dimension mismatch,
    /// weight-sum mismatch). Fatal: prevents startup or rejects the call.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Request was cancelled; no result, no partial side effects beyond
    /// releasing reader leases.
    #[error("request cancelled")]
    Cancelled,
}

impl SearchError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;

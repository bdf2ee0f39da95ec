//! HTTP surface (spec §6): a thin `GET /search` adapter over
//! [`SearchOrchestrator`]. Grounded on
//! `examples/parallax-labs-context-harness/src/server.rs` — `AppState`,
//! an `AppError` implementing `IntoResponse`, CORS layering, and handlers
//! that validate then dispatch rather than embedding logic inline.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::SearchError;
use crate::orchestrator::{SearchMode, SearchOrchestrator, SearchRequest};
use crate::types::SearchFilters;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SearchOrchestrator>,
}

pub struct AppError(SearchError);

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SearchError::Validation(msg) | SearchError::Parse(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SearchError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "request cancelled".to_string()),
            SearchError::BackendUnavailable(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("search failed: backend unavailable: {msg}"))
            }
            SearchError::InvariantViolation(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("search failed: {msg}"))
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    #[serde(default)]
    language: Vec<String>,
    #[serde(default)]
    repository: Vec<String>,
    #[serde(default)]
    file_path: Vec<String>,
    #[serde(default)]
    entity_type: Vec<String>,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
    mode: Option<String>,
    #[serde(default)]
    transitive: bool,
    depth: Option<usize>,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct ResultItem {
    pub chunk_id: String,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub file_path: Option<String>,
    pub language: Option<String>,
    pub content: Option<String>,
    pub combined_score: f32,
    pub from_both_sources: bool,
    pub transitive_path: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct FacetEntry {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ResultItem>,
    pub facets: HashMap<String, Vec<FacetEntry>>,
    pub query: String,
    pub size: usize,
    pub page: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(addr: SocketAddr, orchestrator: Arc<SearchOrchestrator>) -> anyhow::Result<()> {
    let app = router(AppState { orchestrator });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "search HTTP surface listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(SearchError::Validation("query is required".into()).into());
    }

    let mode = SearchMode::parse(params.mode.as_deref())?;

    let request = SearchRequest {
        query: query.clone(),
        filters: SearchFilters {
            languages: params.language,
            repositories: params.repository,
            file_path_prefixes: params.file_path,
            entity_types: params.entity_type,
        },
        mode,
        limit: params.limit.max(1),
        offset: params.offset,
        transitive: params.transitive,
        depth: params.depth,
    };

    let result = state.orchestrator.search(&request).await?;

    let results: Vec<ResultItem> = result
        .merged_results
        .into_iter()
        .map(|r| ResultItem {
            chunk_id: r.chunk_id.as_str().to_string(),
            entity_name: r.document.as_ref().map(|d| d.entity_name.clone()),
            entity_type: r.document.as_ref().map(|d| d.entity_type.clone()),
            file_path: r.document.as_ref().map(|d| d.file_path.clone()),
            language: r.document.as_ref().map(|d| d.language.clone()),
            content: r.document.as_ref().map(|d| d.content.clone()),
            combined_score: r.combined_score,
            from_both_sources: r.from_both_sources,
            transitive_path: r.transitive_path,
        })
        .collect();

    let facets = result
        .facets
        .into_iter()
        .map(|(field, values)| {
            let entries = values
                .into_iter()
                .map(|(value, count)| FacetEntry { value, count })
                .collect();
            (field, entries)
        })
        .collect();

    let page = request.offset / request.limit.max(1);
    let size = results.len();

    Ok(Json(SearchResponse {
        results,
        facets,
        query,
        size,
        page,
    }))
}

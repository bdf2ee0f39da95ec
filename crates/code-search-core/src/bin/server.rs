//! Binary entry point: wires configuration, backends, and the search
//! orchestrator together behind the HTTP surface. Grounded on the
//! teacher's own binary-entry idiom (config load → component
//! construction → server run) and `config.rs::RAGConfig`'s use of `dirs`
//! for a default data directory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use code_search_core::config::SearchConfig;
use code_search_core::embedding::memory::HashingEmbeddingProvider;
use code_search_core::graph::memory::InMemoryGraphStore;
use code_search_core::graph::{GraphQueryService, GraphStore};
use code_search_core::keyword::KeywordIndex;
use code_search_core::orchestrator::SearchOrchestrator;
use code_search_core::vector::memory::InMemoryVectorIndex;
use code_search_core::vector::VectorIndex;

fn data_dir() -> PathBuf {
    std::env::var("CODE_SEARCH_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("code-search-core")
    })
}

fn load_config() -> anyhow::Result<SearchConfig> {
    match std::env::var("CODE_SEARCH_CONFIG") {
        Ok(path) => SearchConfig::from_file(&PathBuf::from(path)).map_err(Into::into),
        Err(_) => {
            let config = SearchConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_config()?;
    let data_dir = data_dir();
    tracing::info!(?data_dir, "starting code-search-core server");

    let keyword = KeywordIndex::open_or_create(&data_dir.join("keyword"))?;
    let vector: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new(config.embedding.dimension));
    let embedder = Arc::new(HashingEmbeddingProvider::new(config.embedding.dimension));
    let graph_store: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::default());
    let graph = GraphQueryService::new(graph_store, config.transitive.default_depth);

    let orchestrator = Arc::new(SearchOrchestrator::new(keyword, vector, embedder, graph, config));

    let addr: SocketAddr = std::env::var("CODE_SEARCH_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;

    code_search_core::http::run_server(addr, orchestrator).await
}

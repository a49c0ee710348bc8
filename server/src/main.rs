use anyhow::Result;
use axum::Router;
use clap::Parser;
use search_core::{loader, EngineConfig, IdfMode, SearchEngine};
use server::build_app;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, env = "SEARCH_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "SEARCH_PORT", default_value_t = 8080)]
    port: u16,
    /// Maximum number of cached query results
    #[arg(long, env = "SEARCH_CACHE_CAPACITY", default_value_t = 100)]
    cache_capacity: usize,
    /// IDF formula: plain = ln(N/(df+1)), smoothed = ln(1 + N/(df+1))
    #[arg(long, env = "SEARCH_IDF", default_value = "smoothed")]
    idf: IdfMode,
    /// Decrement autocomplete frequencies of a document's old terms on re-index and removal
    #[arg(long, env = "SEARCH_REINDEX_TRIE", default_value_t = false)]
    reindex_trie: bool,
    /// JSON/JSONL file or directory indexed at startup
    #[arg(long, env = "SEARCH_SEED")]
    seed: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = EngineConfig {
        cache_capacity: args.cache_capacity,
        idf: args.idf,
        reindex_trie_on_document_update: args.reindex_trie,
    };
    let engine = Arc::new(SearchEngine::new(config)?);
    if let Some(seed) = &args.seed {
        let n = loader::index_path(&engine, seed)?;
        tracing::info!(seed = %seed, docs = n, "seeded index");
    }

    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app: Router = build_app(engine, admin_token);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

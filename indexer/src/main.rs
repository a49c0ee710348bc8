use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use search_core::{loader, EngineConfig, IdfMode, SearchEngine};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index JSON/JSONL documents in memory and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Corpus {
    /// Input path (file or directory)
    #[arg(long)]
    input: String,
    /// IDF formula: plain = ln(N/(df+1)), smoothed = ln(1 + N/(df+1))
    #[arg(long, env = "SEARCH_IDF", default_value = "smoothed")]
    idf: IdfMode,
    /// Decrement autocomplete frequencies of a document's old terms on re-index
    #[arg(long, default_value_t = false)]
    reindex_trie: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// TF-IDF ranked search
    Search {
        #[command(flatten)]
        corpus: Corpus,
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Prefix completion ranked by term frequency
    Autocomplete {
        #[command(flatten)]
        corpus: Corpus,
        prefix: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Boolean query with AND / OR / NOT, folded left to right
    Boolean {
        #[command(flatten)]
        corpus: Corpus,
        query: String,
    },
    /// Corpus statistics
    Stats {
        #[command(flatten)]
        corpus: Corpus,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { corpus, query, limit } => {
            let engine = build_engine(&corpus)?;
            print_json(&engine.search(&query, limit))
        }
        Commands::Autocomplete { corpus, prefix, limit } => {
            let engine = build_engine(&corpus)?;
            print_json(&engine.autocomplete(&prefix, limit))
        }
        Commands::Boolean { corpus, query } => {
            let engine = build_engine(&corpus)?;
            print_json(&engine.boolean_search(&query))
        }
        Commands::Stats { corpus } => {
            let engine = build_engine(&corpus)?;
            print_json(&engine.stats())
        }
    }
}

fn build_engine(corpus: &Corpus) -> Result<SearchEngine> {
    let config = EngineConfig {
        idf: corpus.idf,
        reindex_trie_on_document_update: corpus.reindex_trie,
        ..EngineConfig::default()
    };
    let engine = SearchEngine::new(config)?;
    let n = loader::index_path(&engine, &corpus.input)?;
    tracing::info!(input = %corpus.input, docs = n, "index build complete");
    Ok(engine)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Hybrid Search Engine CLI.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hybrid_search_engine::{
    CacheStore, Document, DocumentStore, DuckdbDocumentStore, EmbeddingClient, EngineConfig,
    Evaluator, GoldQuery, Indexer, MemoryCache, MockEmbedding, RawQuery, SearchUseCase,
};

#[derive(Parser)]
#[command(name = "hybrid-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the DuckDB database file
    #[arg(short, long, global = true, default_value = "hybrid-search.duckdb")]
    db_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk upsert documents from a JSON file (array of document records)
    Index {
        /// Path to a JSON file containing an array of documents
        input: String,
    },

    /// Run a single query
    Search {
        /// The query text
        query: String,

        /// Two-letter country code
        #[arg(short, long)]
        country: String,

        /// Maximum number of results
        #[arg(short, long)]
        k: Option<usize>,

        /// Restrict results to these domains
        #[arg(long)]
        must_domain: Vec<String>,

        /// Exclude results from these domains
        #[arg(long)]
        must_not_domain: Vec<String>,
    },

    /// Run the gold-query evaluation suite
    RunEvals {
        /// Path to the gold-query YAML file
        #[arg(long, default_value = "eval/gold.yaml")]
        gold_path: String,
    },

    /// Show document store statistics
    Stats,
}

#[derive(Debug, Deserialize)]
struct DocumentInput {
    id: String,
    title: String,
    body: String,
    #[serde(default)]
    tags: Vec<String>,
    url: String,
    domain: String,
    lang: Option<String>,
    country: String,
    #[serde(default)]
    authority_score: Option<f32>,
}

impl From<DocumentInput> for Document {
    fn from(input: DocumentInput) -> Self {
        let mut doc = Document::new(input.id, input.title, input.body, input.url, input.domain, input.country)
            .with_tags(input.tags);
        if let Some(lang) = input.lang {
            doc = doc.with_lang(lang);
        }
        if let Some(authority) = input.authority_score {
            doc = doc.with_authority_score(authority);
        }
        doc
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store: Arc<dyn DocumentStore> = Arc::new(DuckdbDocumentStore::open(&PathBuf::from(&cli.db_path))?);
    store.ensure_schema().await?;
    let embedder: Arc<dyn EmbeddingClient> = Arc::new(MockEmbedding::new());
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
    let config = EngineConfig::default();

    match cli.command {
        Commands::Index { input } => {
            let raw = fs::read_to_string(&input).with_context(|| format!("reading {input}"))?;
            let inputs: Vec<DocumentInput> = serde_json::from_str(&raw).with_context(|| format!("parsing {input}"))?;
            let docs: Vec<Document> = inputs.into_iter().map(Document::from).collect();

            info!(count = docs.len(), "indexing documents");
            let indexer = Indexer::new(Some(store.clone()), Some(embedder.clone()));
            let outcome = indexer.upsert(docs).await?;
            println!("Indexed {} documents ({} skipped).", outcome.indexed, outcome.skipped);
        }

        Commands::Search {
            query,
            country,
            k,
            must_domain,
            must_not_domain,
        } => {
            let search = SearchUseCase::new(store.clone(), embedder.clone(), cache.clone(), config);
            let raw = RawQuery {
                text: query,
                country,
                k,
                must_domains: must_domain,
                must_not_domains: must_not_domain,
                time_window: None,
            };

            let results = search.execute(raw).await?;
            if results.is_empty() {
                println!("No results found.");
            } else {
                for result in &results {
                    println!(
                        "{}. {} (score: {:.3}, lexical: {:.3}, vector: {:.3}) — {}",
                        result.rank(),
                        result.document().title(),
                        result.score(),
                        result.score_raw(),
                        result.score_vector(),
                        result.document().url(),
                    );
                }
            }
        }

        Commands::RunEvals { gold_path } => {
            let raw = fs::read_to_string(&gold_path).with_context(|| format!("reading {gold_path}"))?;
            let gold: Vec<GoldQuery> = serde_yaml::from_str(&raw).with_context(|| format!("parsing {gold_path}"))?;

            let evaluator = Evaluator::new(store.clone(), embedder.clone(), config);
            let summary = evaluator.run(&gold).await?;

            println!("{:<18} {:<18} {:<18} {:<20} {:<14}", "avgPrecision", "avgRecall", "avgNDCG", "localizationAcc", "latencyP95ms");
            println!(
                "{:<18.3} {:<18.3} {:<18.3} {:<20.3} {:<14.1}",
                summary.average_precision,
                summary.average_recall,
                summary.average_ndcg,
                summary.localization_accuracy,
                summary.latency_p95_ms,
            );

            if !summary.passes_thresholds() {
                std::process::exit(1);
            }
        }

        Commands::Stats => {
            let count = store.count().await?;
            println!("Hybrid Search Engine Statistics");
            println!("===============================");
            println!("Documents: {count}");
            println!("DB Path:   {}", cli.db_path);
        }
    }

    Ok(())
}

// src/main.rs
// hokej-chat - navigation assistant backend for hokejlogic.cz

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hokej_chat::api::http_router;
use hokej_chat::config::{ChatbotConfig, VERSION};
use hokej_chat::llm::{OpenAIClient, OpenAiEmbeddings};
use hokej_chat::retrieval::builder::build_index;
use hokej_chat::storage::connect_store;
use hokej_chat::AppState;

#[derive(Parser)]
#[command(name = "hokej-chat")]
#[command(about = "Retrieval-augmented chat backend for hokejlogic.cz")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Build the local vector index from a directory of .md/.txt files
    Index {
        /// Directory with the source documents
        #[arg(short, long)]
        source: PathBuf,
    },

    /// Print interaction statistics as JSON
    Stats {
        /// Number of recent interactions to group into conversations
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    // RUST_LOG wins over LOG_LEVEL
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ChatbotConfig::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => run_server(config, host, port).await,
        Commands::Index { source } => run_index(config, source).await,
        Commands::Stats { limit } => run_stats(config, limit).await,
    }
}

async fn run_server(mut config: ChatbotConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Starting hokej-chat {}", VERSION);
    let bind_address = config.bind_address();
    let state = AppState::initialize(config)
        .await
        .context("Failed to initialize chat backend")?;
    let app = http_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_index(config: ChatbotConfig, source: PathBuf) -> Result<()> {
    let client = OpenAIClient::new(&config.openai_api_key, &config.openai_base_url);
    let embedder = Arc::new(OpenAiEmbeddings::new(client, &config.embedding_model));

    let index = build_index(&source, embedder.as_ref(), config.chunk_size, config.chunk_overlap)
        .await
        .context("Failed to build index")?;
    let target = config.index_file();
    index
        .save(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    info!("Wrote {} passages to {}", index.len(), target.display());
    Ok(())
}

async fn run_stats(config: ChatbotConfig, limit: usize) -> Result<()> {
    let store = connect_store(&config.database_url, 1)
        .await
        .context("Failed to open interaction database")?;
    let stats = store.stats(limit).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

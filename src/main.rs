use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use vector_news::{
    config::Config,
    embeddings::{OpenAIEmbeddings, VectorStoreManager},
    llm::{create_adapter, LLMAdapter, LLMProviderConfig},
    news::NewsClient,
    rag::RagGenerator,
    routes::create_router,
    utils::init_logger,
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "vector-news", version, about = "News vector search and RAG API server")]
struct Args {
    /// Optional TOML config file, layered under environment variables
    #[arg(short, long, env = "VECTOR_NEWS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not apply database migrations on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _log_guard = init_logger(&config.logging);
    info!(server = ?config.server, openai = ?config.openai, "Configuration loaded");

    let embedder = Arc::new(OpenAIEmbeddings::new(&config.openai, &config.http)?);
    info!(model = embedder.model(), "Embedding client ready");
    let store = VectorStoreManager::connect(&config, embedder, !args.skip_migrations).await?;

    let news = NewsClient::from_config(&config)?;

    let provider = LLMProviderConfig {
        name: "openai".to_string(),
        api_key: config.openai.api_key.clone(),
    };
    let llm: Arc<dyn LLMAdapter> = Arc::from(create_adapter(&provider, &config.openai, &config.http)?);
    let rag = RagGenerator::new(store.clone(), llm, &config.openai);

    let config = Arc::new(config);
    let state = AppState {
        config: config.clone(),
        store: store.clone(),
        news,
        rag,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    store.disconnect().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

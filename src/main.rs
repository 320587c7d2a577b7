use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cat_api::config::AppConfig;
use cat_api::database::{DatabaseManager, MemoryStore, PgStore};
use cat_api::{app, AppState};

#[derive(Parser)]
#[command(name = "cat-api")]
#[command(about = "Cats and users REST API")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides API_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep data in process memory instead of PostgreSQL
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    info!("Starting cat-api in {:?} mode", config.environment);

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("creating upload directory {}", config.uploads.dir.display()))?;

    let state = if args.memory {
        warn!("Using in-memory store; data is lost on exit");
        AppState::build(&config, Arc::new(MemoryStore::new()))?
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::ensure_schema(&pool).await?;
        AppState::build(&config, Arc::new(PgStore::new(pool)))?
    };

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("cat-api listening on http://{}", bind_addr);
    axum::serve(listener, app(state, &config)).await?;
    Ok(())
}

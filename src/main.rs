use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use noteful_api::config::AppConfig;
use noteful_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use noteful_api::{app, logging, AppState};

#[derive(Parser)]
#[command(name = "noteful-api")]
#[command(about = "Folders and notes REST API")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "PostgreSQL connection string (overrides DATABASE_URL)")]
    database_url: Option<String>,

    #[arg(long, help = "Serve from an in-process store instead of PostgreSQL")]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, API_TOKEN, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = Some(url);
    }

    let _log_guard = logging::init(&config.logging)?;
    tracing::info!("Starting Noteful API in {:?} mode", config.environment);

    let mut pool = None;
    let store: Arc<dyn Store> = if cli.memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pg = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        pool = Some(pg.clone());
        Arc::new(PgStore::new(pg))
    };

    let bind_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid HOST/PORT")?;
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    let router = app(AppState::new(store, config));
    tracing::info!("Noteful API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        DatabaseManager::close(&pool).await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

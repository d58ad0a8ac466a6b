use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cinema_api::config::AppConfig;
use cinema_api::entities;
use cinema_api::routes::build_router;
use cinema_api::state::AppState;
use cinema_api::store::{MemoryStore, PgStore, Store};

#[derive(Parser, Debug)]
#[command(name = "cinema-api", version, about = "Cinema management REST backend")]
struct ServerArgs {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Postgres connection string (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinema_api=info,tower_http=info".into()),
        )
        .init();

    let args = ServerArgs::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }

    tracing::info!("Starting Cinema API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match config.database.url.clone() {
        Some(url) => {
            let store = PgStore::connect(&url, &config.database).await?;
            store.ensure_collections(&entities::collections()).await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app = build_router(AppState::new(store, config.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Cinema API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

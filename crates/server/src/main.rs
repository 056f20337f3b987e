//! Yatube-rs server entry point.
//!
//! `yatube` serves the site; `yatube promote <username>` (or `demote`)
//! toggles staff access for an existing account.

use std::net::SocketAddr;
use std::sync::Arc;

use fred::prelude::*;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube_api::AppState;
use yatube_common::{
    Config, LocalStorage, StorageBackend,
    config::{CacheConfig, LogFormat},
};
use yatube_core::{MemoryPageCache, PageCache, RedisPageCache};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Build the page cache: Redis when configured, process memory otherwise.
async fn page_cache(config: &CacheConfig) -> Result<Arc<dyn PageCache>, Box<dyn std::error::Error>> {
    let Some(url) = config.redis_url.as_deref() else {
        info!("Using in-process page cache");
        return Ok(Arc::new(MemoryPageCache::new()));
    };

    info!("Connecting to Redis...");
    let redis_config = fred::types::config::Config::from_url(url)?;
    let client = fred::clients::Client::new(redis_config, None, None, None);
    client.connect();
    client.wait_for_connect().await?;
    info!("Connected to Redis page cache");

    Ok(Arc::new(RedisPageCache::new(Arc::new(client))))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;
    init_tracing(config.logging.format);

    info!("Starting yatube-rs server...");

    // Connect to database
    let db = yatube_db::init(&config.database).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    yatube_db::migrate(&db).await?;

    let db = Arc::new(db);
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.media.root.clone(),
        config.media.url.clone(),
    ));
    let page_cache = page_cache(&config.cache).await?;
    let state = AppState::new(db, storage, page_cache, &config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [command, username] if command == "promote" || command == "demote" => {
            let user = state
                .user_service
                .set_staff(username, command == "promote")
                .await?;
            info!(username = %user.username, is_staff = user.is_staff, "Updated staff flag");
            return Ok(());
        }
        _ => return Err("usage: yatube [promote|demote <username>]".into()),
    }

    let app = yatube_api::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

//! Forkful server binary.
//!
//! # Configuration
//!
//! Settings load from `~/.config/forkful/config.yaml` with environment
//! variable overrides:
//! - `FORKFUL_CONFIG`: alternate config file path
//! - `FORKFUL_PORT`: port to listen on (default: 8080)
//! - `FORKFUL_MONGO_URI`: MongoDB connection string
//! - `FORKFUL_DATABASE`: database name
//!
//! # Usage
//!
//! ```bash
//! forkful
//! FORKFUL_PORT=3000 forkful
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forkful::server::{self, AppState, SessionStore};
use forkful::{Config, Store};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forkful=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("FORKFUL_CONFIG").ok().map(PathBuf::from);
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to MongoDB
    let store = match Store::connect(&config.mongo_uri, &config.database).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to database '{}'", config.database);

    // Seed taxonomies and run data upgrades; the server can still run if
    // this fails, so log and continue.
    if let Err(e) = store.initialize().await {
        tracing::warn!("Database initialization failed: {}", e);
    }

    let sessions = Arc::new(SessionStore::new(config.session_days));

    // Sweep expired sessions in the background
    let sweeper = Arc::clone(&sessions);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            sweeper.cleanup_expired();
        }
    });

    let state = AppState { store, sessions };
    let app = server::router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

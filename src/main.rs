mod config;
mod error;
mod models;
mod quiz;
mod routes;
mod session;
mod storage;
mod vocabulary;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use config::Config;
use dashmap::DashMap;
use session::SessionEntry;
use storage::FileStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use vocabulary::Vocabulary;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub vocabulary: Vocabulary,
    /// Where the incorrect and marked word lists live
    pub store: Arc<dyn FileStore>,
    /// Open sessions keyed by session id
    pub sessions: DashMap<Uuid, SessionEntry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordcard_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting wordcard backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Shared HTTP client for the dataset and the HTTP file store
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    // Load vocabulary
    let vocabulary = match Vocabulary::load(&config.dataset.source, &http_client).await {
        Ok(vocabulary) => vocabulary,
        Err(e) => {
            tracing::warn!(
                "Failed to load vocabulary: {:#}. Serving without words.",
                e
            );
            tracing::warn!(
                "Place a Day,Word,Meaning table at {} for full functionality",
                config.dataset.source
            );
            Vocabulary::empty()
        }
    };

    let store = storage::from_config(&config.storage, http_client)?;
    tracing::info!(
        "Using {} file store, idle sessions expire after {:?}",
        store.kind(),
        config.session_idle_timeout()
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        vocabulary,
        store,
        sessions: DashMap::new(),
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve frontend static files
    let frontend_service = ServeDir::new(&config.server.frontend_dir);

    let app = routes::create_routes()
        .fallback_service(frontend_service)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Frontend: http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

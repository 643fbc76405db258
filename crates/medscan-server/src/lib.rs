//! medscan server library
//!
//! Provides the HTTP gateway: label analysis, pharmacist chat and a health
//! check.

pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use medscan_core::{alerts::sender_from_config, GeminiProvider, MedscanConfig};
use std::sync::{Arc, Once};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::ApiError;
pub use state::AppState;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber (only once)
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| {
                    "medscan_server=debug,medscan_core=info,tower_http=debug".into()
                }),
            ))
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/analyze", post(routes::analyze_image))
        .route("/chat", post(routes::chat))
        // Middleware
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the server with an already loaded configuration
pub async fn run_server(config: MedscanConfig) -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting medscan server v{}...", medscan_core::version());

    medscan_core::config::validate(&config)?;

    let provider = GeminiProvider::from_config(&config.llm)?;
    tracing::info!(
        extraction_model = provider.extraction_model(),
        chat_model = provider.chat_model(),
        "Model provider ready"
    );

    let alerts = sender_from_config(&config.alerts);
    tracing::info!(sender = alerts.id(), "Caregiver alerts configured");

    let state = AppState::new(Arc::new(provider), alerts);
    let app = build_router(state, config.server.max_upload_bytes);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "active" }))
}

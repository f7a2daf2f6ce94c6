//! Main Entrypoint for the APL Speech Issue Skill Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading the APL document rendered by the demo intent.
//! 3. Building the skill dispatcher.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use apl_skill_api::{config::Config, router::create_router, state::AppState};
use apl_skill_core::{apl::AplDocument, apl_speech_issue_skill, diagnostics::TracingSink};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Building the skill...");

    // --- 3. Load the APL document and build the dispatcher ---
    let document = match &config.apl_document_path {
        Some(path) => AplDocument::from_path(path)
            .with_context(|| format!("Failed to load APL document from {}", path.display()))?,
        None => AplDocument::embedded().context("Embedded APL document is invalid")?,
    };
    let dispatcher = Arc::new(apl_speech_issue_skill(document, Arc::new(TracingSink)));

    let app_state = Arc::new(AppState {
        dispatcher: dispatcher.clone(),
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        user_agent = %dispatcher.user_agent(),
        skill_id_verification = config.skill_id.is_some(),
        bind_address = %config.bind_address,
        "Skill configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}

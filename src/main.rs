// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::calculator_service::CalculatorService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::memory_repository::InMemorySessionRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

const DEFAULT_LOG_FILTER: &str = "trap_hp=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InMemorySessionRepository::with_ttl(
        app_config.calculator.session_ttl(),
    ));

    // Create services (application layer)
    let calculator_service = CalculatorService::new(repository, app_config.calculator.delay());

    // Create application state
    let state = Arc::new(AppState { calculator_service });

    // Build router (presentation layer)
    let router = router(state);

    // Start server
    let addr = app_config.server.socket_addr()?;
    tracing::info!("Starting trap-hp service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::aggregate_service::AggregateLookup;
use crate::application::config_service::ConfigEditor;
use crate::application::dashboard_state::DashboardState;
use crate::application::gateway::ClientGateway;
use crate::application::loading::LoadingIndicator;
use crate::application::notifier::{NotificationCenter, Notifier};
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::application::script_service::ScriptService;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_transport::ReqwestTransport;
use crate::infrastructure::port_file::FilePortStore;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Backend gateway (infrastructure adapters injected here)
    let notifications = Arc::new(NotificationCenter::new());
    let gateway = Arc::new(ClientGateway::new(
        Arc::new(ReqwestTransport::new()),
        notifications.clone(),
        Arc::new(FilePortStore::new(config.state.path.clone())),
        config.backend.host.clone(),
        config.backend.default_port,
    ));

    // Create services (application layer)
    let dashboard = DashboardState::shared();
    let loading = LoadingIndicator::new();
    let scheduler = RefreshScheduler::new(
        gateway.clone(),
        dashboard.clone(),
        loading.clone(),
        config.refresh.interval(),
        config.backend.provider_window,
    );
    let aggregates = AggregateLookup::new(gateway.clone(), notifications.clone(), dashboard.clone());
    let scripts = ScriptService::new(gateway.clone(), notifications.clone(), loading.clone());
    let config_editor = Arc::new(ConfigEditor::new(gateway.clone(), notifications.clone(), loading));

    if gateway.initialize().await {
        if let Err(e) = scheduler.refresh().await {
            tracing::warn!(error = %e, "Initial provider refresh failed");
        }
    } else {
        notifications.error("Could not connect to server. Configure the server to continue.");
    }

    // Create application state
    let state = Arc::new(AppState {
        gateway,
        dashboard,
        scheduler: scheduler.clone(),
        aggregates,
        scripts,
        config_editor,
        notifications,
    });

    // Build router (presentation layer)
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = config.server.listen.parse()?;
    tracing::info!(%addr, "Starting perfmon-dashboard");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

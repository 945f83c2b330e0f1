use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use report_desk_api::config::config;
use report_desk_api::database::DatabaseManager;
use report_desk_api::services::UserService;
use report_desk_api::state::AppState;
use report_desk_api::{app, is_development};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("report_desk_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    config.validate().map_err(anyhow::Error::msg)?;
    info!("Starting Report Desk API in {:?} mode", config.environment);

    let store = DatabaseManager::open_store(&config.database)
        .await
        .context("failed to open store")?;
    if store.backend_name() == "memory" && !is_development!() {
        warn!("No DATABASE_URL configured, data will not survive a restart");
    }

    let state = AppState::with_local_storage(config.clone(), store);
    seed_superadmin(&state).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Report Desk API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Report Desk API stopped");
    Ok(())
}

async fn seed_superadmin(state: &AppState) -> anyhow::Result<()> {
    let security = &state.config.security;
    let (Some(email), Some(password)) = (
        security.superadmin_email.as_deref(),
        security.superadmin_password.as_deref(),
    ) else {
        return Ok(());
    };

    UserService::new(state)
        .seed_superadmin("Super Admin", email, password)
        .await
        .context("failed to seed superadmin")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

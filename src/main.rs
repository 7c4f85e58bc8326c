use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use edu_match_api::{
    config::Config,
    db::{create_pool, run_migrations, PgStore},
    routes::{create_router, AppState},
    services::ai::HttpAiClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("edu_match_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;

    let ai = HttpAiClient::from_config(&config);
    tracing::info!(ai_service_url = %config.ai_service_url, "AI client configured");

    let address = config.bind_address();
    let state = AppState::new(config, Arc::new(PgStore::new(pool)), Arc::new(ai));
    let app = create_router(state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

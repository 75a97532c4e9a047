use binge_breaker::{AppState, Config, FileStore, Repository, coach::GeminiClient, router};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let store = FileStore::open(&config.data_dir).await?;
    info!("storing data in {}", config.data_dir.display());

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set, coach will answer with fallback messages");
    }
    let coach = GeminiClient::new(
        config.gemini_base_url.as_str(),
        config.gemini_model.as_str(),
        config.gemini_api_key.clone(),
    )?;

    let state = AppState::new(Repository::new(Arc::new(store)), Arc::new(coach));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

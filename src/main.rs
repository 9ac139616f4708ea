mod config;
mod error;
mod middleware;
mod proxy;
mod routes;
mod state;
mod translate;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hanzi_translate_backend=debug,tower_http=debug")),
        )
        .init();

    let (config, loaded_path) = Config::discover()?;
    match loaded_path {
        Some(path) => info!("Loaded configuration from: {}", path),
        None => info!("No configuration file found, using defaults"),
    }

    if config.server_config.allowed_origins.is_empty() {
        info!("No allowed origins configured, cross-origin requests will be rejected");
    }

    let app_state = AppState::new(config.clone())?;
    let app = routes::create_app(app_state);

    let host: std::net::IpAddr = config
        .server_config
        .host
        .parse()
        .with_context(|| format!("HOST must be a valid IP address: {}", config.server_config.host))?;
    let addr = SocketAddr::from((host, config.server_config.port));
    info!("Listening: http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

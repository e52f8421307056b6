use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod deck_service;
mod errors;
mod handlers;
mod routes;
mod state;

use config::{AppConfig, DeckSettings};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path)?;

    // File logging is optional; the guard must live until shutdown
    let (file_layer, _log_guard) = match &config.server.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "api-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notebook_deck_api_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!("Loaded configuration from {}", config_path.display());

    let settings = DeckSettings::from_process_env(&config.export);
    if settings.enabled {
        tracing::info!(
            "Slide export enabled: outline model={:?}, image model={:?} ({})",
            settings.outline.model,
            settings.image.model,
            settings.image.binding
        );
    } else {
        tracing::info!("Slide export disabled (export.banana_ppt.enabled = false)");
    }

    let state = AppState::new(&config, settings).context("failed to initialize storage")?;
    let app = routes::build_router(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.server.host, config.server.port))?;
    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

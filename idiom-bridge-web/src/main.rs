mod config;
mod routes;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{WebConfig, preload_corpus};
use routes::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WebConfig::from_env()?;
    info!("🇱🇰 Starting idiom-bridge web server");
    info!("Idiom mapping: {}", config.idioms_path.display());

    let pipeline = config
        .build_pipeline()
        .map_err(|e| format!("Failed to initialize translator: {}", e))?;
    info!(
        "Loaded {} idioms, translating with {}",
        pipeline.list_idioms().count(),
        pipeline.provider_name()
    );

    let pipeline = Arc::new(pipeline);
    if config.corpus_path.is_some() {
        let status = preload_corpus(Arc::clone(&pipeline)).await?;
        info!("Parallel corpus: {}", status);
    }

    let state = AppState { pipeline };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("🚀 Server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

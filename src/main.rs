use anyhow::Result;
use tracing::info;

use facade_visualizer::config::Config;
use facade_visualizer::http::{self, AppState};
use facade_visualizer::store::DocStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("facade_visualizer=info".parse()?),
        )
        .init();

    info!("Starting facade visualizer service");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Open the document store
    let store = DocStore::open(&config.database_path)?;

    let port = config.port;
    let state = AppState::new(config, store);
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;

use spacemarket_favorites::config::Config;
use spacemarket_favorites::panel::{self, AppState};
use spacemarket_favorites::session::BrowserRunner;
use spacemarket_favorites::status::StatusBoard;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("spacemarket_favorites=info".parse()?),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let state = Arc::new(AppState {
        status: StatusBoard::new(),
        runner: Arc::new(BrowserRunner::new(Arc::clone(&config))),
        output_dir: config.output_dir.clone(),
    });

    let addr = config.bind_addr();
    info!("🏠 Spacemarket favorites collector");
    info!("==========================================");
    info!("Open http://{addr} in your browser");
    info!("Exports are written to {}", config.output_dir.display());
    info!("Press Ctrl+C to stop");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, panel::router(state)).await?;

    Ok(())
}

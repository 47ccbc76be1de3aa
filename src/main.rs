//! Work journal server
//!
//! Serves the journal, key settings and AI assistant endpoints

use anyhow::{Context, Result};
use tracing::{info, warn};
use worklog_ai::utils::logging::init_logging;
use worklog_ai::{create_router, version_info, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load server settings")?;

    init_logging(&settings.logging)?;
    info!("{}", version_info());

    if settings.is_dev_mode() {
        warn!("ENCRYPTION_KEY is not set; using the development fallback key. Do not use this in production");
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let app = create_router(settings).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Worklog server started!");
    info!("📝 Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

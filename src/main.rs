//! # Campus Hub
//!
//! REST backend for a campus social app: events, clubs, a student
//! marketplace and a post feed.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Storage backend (PostgreSQL or in-memory)
//! - HTTP server

use anyhow::Result;
use tracing::info;

use campus_hub::config::Settings;
use campus_hub::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    campus_hub::telemetry::init_tracing();

    info!("Starting Campus Hub...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        backend = ?settings.storage.backend,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}

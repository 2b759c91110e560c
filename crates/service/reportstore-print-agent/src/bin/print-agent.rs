//! Print agent entry point

use anyhow::Result;
use reportstore_print_agent::{create_router, AgentConfig, AppState, LpPrinter};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AgentConfig::from_env();
    let state = AppState {
        printer: Arc::new(LpPrinter::new(config.printer.clone())),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), printer = ?config.printer, "print agent listening");
    axum::serve(listener, router).await?;
    Ok(())
}

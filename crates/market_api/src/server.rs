use std::net::SocketAddr;
use std::sync::Arc;

use crate::{provider::QuoteProvider, router::create_router};

/// Run the valuation-ratio proxy
pub async fn run_server(
    provider: Arc<dyn QuoteProvider>,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_api=debug,tower_http=debug,axum=trace".into()),
        )
        .init();

    let app = create_router(provider);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    tracing::info!("Valuation-ratio proxy listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Claims REST API stub server.
//!
//! In-memory implementation of the endpoints `claims-client`'s `RestClient`
//! calls, seeded with the sample disputes. Data is lost on restart.
//!
//! Listens on `CLAIMS_STUB_PORT` (default 8091).

mod routes;
mod store;

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8091;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("CLAIMS_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = routes::router(store::AppState::seeded());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("claims-stub listening on {addr}");

    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;
    Ok(())
}

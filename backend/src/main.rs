//! Backend entry-point: loads configuration and starts the HTTP server.

use actix_web::web;
use tracing::{error, warn};
use tracing_subscriber::{fmt, EnvFilter};

use resolve_backend::inbound::http::health::HealthState;
use resolve_backend::server::{create_server, ServerConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env().map_err(|e| {
        error!(error = %e, "configuration failed");
        std::io::Error::other(e.to_string())
    })?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;

    health_state.mark_ready();
    server.await
}

//! Backend entry-point: loads settings, initialises logging, and serves the
//! REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use scaffold_backend::domain::ports::{FixturePersistenceProbe, PersistenceProbe};
use scaffold_backend::inbound::http::health::HealthState;
use scaffold_backend::outbound::persistence::TcpPersistenceProbe;
use scaffold_backend::settings::AppSettings;
use server::{ServerConfig, create_server};

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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let capturer = settings.trace_capturer().map_err(std::io::Error::other)?;

    let persistence: Arc<dyn PersistenceProbe> =
        match settings.database_addr().map_err(std::io::Error::other)? {
            Some(addr) => {
                let probe = TcpPersistenceProbe::new(addr, settings.probe_timeout(), capturer);
                info!(addr = %probe.addr(), "readiness will probe the database endpoint");
                Arc::new(probe)
            }
            None => {
                warn!("no database address configured; readiness uses the fixture probe");
                Arc::new(FixturePersistenceProbe)
            }
        };

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr).with_persistence(persistence);
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}

//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use scaffold_backend::domain::ports::{FixturePersistenceProbe, PersistenceProbe};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) persistence: Arc<dyn PersistenceProbe>,
}

impl ServerConfig {
    /// Construct a configuration that binds to `bind_addr` and reports the
    /// fixture probe until a persistence adapter is attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            persistence: Arc::new(FixturePersistenceProbe),
        }
    }

    /// Attach the persistence probe consulted by readiness checks.
    #[must_use]
    pub fn with_persistence(mut self, persistence: Arc<dyn PersistenceProbe>) -> Self {
        self.persistence = persistence;
        self
    }
}

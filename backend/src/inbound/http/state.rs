//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only depend on
//! domain ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FixturePersistenceProbe, PersistenceProbe};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub persistence: Arc<dyn PersistenceProbe>,
}

impl HttpState {
    /// Construct state from the persistence port.
    pub fn new(persistence: Arc<dyn PersistenceProbe>) -> Self {
        Self { persistence }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixturePersistenceProbe))
    }
}

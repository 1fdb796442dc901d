//! Port through which persistence adapters report their health.

use async_trait::async_trait;

use crate::domain::PersistenceError;

/// Checks that the backing store can serve requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceProbe: Send + Sync {
    /// Return `Ok(())` when the store is reachable.
    async fn check(&self) -> Result<(), PersistenceError>;
}

/// Fixture implementation for deployments without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePersistenceProbe;

#[async_trait]
impl PersistenceProbe for FixturePersistenceProbe {
    async fn check(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

//! Domain ports for the hexagonal boundary.

mod persistence_probe;

#[cfg(test)]
pub use persistence_probe::MockPersistenceProbe;
pub use persistence_probe::{FixturePersistenceProbe, PersistenceProbe};

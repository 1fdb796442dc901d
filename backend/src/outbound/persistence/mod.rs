//! Persistence adapters.
//!
//! Adapters build [`crate::domain::PersistenceError`] values with the
//! capturer chosen at configuration time so traces follow the deployment's
//! capture mode.

mod tcp_probe;

pub use tcp_probe::TcpPersistenceProbe;

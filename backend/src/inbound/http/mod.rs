//! HTTP inbound adapter.

pub mod error;
pub mod fallback;
pub mod health;
pub mod schemas;
pub mod state;

pub use error::{ApiResult, map_persistence_error};

//! Reachability probe for a database listening on a TCP socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::ports::PersistenceProbe;
use crate::domain::{PersistenceError, TraceCapturer};

/// Probes a database endpoint by opening, then dropping, a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpPersistenceProbe {
    addr: SocketAddr,
    connect_timeout: Duration,
    capturer: Arc<dyn TraceCapturer>,
}

impl TcpPersistenceProbe {
    /// Create a probe for `addr` that gives up after `connect_timeout`.
    pub fn new(
        addr: SocketAddr,
        connect_timeout: Duration,
        capturer: Arc<dyn TraceCapturer>,
    ) -> Self {
        Self {
            addr,
            connect_timeout,
            capturer,
        }
    }

    /// Endpoint checked by this probe.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl PersistenceProbe for TcpPersistenceProbe {
    async fn check(&self) -> Result<(), PersistenceError> {
        match timeout(self.connect_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_stream)) => {
                debug!(addr = %self.addr, "database endpoint reachable");
                Ok(())
            }
            Ok(Err(err)) => Err(PersistenceError::with_capturer(
                format!("database connection to {} failed: {err}", self.addr),
                self.capturer.as_ref(),
            )),
            Err(_) => Err(PersistenceError::with_capturer(
                format!(
                    "database connection to {} timed out after {}ms",
                    self.addr,
                    self.connect_timeout.as_millis()
                ),
                self.capturer.as_ref(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trace_capture::{DisabledCapturer, FallbackCapturer};
    use rstest::rstest;
    use tokio::net::TcpListener;

    // The listener is dropped on return, so the port refuses connections.
    async fn unused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        listener.local_addr().expect("listener address")
    }

    #[rstest]
    #[tokio::test]
    async fn reachable_endpoint_passes() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener address");
        let probe = TcpPersistenceProbe::new(
            addr,
            Duration::from_secs(2),
            Arc::new(DisabledCapturer),
        );

        assert_eq!(probe.addr(), addr);
        assert!(probe.check().await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn refused_endpoint_raises_persistence_error() {
        let addr = unused_addr().await;
        let probe = TcpPersistenceProbe::new(
            addr,
            Duration::from_secs(2),
            Arc::new(FallbackCapturer),
        );

        let err = probe.check().await.expect_err("nothing listens on the port");
        assert_eq!(err.name(), "PersistenceError");
        assert!(err.message().contains(&addr.to_string()));
        let stack = err.stack().expect("fallback capturer records a trace");
        assert!(stack.contains("tcp_probe.rs"), "stack was {stack}");
    }
}

use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Reachability check for a single declared port.
#[async_trait]
pub trait Prober: Send + Sync {
    /// `true` when the port accepts a connection. Never retries.
    async fn probe(&self, port: u16) -> bool;
}

/// Connects to `127.0.0.1:port` and closes the connection immediately.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl Default for TcpProber {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl TcpProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, port: u16) -> bool {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                true
            }
            Ok(Err(e)) => {
                tracing::debug!(port, "Error connecting to {}: {}", addr, e);
                false
            }
            Err(_) => {
                tracing::debug!(port, "Timed out connecting to {} after {:?}", addr, self.timeout);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_listening_port_is_healthy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(TcpProber::new().probe(port).await);
    }

    #[tokio::test]
    async fn test_closed_port_is_unhealthy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!TcpProber::new().probe(port).await);
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(TcpProber::default().timeout(), Duration::from_secs(2));
        assert_eq!(
            TcpProber::new()
                .with_timeout(Duration::from_millis(10))
                .timeout(),
            Duration::from_millis(10)
        );
    }
}

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tokio::{net::TcpStream, time::timeout};
use tracing::debug;

/// Reachability check consulted before every refresh.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn is_network_available(&self) -> bool;
}

/// Reports the network as always reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl NetworkProbe for AlwaysOnline {
    async fn is_network_available(&self) -> bool {
        true
    }
}

/// Considers the network reachable when a TCP connection to `addr` opens in time.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub const DEFAULT_ADDR: &'static str = "api.openweathermap.org:443";

    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self { addr: addr.into(), timeout }
    }

    /// Probe the host and port the weather requests will go to.
    ///
    /// Falls back to [`TcpProbe::DEFAULT_ADDR`] when `base_url` has no usable host.
    pub fn for_base_url(base_url: &str) -> Self {
        let addr = Url::parse(base_url).ok().and_then(|url| {
            let host = url.host_str()?.to_string();
            let port = url.port_or_known_default()?;
            Some(format!("{host}:{port}"))
        });

        match addr {
            Some(addr) => Self { addr, ..Self::default() },
            None => {
                debug!(base_url, "No host in base URL, probing default address");
                Self::default()
            }
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADDR, Duration::from_secs(3))
    }
}

#[async_trait]
impl NetworkProbe for TcpProbe {
    async fn is_network_available(&self) -> bool {
        match timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "Network probe failed");
                false
            }
            Err(_) => {
                debug!(addr = %self.addr, "Network probe timed out");
                false
            }
        }
    }
}

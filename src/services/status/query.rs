use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::services::status::protocol::{self, SlpResponse};
use crate::services::status::{QueryError, RawStatus};

/// One status query against a Minecraft server
#[async_trait]
pub trait StatusQuery: Send + Sync {
    async fn query(&self, host: &str, port: u16, timeout: Duration) -> Result<RawStatus, QueryError>;
}

const SRV_SERVICE: &str = "_minecraft._tcp";

/// Server List Ping client (handshake, status request, ping/pong).
///
/// Hostnames are looked up as `_minecraft._tcp.<host>` SRV records first, the
/// way the game client does, and fall back to the configured port.
#[derive(Clone)]
pub struct SlpClient {
    resolver: TokioAsyncResolver,
}

impl Default for SlpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SlpClient {
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            tracing::warn!("System resolver config unavailable ({}), using defaults for SRV lookups", e);
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }

    /// Host and port to dial. Lookup failures are not errors; the configured
    /// address is used instead.
    async fn srv_target(&self, host: &str, port: u16) -> (String, u16) {
        if !wants_srv(host) {
            return (host.to_string(), port);
        }

        let name = format!("{}.{}", SRV_SERVICE, host);
        let records = match self.resolver.srv_lookup(name.as_str()).await {
            Ok(lookup) => lookup
                .iter()
                .map(|srv| SrvRecord {
                    priority: srv.priority(),
                    weight: srv.weight(),
                    port: srv.port(),
                    target: srv.target().to_utf8(),
                })
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::debug!("No SRV record for {}: {}", host, e);
                return (host.to_string(), port);
            }
        };

        match pick_srv_target(records) {
            Some((target, srv_port)) => {
                tracing::debug!("SRV {} -> {}:{}", name, target, srv_port);
                (target, srv_port)
            }
            None => (host.to_string(), port),
        }
    }

    async fn resolve(host: &str, port: u16) -> Result<SocketAddr, QueryError> {
        let mut addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|_| QueryError::HostNotFound(host.to_string()))?;

        addrs
            .next()
            .ok_or_else(|| QueryError::HostNotFound(host.to_string()))
    }

    async fn ping(&self, host: &str, port: u16) -> Result<RawStatus, QueryError> {
        let (dial_host, dial_port) = self.srv_target(host, port).await;
        let addr = Self::resolve(&dial_host, dial_port).await?;
        let mut stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;

        stream.write_all(&protocol::handshake_packet(host, dial_port)).await?;
        stream.write_all(&protocol::status_request_packet()).await?;

        let json = protocol::read_status_json(&mut stream).await?;
        let response: SlpResponse = serde_json::from_str(&json)?;

        let payload = chrono::Utc::now().timestamp_millis();
        let started = Instant::now();
        stream.write_all(&protocol::ping_packet(payload)).await?;
        protocol::read_pong(&mut stream, payload).await?;
        let latency = started.elapsed().as_millis() as u64;

        tracing::debug!("Status query to {}:{} answered in {}ms", host, port, latency);

        Ok(response.into_raw(latency))
    }
}

#[async_trait]
impl StatusQuery for SlpClient {
    async fn query(&self, host: &str, port: u16, timeout: Duration) -> Result<RawStatus, QueryError> {
        match tokio::time::timeout(timeout, self.ping(host, port)).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout(timeout.as_millis() as u64)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SrvRecord {
    priority: u16,
    weight: u16,
    port: u16,
    target: String,
}

/// IP literals and localhost are dialed as configured
fn wants_srv(host: &str) -> bool {
    host.parse::<IpAddr>().is_err() && !host.eq_ignore_ascii_case("localhost")
}

/// Lowest priority wins, then highest weight. A target of "." means the
/// service is not offered there.
fn pick_srv_target(records: Vec<SrvRecord>) -> Option<(String, u16)> {
    let best = records
        .into_iter()
        .min_by(|a, b| a.priority.cmp(&b.priority).then(b.weight.cmp(&a.weight)))?;

    let target = best.target.trim_end_matches('.');
    if target.is_empty() {
        return None;
    }
    Some((target.to_string(), best.port))
}

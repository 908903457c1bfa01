//! Individual address resolution strategies.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use tokio::net::{TcpStream, lookup_host};

use crate::NetError;

/// Host contacted by the default outbound probe.
pub const DEFAULT_PROBE_TARGET: &str = "geysermc.org:80";

/// Upper bound on the default outbound probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// One way of finding the externally reachable local address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Open a TCP connection to a well-known host and read back the local
    /// address the OS picked for it. No data is exchanged; the connection
    /// is closed as soon as the address is known.
    ///
    /// Works behind NAT and on multi-homed machines, where the outbound
    /// interface is the one clients can most likely reach.
    OutboundProbe { target: String, timeout: Duration },

    /// Resolve a hostname to an address. `None` means this machine's own
    /// hostname.
    Hostname(Option<String>),
}

impl ResolveStrategy {
    /// Probe [`DEFAULT_PROBE_TARGET`] with [`DEFAULT_PROBE_TIMEOUT`].
    pub fn default_probe() -> Self {
        Self::OutboundProbe {
            target: DEFAULT_PROBE_TARGET.to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Resolve the local machine's hostname.
    pub fn local_hostname() -> Self {
        Self::Hostname(None)
    }

    /// Runs the strategy once.
    ///
    /// # Errors
    /// Whatever stopped this strategy from producing an address. The
    /// resolver logs it and moves on.
    pub async fn attempt(&self) -> Result<IpAddr, NetError> {
        match self {
            Self::OutboundProbe { target, timeout } => probe(target, *timeout).await,
            Self::Hostname(name) => resolve_hostname(name.as_deref()).await,
        }
    }
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutboundProbe { target, .. } => write!(f, "outbound probe to {target}"),
            Self::Hostname(Some(name)) => write!(f, "hostname {name}"),
            Self::Hostname(None) => write!(f, "local hostname"),
        }
    }
}

async fn probe(target: &str, timeout: Duration) -> Result<IpAddr, NetError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(target))
        .await
        .map_err(|_| NetError::ProbeTimeout {
            target: target.to_string(),
            timeout,
        })?
        .map_err(|source| NetError::Probe {
            target: target.to_string(),
            source,
        })?;

    let local = stream.local_addr().map_err(|source| NetError::Probe {
        target: target.to_string(),
        source,
    })?;
    // Dropping the stream closes the probe connection.
    drop(stream);

    Ok(local.ip())
}

async fn resolve_hostname(name: Option<&str>) -> Result<IpAddr, NetError> {
    let name = match name {
        Some(name) => name.to_string(),
        None => hostname::get()
            .map_err(NetError::Lookup)?
            .to_string_lossy()
            .into_owned(),
    };

    let addrs: Vec<IpAddr> = lookup_host((name.as_str(), 0))
        .await
        .map_err(NetError::Lookup)?
        .map(|addr| addr.ip())
        .collect();

    // Prefer IPv4, the address family directory clients expect.
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or(NetError::NoAddress(name))
}

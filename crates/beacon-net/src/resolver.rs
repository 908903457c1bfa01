//! The address resolver: an ordered, best-effort chain of strategies.

use std::net::IpAddr;

use crate::{AUTO, ResolveStrategy};

/// Resolves the IP address advertised to the presence directory.
///
/// ```text
/// remote_address != "auto" ──────────────────────────────▶ used verbatim
/// remote_address == "auto" ─▶ strategy 1 ─▶ strategy 2 ─▶ ... ─▶ bind address
///                              (first success wins; failures logged at debug)
/// ```
///
/// Resolution never fails: the host's bind address is the last resort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResolver {
    strategies: Vec<ResolveStrategy>,
}

impl AddressResolver {
    /// Creates a resolver that tries `strategies` in order.
    pub fn new(strategies: Vec<ResolveStrategy>) -> Self {
        Self { strategies }
    }

    /// The standard chain: outbound probe to `target`, then the local
    /// machine's hostname.
    pub fn with_probe(target: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::new(vec![
            ResolveStrategy::OutboundProbe {
                target: target.into(),
                timeout,
            },
            ResolveStrategy::local_hostname(),
        ])
    }

    /// The strategies, in the order they are tried.
    pub fn strategies(&self) -> &[ResolveStrategy] {
        &self.strategies
    }

    /// Resolves the address to advertise.
    ///
    /// An explicit `remote_address` is returned as-is, without validation.
    /// For [`AUTO`], the first strategy to succeed wins; if none does,
    /// `bind_address` (the host's configured bind address) is returned.
    pub async fn resolve_ip(&self, remote_address: &str, bind_address: &str) -> String {
        if remote_address != AUTO {
            tracing::debug!(ip = remote_address, "using configured remote address");
            return remote_address.to_string();
        }

        match self.detect().await {
            Some(ip) => ip.to_string(),
            None => {
                tracing::debug!(
                    ip = bind_address,
                    "all resolution strategies failed, using bind address"
                );
                bind_address.to_string()
            }
        }
    }

    /// Runs the strategy chain and returns the first address found.
    pub async fn detect(&self) -> Option<IpAddr> {
        for strategy in &self.strategies {
            match strategy.attempt().await {
                Ok(ip) => {
                    tracing::debug!(%ip, %strategy, "resolved advertised address");
                    return Some(ip);
                }
                Err(e) => {
                    tracing::debug!(error = %e, %strategy, "address strategy failed");
                }
            }
        }
        None
    }
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(vec![
            ResolveStrategy::default_probe(),
            ResolveStrategy::local_hostname(),
        ])
    }
}

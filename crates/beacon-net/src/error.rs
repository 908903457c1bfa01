use std::num::ParseIntError;
use std::time::Duration;

/// Errors that can occur while resolving the advertised address or port.
///
/// Address errors never escape [`AddressResolver`](crate::AddressResolver):
/// each strategy's failure is logged and the next one is tried. Only
/// [`NetError::InvalidPort`] reaches callers.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The outbound probe connection could not be opened.
    #[error("probe to {target} failed: {source}")]
    Probe {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The outbound probe did not connect within its time limit.
    #[error("probe to {target} timed out after {timeout:?}")]
    ProbeTimeout { target: String, timeout: Duration },

    /// Looking up the machine's hostname, or resolving it, failed.
    #[error("hostname lookup failed: {0}")]
    Lookup(#[source] std::io::Error),

    /// The lookup succeeded but produced no usable address.
    #[error("no address found for {0}")]
    NoAddress(String),

    /// A configured port is neither `auto` nor a valid port number.
    #[error("invalid port {value:?}: {reason}")]
    InvalidPort { value: String, reason: PortReason },
}

/// Why a configured port was rejected.
#[derive(Debug, thiserror::Error)]
pub enum PortReason {
    #[error("{0}")]
    NotANumber(#[from] ParseIntError),

    #[error("port 0 cannot be advertised")]
    Zero,
}

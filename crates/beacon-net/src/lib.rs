//! Address resolution for Beacon.
//!
//! Works out WHERE clients should connect: the IP and port advertised in
//! the session descriptor.
//!
//! - **Address**: an explicit value is used verbatim; [`AUTO`] runs an
//!   ordered chain of [`ResolveStrategy`]s through the [`AddressResolver`],
//!   falling back to the host's bind address when all of them fail.
//! - **Port**: an explicit value is parsed ([`resolve_port`]); [`AUTO`]
//!   uses the game server's own listening port.
//!
//! Resolution happens once, at bring-up. The advertised address is not
//! re-resolved afterwards.

mod error;
mod resolver;
mod strategy;

pub use error::{NetError, PortReason};
pub use resolver::AddressResolver;
pub use strategy::{DEFAULT_PROBE_TARGET, DEFAULT_PROBE_TIMEOUT, ResolveStrategy};

/// Sentinel meaning "work it out yourself" for both address and port.
pub const AUTO: &str = "auto";

/// Resolves the port to advertise.
///
/// `remote_port` is either [`AUTO`], in which case `listen_port` (the game
/// server's configured port) is used, or a literal port number.
///
/// # Errors
/// [`NetError::InvalidPort`] if the literal isn't a number in `1..=65535`.
pub fn resolve_port(remote_port: &str, listen_port: u16) -> Result<u16, NetError> {
    if remote_port == AUTO {
        return Ok(listen_port);
    }

    let invalid = |reason| NetError::InvalidPort {
        value: remote_port.to_string(),
        reason,
    };
    let port: u16 = remote_port
        .trim()
        .parse()
        .map_err(|e| invalid(PortReason::NotANumber(e)))?;
    if port == 0 {
        return Err(invalid(PortReason::Zero));
    }
    Ok(port)
}

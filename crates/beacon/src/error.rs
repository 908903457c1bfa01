//! Unified error type for Beacon.

use beacon_net::NetError;
use beacon_session::SessionError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    /// Loading or validating configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Address or port resolution failed.
    #[error(transparent)]
    Net(#[from] NetError),

    /// The session manager reported a failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// [`start`](crate::BroadcastController::start) was called more than once.
    #[error("broadcast already started")]
    AlreadyStarted,
}

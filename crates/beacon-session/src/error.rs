//! Error types for the session layer.

/// Errors a [`SessionManager`](crate::SessionManager) can report.
///
/// The controller treats these differently depending on WHEN they happen:
/// during bring-up both variants are fatal, during steady-state heartbeats
/// an `Update` failure is logged and retried on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The directory session could not be established
    /// (rejected by the directory, authentication failure, ...).
    #[error("session creation failed: {0}")]
    Creation(String),

    /// The descriptor could not be pushed to the directory.
    #[error("session update failed: {0}")]
    Update(String),
}

impl SessionError {
    /// Returns `true` for errors raised while establishing the session.
    pub fn is_creation(&self) -> bool {
        matches!(self, Self::Creation(_))
    }
}

//! The session manager interface.
//!
//! Beacon doesn't speak the presence directory's wire protocol itself,
//! nor does it handle directory authentication. That belongs to whatever
//! implements [`SessionManager`]: it owns the connection and the
//! directory-side session handle, and the lifecycle controller only calls
//! into it.

use std::future::Future;

use crate::{SessionError, SessionInfo};

/// Owns the directory connection and the session record behind it.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the manager is shared (behind an `Arc`)
///   between the bring-up task and the heartbeat task.
/// - Every returned future is `Send`, so the controller can drive these
///   calls from tasks on a multi-threaded runtime. Implementations can
///   still be written as plain `async fn`.
///
/// # Example
///
/// ```rust
/// use beacon_session::{SessionError, SessionInfo, SessionManager};
///
/// /// Accepts everything and remembers nothing.
/// struct NoopManager;
///
/// impl SessionManager for NoopManager {
///     async fn create_session(&self, _info: &SessionInfo) -> Result<(), SessionError> {
///         Ok(())
///     }
///
///     async fn update_session(&self, _info: &SessionInfo) -> Result<(), SessionError> {
///         Ok(())
///     }
///
///     async fn check_connection(&self) {}
/// }
/// ```
pub trait SessionManager: Send + Sync + 'static {
    /// Establishes the directory session and publishes the first descriptor.
    ///
    /// # Errors
    /// [`SessionError::Creation`] if the session could not be established,
    /// [`SessionError::Update`] if it was established but the initial
    /// publish failed. Both are fatal to bring-up.
    fn create_session(
        &self,
        info: &SessionInfo,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Pushes a fresh descriptor to the existing session.
    ///
    /// # Errors
    /// [`SessionError::Update`] when the push fails. The controller logs it
    /// and tries again on the next heartbeat.
    fn update_session(
        &self,
        info: &SessionInfo,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Verifies the underlying connection and repairs it if it dropped.
    ///
    /// Failures are handled (and logged) inside the manager; nothing is
    /// reported back to the controller.
    fn check_connection(&self) -> impl Future<Output = ()> + Send;
}

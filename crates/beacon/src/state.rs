//! Lifecycle state machine of the broadcast controller.

use std::fmt;

/// Where the controller is in its lifecycle.
///
/// ```text
/// Uninitialized → Resolving → Creating ─┬→ Active ⇄ Updating
///                                       └→ Failed
/// ```
///
/// - **Uninitialized**: constructed, `start()` not called (or rejected).
/// - **Resolving**: bring-up dispatched, working out address and port.
/// - **Creating**: descriptor built, waiting on the session manager.
/// - **Active**: session exists, heartbeat scheduled.
/// - **Updating**: a heartbeat tick is running.
/// - **Failed**: bring-up failed. Terminal, nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    Resolving,
    Creating,
    Active,
    Updating,
    Failed,
}

impl LifecycleState {
    /// Returns `true` if moving to `target` is allowed.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Uninitialized, Self::Resolving)
                | (Self::Resolving, Self::Creating)
                | (Self::Creating, Self::Active)
                | (Self::Creating, Self::Failed)
                | (Self::Active, Self::Updating)
                | (Self::Updating, Self::Active)
        )
    }

    /// Returns `true` once the directory session exists.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Active | Self::Updating)
    }

    /// Returns `true` for states nothing ever leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Resolving => write!(f, "Resolving"),
            Self::Creating => write!(f, "Creating"),
            Self::Active => write!(f, "Active"),
            Self::Updating => write!(f, "Updating"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

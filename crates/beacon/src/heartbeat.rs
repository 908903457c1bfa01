//! The repeating heartbeat: keeps the directory session alive and its
//! player count current.

use std::sync::Arc;

use beacon_session::{SessionInfo, SessionManager};
use beacon_tick::RepeatingTask;
use tokio::sync::watch;

use crate::controller::transition;
use crate::{HostServer, LifecycleState};

/// One heartbeat per tick:
///
/// 1. ask the manager to check (and repair) its connection,
/// 2. re-sample the player count into the descriptor,
/// 3. push the descriptor.
///
/// The heartbeat owns the descriptor outright. Ticks never overlap, so
/// mutating it needs no lock.
pub(crate) struct Heartbeat<M, H> {
    pub(crate) info: SessionInfo,
    pub(crate) manager: Arc<M>,
    pub(crate) host: Arc<H>,
    pub(crate) state: Arc<watch::Sender<LifecycleState>>,
}

impl<M: SessionManager, H: HostServer> RepeatingTask for Heartbeat<M, H> {
    async fn tick(&mut self) {
        transition(&self.state, LifecycleState::Updating);

        self.manager.check_connection().await;

        let players = self.info.set_players(self.host.player_count());
        match self.manager.update_session(&self.info).await {
            Ok(()) => {
                tracing::debug!(players, "session updated");
            }
            Err(e) => {
                // Not fatal: the next tick tries again.
                tracing::error!(error = %e, players, "failed to update session");
            }
        }

        transition(&self.state, LifecycleState::Active);
    }
}

//! The session lifecycle controller.
//!
//! Ties the layers together:
//!
//! ```text
//! config ─▶ resolver ─▶ SessionInfo ─▶ SessionManager::create_session
//!                                          │ ok
//!                                          ▼
//!                          every update_interval: check_connection
//!                                             → re-sample players
//!                                             → update_session
//! ```
//!
//! Bring-up runs as a one-shot background task so `start()` returns right
//! away; the outbound address probe can take as long as a connect timeout.
//! The heartbeat is only scheduled once the session exists.

use std::sync::{Arc, OnceLock};

use beacon_net::{AddressResolver, resolve_port};
use beacon_session::{SessionInfo, SessionManager};
use beacon_tick::{TaskHandle, TaskScheduler};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::heartbeat::Heartbeat;
use crate::{BeaconError, BroadcastConfig, HostServer, LifecycleState};

/// Keeps one session advertised on the presence directory for the
/// lifetime of the host process.
///
/// # Example
///
/// ```rust,ignore
/// use beacon::prelude::*;
///
/// let controller = BroadcastController::new(
///     BroadcastConfig::load_or_create(&data_dir)?,
///     Arc::new(my_session_manager),
///     Arc::new(my_host),
///     TokioScheduler::current(),
/// );
/// controller.start()?; // returns immediately
/// ```
pub struct BroadcastController<M, H, S> {
    config: BroadcastConfig,
    resolver: AddressResolver,
    manager: Arc<M>,
    host: Arc<H>,
    scheduler: Arc<S>,
    state: Arc<watch::Sender<LifecycleState>>,
    bring_up: OnceLock<TaskHandle>,
    heartbeat: Arc<OnceLock<TaskHandle>>,
    shutdown: CancellationToken,
}

impl<M, H, S> BroadcastController<M, H, S>
where
    M: SessionManager,
    H: HostServer,
    S: TaskScheduler,
{
    /// Creates an idle controller. Nothing happens until
    /// [`start`](Self::start).
    pub fn new(config: BroadcastConfig, manager: Arc<M>, host: Arc<H>, scheduler: S) -> Self {
        let resolver = config.resolver();
        let (state, _) = watch::channel(LifecycleState::Uninitialized);
        Self {
            config,
            resolver,
            manager,
            host,
            scheduler: Arc::new(scheduler),
            state: Arc::new(state),
            bring_up: OnceLock::new(),
            heartbeat: Arc::new(OnceLock::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Replaces the resolver built from the probe settings.
    pub fn with_resolver(mut self, resolver: AddressResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Dispatches bring-up to the background and returns immediately.
    ///
    /// The port is resolved here, so a malformed `remote_port` reaches the
    /// caller and the controller stays `Uninitialized`. Everything after
    /// that (address detection, session creation) reports through logs
    /// and [`state`](Self::state).
    ///
    /// # Errors
    /// - [`BeaconError::AlreadyStarted`] on any call after the first
    ///   successful one.
    /// - [`BeaconError::Net`] if `remote_port` isn't a valid port.
    pub fn start(&self) -> Result<(), BeaconError> {
        if self.bring_up.get().is_some() {
            return Err(BeaconError::AlreadyStarted);
        }

        let port = resolve_port(&self.config.remote_port, self.host.port()).inspect_err(|e| {
            tracing::error!(error = %e, "failed to resolve remote port");
        })?;

        let task = BringUp {
            remote_address: self.config.remote_address.clone(),
            port,
            resolver: self.resolver.clone(),
            interval: self.config.update_interval(),
            manager: Arc::clone(&self.manager),
            host: Arc::clone(&self.host),
            scheduler: Arc::clone(&self.scheduler),
            state: Arc::clone(&self.state),
            heartbeat: Arc::clone(&self.heartbeat),
            shutdown: self.shutdown.clone(),
        };

        // `get_or_init` runs the closure at most once, even when racing.
        let mut dispatched = false;
        self.bring_up.get_or_init(|| {
            dispatched = true;
            transition(&self.state, LifecycleState::Resolving);
            self.scheduler.run_once(task.run())
        });

        if dispatched {
            Ok(())
        } else {
            Err(BeaconError::AlreadyStarted)
        }
    }

    /// Stops the heartbeat, or the bring-up if it's still running.
    ///
    /// A heartbeat tick already in progress finishes; no new one starts.
    /// The directory session itself is left to expire on its own.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        if let Some(handle) = self.bring_up.get() {
            handle.cancel();
        }
        if let Some(handle) = self.heartbeat.get() {
            handle.cancel();
        }
        tracing::info!(state = %self.state(), "broadcast shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Receiver that observes every lifecycle transition.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Whether the heartbeat has been scheduled (bring-up succeeded).
    pub fn heartbeat_scheduled(&self) -> bool {
        self.heartbeat.get().is_some()
    }

    /// Completed heartbeat ticks, `None` before the heartbeat exists.
    pub fn heartbeat_ticks(&self) -> Option<u64> {
        self.heartbeat.get().map(TaskHandle::ticks)
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }
}

/// Applies a lifecycle transition, ignoring (and logging) illegal ones.
pub(crate) fn transition(state: &watch::Sender<LifecycleState>, next: LifecycleState) {
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            tracing::debug!(from = %current, to = %next, "lifecycle transition");
            *current = next;
            true
        } else {
            tracing::warn!(from = %current, to = %next, "ignoring invalid lifecycle transition");
            false
        }
    });
}

// ---------------------------------------------------------------------------
// Bring-up
// ---------------------------------------------------------------------------

/// Everything the one-shot bring-up task needs, moved into it.
struct BringUp<M, H, S> {
    remote_address: String,
    port: u16,
    resolver: AddressResolver,
    interval: std::time::Duration,
    manager: Arc<M>,
    host: Arc<H>,
    scheduler: Arc<S>,
    state: Arc<watch::Sender<LifecycleState>>,
    heartbeat: Arc<OnceLock<TaskHandle>>,
    shutdown: CancellationToken,
}

impl<M, H, S> BringUp<M, H, S>
where
    M: SessionManager,
    H: HostServer,
    S: TaskScheduler,
{
    async fn run(self) {
        tracing::info!("setting up session");

        let ip = self
            .resolver
            .resolve_ip(&self.remote_address, &self.host.bind_address())
            .await;

        let info = SessionInfo::builder(ip, self.port)
            .host_name(self.host.host_name())
            .world_name(self.host.world_name())
            .game_version(self.host.version(), self.host.protocol())
            .max_players(self.host.max_players())
            .players(self.host.player_count())
            .build();

        transition(&self.state, LifecycleState::Creating);

        if let Err(e) = self.manager.create_session(&info).await {
            tracing::error!(error = %e, "failed to create session");
            transition(&self.state, LifecycleState::Failed);
            return;
        }

        tracing::info!(
            ip = info.ip(),
            port = info.port(),
            players = info.players(),
            max_players = info.max_players(),
            "session created"
        );
        transition(&self.state, LifecycleState::Active);

        let heartbeat = Heartbeat {
            info,
            manager: self.manager,
            host: self.host,
            state: Arc::clone(&self.state),
        };
        let handle = self
            .heartbeat
            .get_or_init(|| self.scheduler.run_repeating(heartbeat, self.interval, self.interval));

        // shutdown() may have looked for the heartbeat before it existed.
        if self.shutdown.is_cancelled() {
            handle.cancel();
        }
    }
}

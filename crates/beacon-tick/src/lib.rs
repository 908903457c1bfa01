//! Background task scheduler for Beacon.
//!
//! Two kinds of work run off the caller's thread:
//!
//! - **One-shot tasks** ([`TaskScheduler::run_once`]): e.g. session bring-up,
//!   which may block on network probes and must never stall the host.
//! - **Repeating tasks** ([`TaskScheduler::run_repeating`]): e.g. the
//!   heartbeat, run with fixed-delay semantics.
//!
//! # Fixed-delay repetition
//!
//! ```text
//! start ──initial_delay──▶ tick ──period──▶ tick ──period──▶ tick ...
//!                           └─ runs to completion before the next delay starts
//! ```
//!
//! The next delay is measured from the END of the previous tick, so ticks
//! never overlap and a slow tick simply pushes the schedule back.
//!
//! # Cancellation
//!
//! Every task gets a child of the scheduler's root
//! [`CancellationToken`]. Cancelling a [`TaskHandle`] stops that task;
//! [`TokioScheduler::shutdown`] stops all of them. A tick that is already
//! running is never interrupted, cancellation is only observed while waiting.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Smallest period a repeating task may use. Zero would spin.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

// ---------------------------------------------------------------------------
// Task traits
// ---------------------------------------------------------------------------

/// A unit of work executed over and over by [`TaskScheduler::run_repeating`].
///
/// The task is owned by the scheduler loop and gets `&mut self` each tick,
/// so per-task state (a descriptor, counters) lives in the struct itself
/// and needs no locking: ticks run strictly one after another.
pub trait RepeatingTask: Send + 'static {
    /// Runs one tick. The next tick is not scheduled until this returns.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Submits background work.
///
/// Callers depend on this trait rather than a concrete runtime so tests
/// (or a host with its own executor) can substitute another implementation.
pub trait TaskScheduler: Send + Sync + 'static {
    /// Runs `task` once, in the background. Returns immediately.
    fn run_once<F>(&self, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static;

    /// Runs `task` first after `initial_delay`, then repeatedly with
    /// `period` between the end of one tick and the start of the next.
    fn run_repeating<T>(&self, task: T, initial_delay: Duration, period: Duration) -> TaskHandle
    where
        T: RepeatingTask;
}

// ---------------------------------------------------------------------------
// Task handle
// ---------------------------------------------------------------------------

/// Handle to a scheduled task.
///
/// Dropping the handle does NOT stop the task, it keeps running until it
/// finishes or is cancelled.
#[derive(Debug)]
pub struct TaskHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
}

impl TaskHandle {
    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the underlying task has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Number of completed runs: 0 or 1 for one-shot tasks, the number of
    /// finished ticks for repeating ones.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Waits for the task to exit.
    ///
    /// # Errors
    /// Returns the [`JoinError`] if the task panicked.
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await
    }
}

// ---------------------------------------------------------------------------
// Tokio implementation
// ---------------------------------------------------------------------------

/// [`TaskScheduler`] backed by a Tokio runtime.
///
/// Holds a runtime [`Handle`] rather than relying on the ambient runtime,
/// so tasks can be submitted from plain (non-async) initialization code.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
    root: CancellationToken,
}

impl TokioScheduler {
    /// Creates a scheduler that spawns onto `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            root: CancellationToken::new(),
        }
    }

    /// Creates a scheduler on the runtime of the current context.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Cancels every task this scheduler (or a clone of it) has spawned.
    pub fn shutdown(&self) {
        debug!("scheduler shutdown requested");
        self.root.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl TaskScheduler for TokioScheduler {
    fn run_once<F>(&self, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.root.child_token();
        let ticks = Arc::new(AtomicU64::new(0));

        let token = cancel.clone();
        let counter = Arc::clone(&ticks);
        let join = self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("one-shot task cancelled");
                }
                _ = task => {
                    counter.fetch_add(1, Ordering::Release);
                }
            }
        });

        TaskHandle { cancel, join, ticks }
    }

    fn run_repeating<T>(&self, task: T, initial_delay: Duration, period: Duration) -> TaskHandle
    where
        T: RepeatingTask,
    {
        let period = validated_period(period);
        let cancel = self.root.child_token();
        let ticks = Arc::new(AtomicU64::new(0));

        debug!(
            initial_delay_ms = initial_delay.as_millis() as u64,
            period_ms = period.as_millis() as u64,
            "repeating task scheduled"
        );

        let join = self.runtime.spawn(run_fixed_delay(
            task,
            initial_delay,
            period,
            cancel.clone(),
            Arc::clone(&ticks),
        ));

        TaskHandle { cancel, join, ticks }
    }
}

/// Clamp a zero period up to [`MIN_PERIOD`].
fn validated_period(period: Duration) -> Duration {
    if period < MIN_PERIOD {
        warn!(
            period_ms = period.as_millis() as u64,
            "repeating period below minimum, clamping"
        );
        MIN_PERIOD
    } else {
        period
    }
}

/// The fixed-delay loop behind [`TokioScheduler::run_repeating`].
async fn run_fixed_delay<T: RepeatingTask>(
    mut task: T,
    initial_delay: Duration,
    period: Duration,
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
) {
    let mut delay = initial_delay;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        let started = Instant::now();
        task.tick().await;
        let elapsed = started.elapsed();
        let n = ticks.fetch_add(1, Ordering::Release) + 1;

        if elapsed > period {
            warn!(
                tick = n,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                period_ms = period.as_secs_f64() * 1000.0,
                "tick took longer than its period"
            );
        } else {
            trace!(tick = n, "tick finished");
        }

        delay = period;
    }

    debug!(ticks = ticks.load(Ordering::Acquire), "repeating task stopped");
}

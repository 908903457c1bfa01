//! Integration tests for the background task scheduler.
//!
//! Uses `start_paused = true` so Tokio's clock auto-advances: sleeping in
//! the test body jumps straight to the next timer instead of waiting.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_tick::{MIN_PERIOD, RepeatingTask, TaskScheduler, TokioScheduler};
use tokio::time::Instant;

// =========================================================================
// Helpers
// =========================================================================

const SECS_30: Duration = Duration::from_secs(30);

/// Counts ticks and records when each one started and finished.
struct Recorder {
    base: Instant,
    work: Duration,
    count: Arc<AtomicU32>,
    in_flight: Arc<AtomicU32>,
    max_in_flight: Arc<AtomicU32>,
    spans: Arc<Mutex<Vec<(Duration, Duration)>>>,
}

impl Recorder {
    fn new(work: Duration) -> Self {
        Self {
            base: Instant::now(),
            work,
            count: Arc::new(AtomicU32::new(0)),
            in_flight: Arc::new(AtomicU32::new(0)),
            max_in_flight: Arc::new(AtomicU32::new(0)),
            spans: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn probe(&self) -> Probe {
        Probe {
            count: Arc::clone(&self.count),
            max_in_flight: Arc::clone(&self.max_in_flight),
            spans: Arc::clone(&self.spans),
        }
    }
}

impl RepeatingTask for Recorder {
    async fn tick(&mut self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let start = self.base.elapsed();

        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }

        let end = self.base.elapsed();
        self.spans.lock().unwrap().push((start, end));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Read side of a [`Recorder`] that stays with the test after the
/// recorder moves into the scheduler.
struct Probe {
    count: Arc<AtomicU32>,
    max_in_flight: Arc<AtomicU32>,
    spans: Arc<Mutex<Vec<(Duration, Duration)>>>,
}

impl Probe {
    fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    fn spans(&self) -> Vec<(Duration, Duration)> {
        self.spans.lock().unwrap().clone()
    }
}

// =========================================================================
// One-shot tasks
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_run_once_executes_in_background() {
    let scheduler = TokioScheduler::current();
    let done = Arc::new(AtomicU32::new(0));

    let flag = Arc::clone(&done);
    let handle = scheduler.run_once(async move {
        flag.fetch_add(1, Ordering::SeqCst);
    });

    // Nothing ran yet: run_once only submits.
    assert_eq!(done.load(Ordering::SeqCst), 0);

    handle.join().await.expect("task should not panic");
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_once_counts_completion() {
    let scheduler = TokioScheduler::current();
    let handle = scheduler.run_once(async {});

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(handle.is_finished());
    assert_eq!(handle.ticks(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_one_shot_never_completes() {
    let scheduler = TokioScheduler::current();
    let done = Arc::new(AtomicU32::new(0));

    let flag = Arc::clone(&done);
    let handle = scheduler.run_once(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        flag.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.cancel();
    assert!(handle.is_cancelled());

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(done.load(Ordering::SeqCst), 0);
    assert_eq!(handle.ticks(), 0);
    assert!(handle.is_finished());
}

// =========================================================================
// Repeating tasks: timing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_tick_waits_for_initial_delay() {
    let scheduler = TokioScheduler::current();
    let recorder = Recorder::new(Duration::ZERO);
    let probe = recorder.probe();

    let _handle = scheduler.run_repeating(recorder, SECS_30, SECS_30);

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(probe.count(), 0, "no tick before the initial delay");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(probe.count(), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(probe.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_delay_is_measured_from_end_of_tick() {
    let scheduler = TokioScheduler::current();
    let recorder = Recorder::new(Duration::from_secs(10));
    let probe = recorder.probe();

    let _handle = scheduler.run_repeating(recorder, SECS_30, SECS_30);
    tokio::time::sleep(Duration::from_secs(125)).await;

    let starts: Vec<u64> = probe.spans().iter().map(|(s, _)| s.as_secs()).collect();
    // 30 → tick until 40 → wait 30 → 70 → tick until 80 → wait 30 → 110.
    assert_eq!(starts, vec![30, 70, 110]);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_never_overlap_when_slower_than_period() {
    let scheduler = TokioScheduler::current();
    // Each tick takes 45s, longer than the 30s period.
    let recorder = Recorder::new(Duration::from_secs(45));
    let probe = recorder.probe();

    let handle = scheduler.run_repeating(recorder, SECS_30, SECS_30);
    tokio::time::sleep(Duration::from_secs(400)).await;

    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);

    let spans = probe.spans();
    assert!(spans.len() >= 3);
    for pair in spans.windows(2) {
        let (_, prev_end) = pair[0];
        let (next_start, _) = pair[1];
        assert!(
            next_start >= prev_end + SECS_30,
            "tick started at {next_start:?}, previous ended at {prev_end:?}"
        );
    }
    assert_eq!(handle.ticks(), spans.len() as u64);
}

#[tokio::test(start_paused = true)]
async fn test_zero_period_is_clamped_not_spinning() {
    let scheduler = TokioScheduler::current();
    let recorder = Recorder::new(Duration::ZERO);
    let probe = recorder.probe();

    let handle = scheduler.run_repeating(recorder, Duration::ZERO, Duration::ZERO);
    tokio::time::sleep(MIN_PERIOD * 10 + Duration::from_micros(500)).await;
    handle.cancel();

    let count = probe.count();
    assert!(count >= 1, "clamped task should still tick");
    assert!(count <= 11, "at most one tick per millisecond, got {count}");
}

// =========================================================================
// Repeating tasks: cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_future_ticks() {
    let scheduler = TokioScheduler::current();
    let recorder = Recorder::new(Duration::ZERO);
    let probe = recorder.probe();

    let handle = scheduler.run_repeating(recorder, SECS_30, SECS_30);
    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(probe.count(), 2);

    handle.cancel();
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(probe.count(), 2);
    assert!(handle.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_lets_running_tick_finish() {
    let scheduler = TokioScheduler::current();
    let recorder = Recorder::new(Duration::from_secs(20));
    let probe = recorder.probe();

    let handle = scheduler.run_repeating(recorder, SECS_30, SECS_30);

    // Tick 1 runs from 30s to 50s; cancel in the middle of it.
    tokio::time::sleep(Duration::from_secs(40)).await;
    handle.cancel();

    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(probe.count(), 1, "the in-flight tick completes");
    assert_eq!(probe.spans()[0].1.as_secs(), 50);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_shutdown_stops_all_tasks() {
    let scheduler = TokioScheduler::current();
    let a = Recorder::new(Duration::ZERO);
    let b = Recorder::new(Duration::ZERO);
    let (probe_a, probe_b) = (a.probe(), b.probe());

    let handle_a = scheduler.run_repeating(a, SECS_30, SECS_30);
    let handle_b = scheduler.run_repeating(b, Duration::from_secs(10), Duration::from_secs(10));

    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(probe_a.count(), 1);
    assert_eq!(probe_b.count(), 3);

    scheduler.shutdown();
    assert!(scheduler.is_shut_down());
    assert!(handle_a.is_cancelled());
    assert!(handle_b.is_cancelled());

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(probe_a.count(), 1);
    assert_eq!(probe_b.count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_keeps_task_running() {
    let scheduler = TokioScheduler::current();
    let recorder = Recorder::new(Duration::ZERO);
    let probe = recorder.probe();

    drop(scheduler.run_repeating(recorder, SECS_30, SECS_30));

    tokio::time::sleep(Duration::from_secs(95)).await;
    assert_eq!(probe.count(), 3);
}

#[test]
fn test_scheduler_accepts_runtime_handle_from_sync_code() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let scheduler = TokioScheduler::new(runtime.handle().clone());

    let done = Arc::new(AtomicU32::new(0));
    let flag = Arc::clone(&done);
    let handle = scheduler.run_once(async move {
        flag.fetch_add(1, Ordering::SeqCst);
    });

    runtime.block_on(handle.join()).unwrap();
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

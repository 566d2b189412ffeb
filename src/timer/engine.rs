//! Session timer engine.
//!
//! Owns elapsed-time accounting and phase classification for a breathing
//! session. Elapsed time is always derived from a monotonic clock reading
//! against the stored `running_since` instant plus the frozen baseline —
//! never from counting sampling ticks — so delayed or dropped ticks cannot
//! drift the session clock.
//!
//! Samples are published over a watch channel; renderers subscribe and
//! react to changes. The background sampling task republishes every
//! `sample_interval` while the session runs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::store::SettingsStore;
use crate::timer::phase::{PhaseDuration, PhaseKind, classify};

/// Persistence key for the configured phase duration.
pub const PHASE_DURATION_KEY: &str = "phase-duration";

/// Default sampling period for the background publication task.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Published Samples
// ============================================================================

/// A published observation of the session clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSample {
    /// Accumulated session time.
    pub elapsed: Duration,
    /// Phase the session is currently in.
    pub phase: PhaseKind,
    /// Whether the current phase is a hold.
    pub is_hold: bool,
    /// Whether the session clock is advancing.
    pub is_running: bool,
    /// Restart token: bumped on every reset so bound renderers can
    /// replay from a neutral state.
    pub epoch: u64,
}

impl TimerSample {
    const fn neutral(epoch: u64) -> Self {
        Self {
            elapsed: Duration::ZERO,
            phase: PhaseKind::Inhale,
            is_hold: false,
            is_running: false,
            epoch,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Construction options for [`TimerEngine`].
#[derive(Debug, Clone, Copy)]
pub struct TimerOptions {
    /// Phase duration used when the store holds no usable value.
    pub default_duration: PhaseDuration,
    /// Period of the background sampling task.
    pub sample_interval: Duration,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            default_duration: PhaseDuration::default(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

struct TimerState {
    /// Frozen baseline: time accumulated before the current run segment.
    elapsed: Duration,
    /// Set while running; the live segment is measured against it.
    running_since: Option<Instant>,
    duration: PhaseDuration,
    epoch: u64,
    /// Generation of the active sampling task. A tick whose generation
    /// no longer matches must not publish.
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Drift-resistant session timer with phase classification.
///
/// All five operations serialize on one internal lock; the sampling task
/// re-checks its cancellation token and generation before every
/// publication, so a tick scheduled before `pause`/`reset` is a no-op.
/// Publication happens under the same lock, which fixes the order of
/// samples on the watch channel. The lock is never held across an await.
pub struct TimerEngine {
    state: Mutex<TimerState>,
    tx: watch::Sender<TimerSample>,
    store: Arc<dyn SettingsStore>,
    sample_interval: Duration,
}

impl TimerEngine {
    /// Creates an engine, loading the phase duration from the store.
    ///
    /// A missing, malformed, or non-finite stored value silently falls
    /// back to `options.default_duration`; out-of-range numeric values
    /// are clamped.
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>, options: TimerOptions) -> Self {
        let duration = store
            .get(PHASE_DURATION_KEY)
            .and_then(|raw| PhaseDuration::parse(&raw))
            .unwrap_or(options.default_duration);

        let (tx, _) = watch::channel(TimerSample::neutral(0));

        Self {
            state: Mutex::new(TimerState {
                elapsed: Duration::ZERO,
                running_since: None,
                duration,
                epoch: 0,
                generation: 0,
                cancel: None,
            }),
            tx,
            store,
            sample_interval: options.sample_interval,
        }
    }

    /// Subscribes to published samples.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimerSample> {
        self.tx.subscribe()
    }

    /// Currently configured phase duration.
    #[must_use]
    pub fn phase_duration(&self) -> PhaseDuration {
        self.lock().duration
    }

    /// Whether the session clock is advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().running_since.is_some()
    }

    /// Computes the current sample without mutating any state.
    #[must_use]
    pub fn sample(&self) -> TimerSample {
        Self::observe(&self.lock(), Instant::now())
    }

    /// Starts the session clock and the sampling task.
    ///
    /// No-op if already running. Returns the task handle so callers can
    /// hold or await it; the task ends when `pause` or `reset` cancels it.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let token = CancellationToken::new();
        let generation;
        {
            let mut state = self.lock();
            if state.running_since.is_some() {
                return None;
            }
            let now = Instant::now();
            state.running_since = Some(now);
            state.generation += 1;
            generation = state.generation;
            state.cancel = Some(token.clone());

            let sample = Self::observe(&state, now);
            self.tx.send_replace(sample);
        }

        let engine = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut ticker = interval(engine.sample_interval);
            // Delayed ticks are dropped: elapsed time comes from the
            // clock, not the tick count.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!("sampling task cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !engine.publish_tick(generation) {
                            break;
                        }
                    }
                }
            }
        }))
    }

    /// Freezes the session clock.
    ///
    /// Folds the live segment into the elapsed baseline, cancels the
    /// sampling task, and republishes the frozen sample. No-op if not
    /// running.
    pub fn pause(&self) {
        let mut state = self.lock();
        let Some(since) = state.running_since.take() else {
            return;
        };
        let now = Instant::now();
        state.elapsed += now.duration_since(since);
        state.generation += 1;
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        self.tx.send_replace(Self::observe(&state, now));
    }

    /// Returns the session to its neutral state.
    ///
    /// Cancels any sampling task, zeroes the clock, and bumps the restart
    /// epoch so bound renderers replay from scratch.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation += 1;
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        state.elapsed = Duration::ZERO;
        state.running_since = None;
        state.epoch += 1;
        self.tx.send_replace(TimerSample::neutral(state.epoch));
    }

    /// Reconfigures the phase duration, quantizing and clamping the input.
    ///
    /// Persists the new value best-effort. While running, the hold flag
    /// is recomputed from the current elapsed time against the new
    /// duration without touching the elapsed baseline; while stopped, the
    /// published flag is cleared until the next start.
    pub fn set_phase_duration(&self, seconds: f64) -> PhaseDuration {
        let duration = PhaseDuration::from_secs_f64(seconds);
        {
            let mut state = self.lock();
            state.duration = duration;
            let mut sample = Self::observe(&state, Instant::now());
            if state.running_since.is_none() {
                sample.is_hold = false;
            }
            self.tx.send_replace(sample);
        }
        self.store.set(PHASE_DURATION_KEY, &duration.to_string());
        duration
    }

    /// Publishes one tick for the given task generation.
    ///
    /// Returns `false` when the generation is stale — the tick was
    /// scheduled before a cancellation and must leave state untouched.
    fn publish_tick(&self, generation: u64) -> bool {
        let state = self.lock();
        if state.generation != generation || state.running_since.is_none() {
            return false;
        }
        self.tx.send_replace(Self::observe(&state, Instant::now()));
        true
    }

    fn observe(state: &TimerState, now: Instant) -> TimerSample {
        let elapsed = state
            .running_since
            .map_or(state.elapsed, |since| state.elapsed + now.duration_since(since));
        let phase = classify(elapsed, state.duration);
        TimerSample {
            elapsed,
            phase,
            is_hold: phase.is_hold(),
            is_running: state.running_since.is_some(),
            epoch: state.epoch,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TimerState> {
        self.state.lock().expect("timer state lock poisoned")
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("TimerEngine")
            .field("elapsed", &state.elapsed)
            .field("is_running", &state.running_since.is_some())
            .field("duration", &state.duration)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

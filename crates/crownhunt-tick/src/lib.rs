//! Fixed-period tick scheduler for Crownhunt.
//!
//! The game coordinator re-evaluates eliminations on a fixed period. The
//! scheduler is one branch of the coordinator's `tokio::select!` loop, so a
//! tick never runs concurrently with any other event; it simply waits its
//! turn like a message would:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(player) = register_rx.recv() => { /* ... */ }
//!         _ = scheduler.wait_for_tick() => {
//!             eliminate();
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! # Falling behind
//!
//! If the coordinator is busy when a tick comes due, the tick waits and
//! fires as soon as the loop is free. With [`TickPolicy::Coalesce`] every
//! deadline missed in the meantime collapses into that one late tick, so a
//! slow stretch never leaves a burst of queued ticks behind it.

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the loop wakes up after one or more deadlines passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Fire once for everything missed and schedule the next tick a full
    /// period from now.
    #[default]
    Coalesce,
    /// Keep the original cadence. Missed deadlines fire back to back until
    /// the scheduler has caught up.
    Fixed,
}

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. Default: 500 ms.
    pub period: Duration,
    /// Overrun handling policy.
    pub policy: TickPolicy,
    /// Fraction of the period (0.0–1.0) a tick may use before a warning is
    /// logged. Default: 0.80.
    pub budget_warn_threshold: f64,
    /// Upper bound of the random delay added to the first tick.
    pub initial_jitter: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
            initial_jitter: Duration::ZERO,
        }
    }
}

impl TickConfig {
    /// Elimination check period.
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(500);

    /// Shortest accepted period.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// A config with the given period and defaults for everything else.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Called by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(
                period_ms = self.period.as_secs_f64() * 1000.0,
                "tick period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// What [`TickScheduler::wait_for_tick`] returns for each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInfo {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// How far past its deadline this tick fired.
    pub late: Duration,
    /// Deadlines folded into this tick (0 when on time).
    pub coalesced: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick scheduler. One per game coordinator.
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    total_coalesced: u64,
    next_tick: TokioInstant,
    /// Set when a tick fires, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
}

impl TickScheduler {
    /// Creates a scheduler whose first tick is one period (plus jitter)
    /// from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();

        let max_jitter_us = config.initial_jitter.as_micros() as u64;
        let jitter = if max_jitter_us == 0 {
            Duration::ZERO
        } else {
            Duration::from_micros(rand::rng().random_range(0..max_jitter_us))
        };

        debug!(
            period_ms = config.period.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            next_tick: TokioInstant::now() + config.period + jitter,
            config,
            tick_count: 0,
            total_coalesced: 0,
            tick_start: None,
        }
    }

    /// Scheduler for the given period with default settings.
    pub fn every(period: Duration) -> Self {
        Self::new(TickConfig::with_period(period))
    }

    /// Waits until the next tick is due.
    ///
    /// Cancel-safe: if the future is dropped before it resolves (another
    /// `select!` branch won), no state changes and the same deadline is
    /// awaited next time.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let deadline = self.next_tick;
        time::sleep_until(deadline).await;

        let now = TokioInstant::now();
        let period = self.config.period;
        let late = now.saturating_duration_since(deadline);
        let missed = (late.as_nanos() / period.as_nanos()) as u64;

        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let coalesced = match self.config.policy {
            TickPolicy::Coalesce => {
                self.next_tick = now + period;
                if missed > 0 {
                    debug!(
                        tick = self.tick_count,
                        coalesced = missed,
                        late_ms = late.as_secs_f64() * 1000.0,
                        "tick late, coalescing missed deadlines"
                    );
                }
                missed
            }
            TickPolicy::Fixed => {
                self.next_tick = deadline + period;
                0
            }
        };
        self.total_coalesced += coalesced;

        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
            late,
            coalesced,
        }
    }

    /// Records that the work for the current tick is done and warns if it
    /// used too much of the period.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        let utilization = elapsed.as_secs_f64() / self.config.period.as_secs_f64();

        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                period_ms = self.config.period.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick approaching period budget"
            );
        }
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Deadlines folded into late ticks so far.
    pub fn total_coalesced(&self) -> u64 {
        self.total_coalesced
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// The configured policy.
    pub fn policy(&self) -> TickPolicy {
        self.config.policy
    }
}

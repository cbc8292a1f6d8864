//! Integration tests for the fixed-period tick scheduler.
//!
//! Uses paused Tokio time: `sleep_until` resolves as soon as the runtime is
//! idle, and `time::advance` simulates a coordinator that was busy.

use std::time::Duration;

use crownhunt_tick::{TickConfig, TickPolicy, TickScheduler};
use tokio::time::{self, Instant};

fn config(period_ms: u64, policy: TickPolicy) -> TickConfig {
    TickConfig {
        policy,
        ..TickConfig::with_period(Duration::from_millis(period_ms))
    }
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_period_is_half_a_second() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.period, Duration::from_millis(500));
    assert_eq!(cfg.policy, TickPolicy::Coalesce);
    assert_eq!(cfg.initial_jitter, Duration::ZERO);
}

#[test]
fn test_validated_clamps_zero_period() {
    let cfg = TickConfig::with_period(Duration::ZERO).validated();
    assert_eq!(cfg.period, TickConfig::MIN_PERIOD);
}

#[test]
fn test_validated_clamps_threshold() {
    let cfg = TickConfig {
        budget_warn_threshold: 4.0,
        ..TickConfig::default()
    }
    .validated();
    assert_eq!(cfg.budget_warn_threshold, 1.0);
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_tick_fires_after_one_period() {
    let start = Instant::now();
    let mut s = TickScheduler::every(Duration::from_millis(500));

    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);
    assert_eq!(info.coalesced, 0);
    assert_eq!(Instant::now() - start, Duration::from_millis(500));
    assert_eq!(s.tick_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_keep_the_period() {
    let start = Instant::now();
    let mut s = TickScheduler::every(Duration::from_millis(500));

    for expected in 1..=4 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
    }
    assert_eq!(Instant::now() - start, Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn test_tick_not_due_yet_pends() {
    let mut s = TickScheduler::every(Duration::from_millis(500));
    let result = time::timeout(Duration::from_millis(100), s.wait_for_tick()).await;
    assert!(result.is_err());
    assert_eq!(s.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_wait_keeps_deadline() {
    // A lost select! race must not push the deadline back.
    let start = Instant::now();
    let mut s = TickScheduler::every(Duration::from_millis(500));

    let _ = time::timeout(Duration::from_millis(300), s.wait_for_tick()).await;
    s.wait_for_tick().await;
    assert_eq!(Instant::now() - start, Duration::from_millis(500));
}

// =========================================================================
// Falling behind
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_coalesce_folds_missed_deadlines_into_one_tick() {
    let start = Instant::now();
    let mut s = TickScheduler::new(config(500, TickPolicy::Coalesce));

    // Busy for 1.6s: deadlines at 0.5s, 1.0s and 1.5s have all passed.
    time::advance(Duration::from_millis(1600)).await;

    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);
    assert_eq!(info.late, Duration::from_millis(1100));
    assert_eq!(info.coalesced, 2);

    // Next tick is a full period after the late one, not back to back.
    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 2);
    assert_eq!(info.coalesced, 0);
    assert_eq!(Instant::now() - start, Duration::from_millis(2100));
    assert_eq!(s.total_coalesced(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_policy_catches_up_back_to_back() {
    let start = Instant::now();
    let mut s = TickScheduler::new(config(500, TickPolicy::Fixed));

    time::advance(Duration::from_millis(1600)).await;

    for expected in 1..=3 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
        assert_eq!(Instant::now() - start, Duration::from_millis(1600));
    }

    // Caught up: the fourth deadline (2.0s) is still ahead.
    let pending = time::timeout(Duration::from_millis(100), s.wait_for_tick()).await;
    assert!(pending.is_err());
    assert_eq!(s.total_coalesced(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_record_tick_end_without_tick_is_noop() {
    let mut s = TickScheduler::every(Duration::from_millis(500));
    s.record_tick_end();
    s.wait_for_tick().await;
    s.record_tick_end();
    s.record_tick_end();
    assert_eq!(s.tick_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_initial_jitter_bounds_first_tick() {
    let start = Instant::now();
    let mut s = TickScheduler::new(TickConfig {
        initial_jitter: Duration::from_millis(50),
        ..TickConfig::with_period(Duration::from_millis(500))
    });

    s.wait_for_tick().await;
    let elapsed = Instant::now() - start;
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(550));
}

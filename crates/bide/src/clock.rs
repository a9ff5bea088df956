//! Clock modes and the per-session retry budget
//!
//! The retry-decision procedure branches on whether the session's time
//! source advances on its own. That choice is injected explicitly as a
//! [`ClockMode`] instead of sniffed off the time source at runtime: the
//! caller knows which harness it runs under, the library does not.
//!
//! Timing goes through [`tokio::time`], so a paused runtime
//! (`#[tokio::test(start_paused = true)]`) gives both branches a
//! deterministic scheduler: sleeps auto-advance virtual time and
//! [`tokio::time::advance`] can make an attempt look arbitrarily slow.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::trace;

/// Smallest usable gap between attempt starts; requested intervals below
/// this are clamped up when a session starts.
pub(crate) const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// How the session's time source behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockMode {
    /// Time advances on its own (the wall clock, or tokio's auto-advancing
    /// virtual clock). The session budgets retries by predicting whether
    /// the next attempt can finish before the deadline.
    #[default]
    Wall,
    /// A test-controlled clock that only moves when the harness moves it.
    /// Elapsed-time arithmetic is meaningless under such a clock, so the
    /// session falls back to counting attempts against
    /// `ceil(timeout / interval)`.
    Manual,
}

/// Per-session budget state for the retry-decision procedure.
#[derive(Debug)]
pub(crate) enum TimeBudget {
    Wall {
        started: Instant,
        timeout: Duration,
        interval: Duration,
    },
    Manual {
        max_tries: u32,
    },
}

impl TimeBudget {
    /// Capture the budget at session start. `interval` must already be
    /// clamped to [`MIN_INTERVAL`].
    pub(crate) fn start(mode: ClockMode, timeout: Duration, interval: Duration) -> Self {
        debug_assert!(interval >= MIN_INTERVAL);
        match mode {
            ClockMode::Wall => Self::Wall {
                started: Instant::now(),
                timeout,
                interval,
            },
            ClockMode::Manual => Self::Manual {
                max_tries: max_tries(timeout, interval),
            },
        }
    }

    /// Retry-decision predicate, evaluated right after attempt number
    /// `tries` has failed: `true` means give up with that attempt's error,
    /// `false` means sleep one interval and go again.
    pub(crate) fn exhausted(&self, tries: u32) -> bool {
        debug_assert!(tries >= 1);
        match self {
            Self::Manual { max_tries } => {
                if tries > *max_tries {
                    trace!(tries, max_tries = *max_tries, "try budget exhausted");
                    return true;
                }
                false
            }
            Self::Wall {
                started,
                timeout,
                interval,
            } => {
                let elapsed = started.elapsed();
                // The tries attempts so far cost elapsed - interval * (tries - 1)
                // in total, so the next cycle is predicted at the average of
                // that plus one more interval; the sum telescopes to
                // (elapsed + interval) / tries.
                let predicted = (elapsed + *interval) / tries;
                let remaining = timeout.saturating_sub(elapsed);
                if predicted > remaining {
                    trace!(
                        tries,
                        predicted = ?predicted,
                        remaining = ?remaining,
                        "next attempt predicted to overrun the deadline"
                    );
                    return true;
                }
                false
            }
        }
    }
}

/// Attempt ceiling for [`ClockMode::Manual`], exact over nanoseconds.
fn max_tries(timeout: Duration, interval: Duration) -> u32 {
    let tries = timeout.as_nanos().div_ceil(interval.as_nanos());
    u32::try_from(tries).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(300, 50, 6)]
    #[case(301, 50, 7)]
    #[case(4500, 50, 90)]
    #[case(0, 50, 0)]
    #[case(49, 50, 1)]
    #[case(50, 50, 1)]
    fn max_tries_is_the_ceiling_of_the_ratio(
        #[case] timeout_ms: u64,
        #[case] interval_ms: u64,
        #[case] expected: u32,
    ) {
        assert_eq!(
            max_tries(
                Duration::from_millis(timeout_ms),
                Duration::from_millis(interval_ms)
            ),
            expected
        );
    }

    #[test]
    fn max_tries_is_exact_below_a_millisecond() {
        // 10 ms / 1.5 ms = 6.67, so seven attempts fit the budget.
        assert_eq!(
            max_tries(Duration::from_millis(10), Duration::from_micros(1500)),
            7
        );
    }

    #[test]
    fn manual_budget_permits_exactly_max_tries_failures() {
        let budget = TimeBudget::start(
            ClockMode::Manual,
            Duration::from_millis(300),
            Duration::from_millis(50),
        );
        for tries in 1..=6 {
            assert!(!budget.exhausted(tries), "try {tries} should be in budget");
        }
        assert!(budget.exhausted(7));
    }

    #[test]
    fn manual_budget_with_zero_timeout_stops_after_one_attempt() {
        let budget = TimeBudget::start(ClockMode::Manual, Duration::ZERO, MIN_INTERVAL);
        assert!(budget.exhausted(1));
    }

    #[tokio::test(start_paused = true)]
    async fn wall_budget_retries_while_the_prediction_fits() {
        let budget = TimeBudget::start(
            ClockMode::Wall,
            Duration::from_millis(100),
            Duration::from_millis(20),
        );
        tokio::time::advance(Duration::from_millis(30)).await;
        // 30 ms elapsed: the next cycle is predicted at 50 ms against
        // 70 ms remaining.
        assert!(!budget.exhausted(1));
        tokio::time::advance(Duration::from_millis(60)).await;
        // 90 ms elapsed: 55 ms predicted against 10 ms remaining.
        assert!(budget.exhausted(2));
    }

    #[tokio::test(start_paused = true)]
    async fn wall_budget_gives_up_once_the_deadline_has_passed() {
        let budget = TimeBudget::start(
            ClockMode::Wall,
            Duration::from_millis(40),
            Duration::from_millis(20),
        );
        tokio::time::advance(Duration::from_millis(45)).await;
        assert!(budget.exhausted(1));
    }

    #[tokio::test(start_paused = true)]
    async fn wall_budget_is_skewed_by_a_slow_first_attempt() {
        // A 60 ms first attempt against a 100 ms budget predicts a 110 ms
        // second cycle and stops immediately, even though a fast second
        // attempt would have fit. Long-standing behavior, kept as is.
        let budget = TimeBudget::start(
            ClockMode::Wall,
            Duration::from_millis(100),
            Duration::from_millis(50),
        );
        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(budget.exhausted(1));
    }

    proptest! {
        #[test]
        fn max_tries_stays_within_one_of_the_millisecond_ratio(
            timeout_ms in 0u64..10_000,
            interval_ms in 1u64..1_000,
        ) {
            let n = max_tries(
                Duration::from_millis(timeout_ms),
                Duration::from_millis(interval_ms),
            );
            let floor = timeout_ms / interval_ms;
            prop_assert!(u64::from(n) >= floor);
            prop_assert!(u64::from(n) <= floor + 1);
        }
    }
}

//! Session configuration and the retry loop
//!
//! A [`Poller`] is a small `Copy` value holding a session's total budget,
//! retry interval, and [`ClockMode`]. Running one drives the check to a
//! verdict: attempts are strictly sequential, the first one starts at the
//! first poll of the session future, and each failure either schedules one
//! more attempt after the interval or ends the session with that failure.
//!
//! Giving up never invents an error. The session fails with exactly the
//! value the final attempt produced, so test output points at the real
//! assertion instead of a generic timeout.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, trace};

use crate::check::{Check, PanicPayload, Verdict};
use crate::clock::{self, ClockMode, TimeBudget};
use crate::defaults::{DefaultsHandle, PollDefaults, defaults};

/// A configured polling session.
///
/// Setters consume and return the value, so a base configuration can be
/// stored once and varied per call site.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use bide::Poller;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut hits = 0;
/// let outcome = Poller::new()
///     .timeout(Duration::from_millis(200))
///     .interval(Duration::from_millis(10))
///     .run(move || {
///         hits += 1;
///         if hits >= 3 { Ok(()) } else { Err("still empty") }
///     })
///     .await;
/// assert_eq!(outcome, Ok(()));
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
    clock: ClockMode,
}

impl Poller {
    /// Smallest interval a session will actually use; shorter requests are
    /// raised to this when the session starts.
    pub const MIN_INTERVAL: Duration = clock::MIN_INTERVAL;

    /// A poller carrying the process-wide defaults as of this call.
    #[must_use]
    pub fn new() -> Self {
        Self::from_defaults(&defaults())
    }

    /// A poller carrying a snapshot of `handle` as of this call.
    ///
    /// Later changes through the handle do not reach the returned poller.
    #[must_use]
    pub fn from_defaults(handle: &DefaultsHandle) -> Self {
        Self::from(handle.snapshot())
    }

    /// Replace the total time budget.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the gap between attempt starts.
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Declare how the session's clock behaves. See [`ClockMode`].
    #[must_use]
    pub const fn clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }

    /// Run `check` until it passes or the budget is spent.
    ///
    /// The first attempt starts immediately. After a failed attempt the
    /// session either sleeps one interval and retries, or gives up when
    /// the budget says no further attempt can fit; giving up returns the
    /// final attempt's own error, unchanged.
    ///
    /// An attempt that never settles suspends the session indefinitely;
    /// there is no watchdog around a single attempt.
    pub async fn run<M, C>(&self, mut check: C) -> Result<(), C::Error>
    where
        C: Check<M>,
    {
        let interval = self.interval.max(Self::MIN_INTERVAL);
        let budget = TimeBudget::start(self.clock, self.timeout, interval);
        let mut tries: u32 = 0;
        loop {
            tries += 1;
            trace!(tries, "starting attempt");
            match check.examine().await {
                Verdict::Pass => {
                    debug!(tries, "check passed");
                    return Ok(());
                }
                Verdict::Fail(error) => {
                    if budget.exhausted(tries) {
                        debug!(tries, clock = ?self.clock, "budget spent, giving up");
                        return Err(error);
                    }
                }
            }
            trace!(tries, delay = ?interval, "scheduling the next attempt");
            sleep(interval).await;
        }
    }

    /// Run a panicking-style `check`; if the session gives up, resume the
    /// final attempt's unwind so the original panic reaches the caller.
    pub async fn expect<M, C>(&self, check: C)
    where
        C: Check<M, Error = PanicPayload>,
    {
        if let Err(payload) = self.run(check).await {
            payload.resume();
        }
    }
}

impl Default for Poller {
    /// Same as [`Poller::new`].
    fn default() -> Self {
        Self::new()
    }
}

impl From<PollDefaults> for Poller {
    fn from(defaults: PollDefaults) -> Self {
        Self {
            timeout: defaults.timeout,
            interval: defaults.interval,
            clock: ClockMode::Wall,
        }
    }
}

/// Poll `check` with the process-wide defaults until it passes.
///
/// Shorthand for [`Poller::new()`](Poller::new) followed by
/// [`run`](Poller::run).
pub async fn wait_for<M, C>(check: C) -> Result<(), C::Error>
where
    C: Check<M>,
{
    Poller::new().run(check).await
}

/// Poll a panicking-style `check` with the process-wide defaults,
/// resuming its final panic if the session gives up.
pub async fn eventually<M, C>(check: C)
where
    C: Check<M, Error = PanicPayload>,
{
    Poller::new().expect(check).await;
}

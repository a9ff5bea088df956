//! Process-wide polling defaults
//!
//! Every poll session starts from a [`PollDefaults`] value: the total time
//! budget and the gap between attempt starts. Sessions snapshot these once
//! at creation, so mutating a handle never affects a session that is
//! already running.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Total time budget used when none is given (4.5 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4500);

/// Gap between attempt starts used when none is given (50 milliseconds).
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

/// The two knobs every poll session starts from.
///
/// Plain data: copy it, store it in a config file, or tweak a field and
/// hand it to [`crate::Poller`]. The `humantime` cargo feature switches the
/// serde representation of both fields to human-readable strings
/// ("4s 500ms") instead of the `{ secs, nanos }` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDefaults {
    /// Total wall-time budget for one session.
    #[cfg_attr(feature = "humantime", serde(with = "humantime_serde"))]
    pub timeout: Duration,
    /// Minimum gap between attempt starts. Values below 1 ms are clamped
    /// to 1 ms when a session starts.
    #[cfg_attr(feature = "humantime", serde(with = "humantime_serde"))]
    pub interval: Duration,
}

impl Default for PollDefaults {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Shared, mutable handle to a [`PollDefaults`] record.
///
/// Cloning is cheap and clones observe each other's writes. Sessions read
/// the record exactly once, via [`snapshot`](Self::snapshot), when they are
/// created.
#[derive(Debug, Clone, Default)]
pub struct DefaultsHandle {
    inner: Arc<RwLock<PollDefaults>>,
}

impl DefaultsHandle {
    /// Create a handle seeded with the given record.
    #[must_use]
    pub fn new(defaults: PollDefaults) -> Self {
        Self {
            inner: Arc::new(RwLock::new(defaults)),
        }
    }

    /// Copy out the current record.
    #[must_use]
    pub fn snapshot(&self) -> PollDefaults {
        *self.inner.read()
    }

    /// Replace the record wholesale.
    pub fn set(&self, defaults: PollDefaults) {
        *self.inner.write() = defaults;
    }

    /// Mutate the record in place.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// let handle = bide::DefaultsHandle::default();
    /// handle.update(|d| d.timeout = Duration::from_millis(300));
    /// assert_eq!(handle.snapshot().timeout, Duration::from_millis(300));
    /// ```
    pub fn update(&self, f: impl FnOnce(&mut PollDefaults)) {
        f(&mut self.inner.write());
    }

    /// Restore the built-in values. Test suites that tweak the process-wide
    /// handle call this between cases.
    pub fn reset(&self) {
        self.set(PollDefaults::default());
    }
}

static PROCESS_DEFAULTS: LazyLock<DefaultsHandle> = LazyLock::new(DefaultsHandle::default);

/// The process-wide defaults record.
///
/// [`crate::wait_for`], [`crate::eventually`], and [`crate::Poller::new`]
/// snapshot this handle at session creation. Returns a clone; hold on to it
/// and mutate freely between sessions.
#[must_use]
pub fn defaults() -> DefaultsHandle {
    PROCESS_DEFAULTS.clone()
}

//! # bide
//!
//! Retry-polling for asynchronous tests: run a check until it passes, a
//! time budget runs out, or the next attempt provably cannot finish in
//! what is left of it. A session that gives up fails with the *last*
//! attempt's own error or panic, never with a synthetic timeout, so test
//! output points at the assertion that actually kept failing.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! use bide::wait_for;
//!
//! static READY: AtomicU32 = AtomicU32::new(0);
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), &'static str> {
//! // Something elsewhere flips READY once the system settles.
//! # READY.store(1, Ordering::SeqCst);
//! wait_for(|| {
//!     if READY.load(Ordering::SeqCst) > 0 {
//!         Ok(())
//!     } else {
//!         Err("no signal yet")
//!     }
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Check shapes
//!
//! One entry point accepts four shapes, selected by inference through the
//! [`Check`] adapter:
//!
//! - `FnMut() -> Result<(), E>` and `FnMut() -> impl Future<Output =
//!   Result<(), E>>` report failure by value;
//! - `FnMut()` and `FnMut() -> impl Future<Output = ()>` report failure
//!   by panicking, in the `assert_eq!` style. The caught payload rides
//!   along as a [`PanicPayload`]; [`Poller::expect`] and [`eventually`]
//!   resume it verbatim when the session gives up.
//!
//! Shape selection reads the closure's return type. A body that only
//! diverges, like `|| panic!("down")`, pins no type and will not
//! resolve; assert on a runtime value instead, or annotate the closure
//! as `|| -> () { .. }`.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use bide::Poller;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut polls = 0;
//! Poller::new()
//!     .timeout(Duration::from_millis(200))
//!     .interval(Duration::from_millis(10))
//!     .expect(move || {
//!         polls += 1;
//!         assert!(polls >= 2, "warming up");
//!     })
//!     .await;
//! # }
//! ```
//!
//! ## Clocks and determinism
//!
//! Timing goes through [`tokio::time`], so a paused runtime
//! (`#[tokio::test(start_paused = true)]`) makes sessions fully
//! deterministic with zero real waiting. Harnesses whose clock does not
//! advance on its own declare it with [`ClockMode::Manual`], which
//! budgets attempts by count (`ceil(timeout / interval)`) instead of
//! elapsed time.
//!
//! ## Defaults
//!
//! [`wait_for`], [`eventually`], and [`Poller::new`] read the
//! process-wide [`PollDefaults`] (4.5 s budget, 50 ms interval) through
//! [`defaults()`]. Sessions snapshot the record when they are created;
//! changing it never affects a session already in flight.
//!
//! ## Feature flags
//!
//! - `humantime` — serialize the durations in [`PollDefaults`] in
//!   human-readable form (`"4s 500ms"`) via `humantime-serde`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod check;
mod clock;
mod defaults;
mod poller;

pub use check::{Check, PanicPayload, Verdict, marker};
pub use clock::ClockMode;
pub use defaults::{DEFAULT_INTERVAL, DEFAULT_TIMEOUT, DefaultsHandle, PollDefaults, defaults};
pub use poller::{Poller, eventually, wait_for};

/// Commonly used items, for glob import in test modules.
pub mod prelude {
    pub use crate::{ClockMode, Poller, eventually, wait_for};
}

/// Crate version, from the build manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

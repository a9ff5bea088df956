//! Behavior of the process-wide defaults record.
//!
//! Every assertion that reads or writes the shared record lives in one
//! test function, keeping this binary safe under the parallel runner.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use bide::{
    ClockMode, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, DefaultsHandle, PollDefaults, Poller, defaults,
};

#[tokio::test(start_paused = true)]
async fn the_process_record_tunes_new_sessions_but_not_running_ones() {
    let handle = defaults();
    assert_eq!(
        handle.snapshot(),
        PollDefaults {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    );

    // Tuning the record reshapes sessions created afterwards.
    handle.set(PollDefaults {
        timeout: Duration::from_millis(200),
        interval: Duration::from_millis(40),
    });
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let outcome = bide::wait_for(move || -> Result<(), &str> {
        seen.fetch_add(1, Ordering::SeqCst);
        Err("nope")
    })
    .await;
    assert_eq!(outcome, Err("nope"));
    // ceil(200 / 40) = 5 tries fit the tuned budget, plus the final one.
    assert_eq!(calls.load(Ordering::SeqCst), 6);

    // A session in flight keeps the snapshot it started with, even when
    // the record is rewritten under it.
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let outcome = bide::wait_for(move || -> Result<(), &str> {
        if seen.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
            defaults().update(|d| d.timeout = Duration::ZERO);
        }
        Err("nope")
    })
    .await;
    assert_eq!(outcome, Err("nope"));
    assert_eq!(calls.load(Ordering::SeqCst), 6);

    defaults().reset();
    assert_eq!(defaults().snapshot(), PollDefaults::default());
}

#[tokio::test(start_paused = true)]
async fn local_handles_scope_their_tuning() {
    let team = DefaultsHandle::new(PollDefaults {
        timeout: Duration::from_millis(90),
        interval: Duration::from_millis(30),
    });
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let outcome = Poller::from_defaults(&team)
        .clock(ClockMode::Manual)
        .run(move || -> Result<(), &str> {
            seen.fetch_add(1, Ordering::SeqCst);
            Err("nope")
        })
        .await;
    assert_eq!(outcome, Err("nope"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

//! Wait for a background worker to publish its answer.
//!
//! Run with:
//!
//! ```bash
//! cargo run -p bide --example wait_demo
//! ```
//!
//! Set `RUST_LOG=bide=trace` to watch the retry schedule.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tracing::info;

use bide::Poller;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), &'static str> {
    tracing_subscriber::fmt::init();

    let answers = Arc::new(AtomicU32::new(0));
    let worker = Arc::clone(&answers);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(130)).await;
        worker.store(42, Ordering::SeqCst);
    });

    // Result-style check: poll until the worker has stored something.
    let seen = Arc::clone(&answers);
    Poller::new()
        .timeout(Duration::from_secs(1))
        .interval(Duration::from_millis(20))
        .run(move || {
            if seen.load(Ordering::SeqCst) == 42 {
                Ok(())
            } else {
                Err("the worker has not answered yet")
            }
        })
        .await?;
    info!(
        answer = answers.load(Ordering::SeqCst),
        "the worker came through"
    );

    // Assertion-style check: panics are retried the same way.
    let seen = Arc::clone(&answers);
    bide::eventually(move || {
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    })
    .await;
    info!("the assertion style agrees");

    Ok(())
}

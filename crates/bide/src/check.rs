//! The four shapes a polled condition can take
//!
//! A condition is anything re-runnable that can say pass or fail: a plain
//! closure returning `Result`, a closure returning a future of `Result`,
//! or either of those signalling failure by panicking (the `assert_*!`
//! style). [`Check`] unifies them behind one entry point; the marker type
//! parameter keeps the four blanket impls coherent and lets the compiler
//! pick the right one from the closure's signature alone.
//!
//! Failures keep their identity. A `Result` check hands back its own error
//! value untouched, and a panicking check hands back the caught payload as
//! a [`PanicPayload`] that can be rethrown verbatim.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use futures::FutureExt;

/// Outcome of running a condition once.
#[derive(Debug)]
pub enum Verdict<E> {
    /// The condition held.
    Pass,
    /// The condition failed, carrying the attempt's own failure value.
    Fail(E),
}

/// Marker types distinguishing the [`Check`] impls.
///
/// Never constructed; they only steer impl selection.
pub mod marker {
    /// `FnMut() -> Result<(), E>`.
    #[derive(Debug)]
    pub struct SyncResult;

    /// `FnMut()` returning a future of `Result<(), E>`.
    #[derive(Debug)]
    pub struct FutureResult;

    /// `FnMut()` that panics to signal failure.
    #[derive(Debug)]
    pub struct SyncAssert;

    /// `FnMut()` returning a future that panics to signal failure.
    #[derive(Debug)]
    pub struct FutureAssert;
}

/// A re-runnable condition.
///
/// Implemented for the four closure shapes above; the marker `M` is
/// inferred, callers never name it. Inference reads the closure's return
/// type, so a body that only diverges (say `|| panic!("down")`) pins no
/// shape at all; assert on a runtime value instead, or annotate the
/// closure as `|| -> () { .. }`.
pub trait Check<M> {
    /// Failure value produced by a failing attempt.
    type Error;

    /// Run the condition once.
    fn examine(&mut self) -> impl Future<Output = Verdict<Self::Error>>;
}

impl<F, E> Check<marker::SyncResult> for F
where
    F: FnMut() -> Result<(), E>,
{
    type Error = E;

    async fn examine(&mut self) -> Verdict<E> {
        match self() {
            Ok(()) => Verdict::Pass,
            Err(error) => Verdict::Fail(error),
        }
    }
}

impl<F, Fut, E> Check<marker::FutureResult> for F
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    type Error = E;

    async fn examine(&mut self) -> Verdict<E> {
        match self().await {
            Ok(()) => Verdict::Pass,
            Err(error) => Verdict::Fail(error),
        }
    }
}

impl<F> Check<marker::SyncAssert> for F
where
    F: FnMut(),
{
    type Error = PanicPayload;

    async fn examine(&mut self) -> Verdict<PanicPayload> {
        match catch_unwind(AssertUnwindSafe(|| self())) {
            Ok(()) => Verdict::Pass,
            Err(payload) => Verdict::Fail(PanicPayload(payload)),
        }
    }
}

impl<F, Fut> Check<marker::FutureAssert> for F
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    type Error = PanicPayload;

    async fn examine(&mut self) -> Verdict<PanicPayload> {
        match AssertUnwindSafe(self()).catch_unwind().await {
            Ok(()) => Verdict::Pass,
            Err(payload) => Verdict::Fail(PanicPayload(payload)),
        }
    }
}

/// Payload caught from a panicking check.
///
/// Holds the panic value exactly as `catch_unwind` delivered it, so
/// [`resume`](Self::resume) rethrows the original panic rather than a
/// wrapper around it.
pub struct PanicPayload(Box<dyn Any + Send + 'static>);

impl PanicPayload {
    /// The panic message, when the payload is one of the two string shapes
    /// the `panic!` family produces.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.0
            .downcast_ref::<&'static str>()
            .copied()
            .or_else(|| self.0.downcast_ref::<String>().map(String::as_str))
    }

    /// Rethrow the captured panic on the current thread.
    pub fn resume(self) -> ! {
        resume_unwind(self.0)
    }

    /// The raw payload, for downcasting to `panic_any` values.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn Any + Send + 'static> {
        self.0
    }
}

impl fmt::Debug for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => f.debug_tuple("PanicPayload").field(&message).finish(),
            None => f.write_str("PanicPayload(<non-string payload>)"),
        }
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("non-string panic payload"))
    }
}

impl std::error::Error for PanicPayload {}

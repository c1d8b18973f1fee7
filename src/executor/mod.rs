//! Pluggable motion backend
//!
//! `Executor` is the narrow boundary between this crate and whatever
//! physically schedules stepper pulses. Mirrors the teacher's
//! `#[async_trait]` `Connection` trait: a small `Send + Sync` trait object
//! the Controller owns and drives.

pub mod reference;

use crate::error::Result;
use crate::primitive::MotionPrimitive;
use async_trait::async_trait;

pub use reference::ReferenceExecutor;

/// Consumes resolved motion primitives and reports queued motion time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Executor: Send + Sync {
    /// Enqueue a primitive into the backend motion queue. Must not block
    /// indefinitely; fails fast on unrecoverable backend errors.
    async fn execute(&mut self, primitive: MotionPrimitive) -> Result<()>;

    /// Block until all previously-enqueued motion has completed. Used only
    /// in offline/test mode; reactor-safe callers poll `queued_time()` to
    /// zero instead.
    async fn flush(&mut self) -> Result<()>;

    /// Total wall-clock duration of motion still queued behind `execute`.
    /// Used by the Controller for fill-phase backpressure. Takes `&mut self`
    /// since a real backend typically needs to poll/drain its queue to
    /// answer this.
    fn queued_time(&mut self) -> f64;
}

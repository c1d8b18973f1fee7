//! In-process reference motion backend
//!
//! Accumulates queued motion time from `length_mm / feedrate_mm_per_s` and
//! drains it at a configurable rate as a stand-in for real-time stepper
//! consumption. Never blocks; `flush()` polls the drain until empty.

use super::Executor;
use crate::error::{Error, Result};
use crate::primitive::MotionPrimitive;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Reference `Executor`: accumulates and drains queued time, never touches
/// real hardware. Useful for tests and as documentation of the contract.
pub struct ReferenceExecutor {
    queued_seconds: f64,
    last_drain: Instant,
    /// Multiplier on wall-clock drain speed: 1.0 is real-time, >1.0 drains
    /// faster (useful to let tests run without waiting out real feedrates).
    drain_rate: f64,
    executed_count: u64,
}

impl ReferenceExecutor {
    /// Construct a reference executor draining at real-time speed.
    pub fn new() -> Self {
        Self::with_drain_rate(1.0)
    }

    /// Construct a reference executor draining at `drain_rate` times
    /// real-time.
    pub fn with_drain_rate(drain_rate: f64) -> Self {
        Self {
            queued_seconds: 0.0,
            last_drain: Instant::now(),
            drain_rate,
            executed_count: 0,
        }
    }

    /// Number of primitives handed to `execute` so far.
    pub fn executed_count(&self) -> u64 {
        self.executed_count
    }

    fn drain(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_drain).as_secs_f64() * self.drain_rate;
        self.queued_seconds = (self.queued_seconds - elapsed).max(0.0);
        self.last_drain = now;
    }
}

impl Default for ReferenceExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for ReferenceExecutor {
    async fn execute(&mut self, primitive: MotionPrimitive) -> Result<()> {
        self.drain();
        if primitive.feedrate_mm_per_s <= 0.0 {
            return Err(Error::executor(format!(
                "primitive at line {} has non-positive feedrate",
                primitive.line_number
            )));
        }
        let duration = primitive.length_mm / primitive.feedrate_mm_per_s;
        self.queued_seconds += duration;
        self.executed_count += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        loop {
            self.drain();
            if self.queued_seconds <= 0.0 {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn queued_time(&mut self) -> f64 {
        self.drain();
        self.queued_seconds
    }
}

//! Execution state machine, lookahead, progress, and the pump loop
//!
//! The driver — a reactor timer in the embedded host, or a blocking loop in
//! tests — repeatedly calls `pump(budget)`. One invocation fills the ready
//! queue from the Streamer/Interpreter and steps primitives into the
//! Executor while RUNNING, bounded by an explicit per-tick budget plus a
//! `queued_time` backpressure watermark.

pub mod prescan;
pub mod soft_limits;

use crate::config::{ControllerConfig, PumpBudget};
use crate::error::{Error, Result};
use crate::events::{CompletionEvent, ControllerEvent, ErrorEvent, EventBroadcaster, ProgressEvent, StateChangeEvent};
use crate::executor::Executor;
use crate::interpreter::Interpreter;
use crate::parser::parse_line;
use crate::primitive::MotionPrimitive;
use crate::streamer::Streamer;
use soft_limits::SoftLimits;
use std::collections::VecDeque;

/// Execution state, exhaustively tagged per the state machine in 4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Hold,
    Cancelled,
    Done,
}

/// Run-statistics bookkeeping, diagnostics only — never affects scheduling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    pub primitives_emitted: u64,
    pub primitives_executed: u64,
    pub primitives_dropped_zero_length: u64,
}

/// The streaming lookahead controller.
pub struct Controller<S: Streamer, E: Executor> {
    state: ControllerState,
    streamer: S,
    interpreter: Interpreter,
    executor: E,
    soft_limits: SoftLimits,
    ready_queue: VecDeque<MotionPrimitive>,
    lookahead_primitives: usize,
    high_watermark_s: f64,
    progress_increment_mm: f64,
    progress_increment_primitives: usize,
    completed_length: f64,
    total_length: Option<f64>,
    last_feedrate: Option<f64>,
    eof_reached: bool,
    last_reported_mm: f64,
    primitives_since_report: usize,
    events: EventBroadcaster,
    stats: RunStats,
}

impl<S: Streamer, E: Executor> Controller<S, E> {
    /// Build a controller. `interpreter` should be freshly constructed for
    /// this run — its modal state is owned exclusively by this controller.
    pub fn new(streamer: S, interpreter: Interpreter, executor: E, config: ControllerConfig, events: EventBroadcaster) -> Self {
        Self {
            state: ControllerState::Idle,
            streamer,
            interpreter,
            executor,
            soft_limits: SoftLimits::new(config.soft_limits),
            ready_queue: VecDeque::new(),
            lookahead_primitives: config.lookahead_primitives,
            high_watermark_s: config.high_watermark_s,
            progress_increment_mm: config.progress_increment_mm,
            progress_increment_primitives: config.progress_increment_primitives,
            completed_length: 0.0,
            total_length: None,
            last_feedrate: None,
            eof_reached: false,
            last_reported_mm: 0.0,
            primitives_since_report: 0,
            events,
            stats: RunStats::default(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn completed_length(&self) -> f64 {
        self.completed_length
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Record a prescan's total length, for progress/ETA reporting.
    pub fn set_total_length(&mut self, total_mm: f64) {
        self.total_length = Some(total_mm);
    }

    fn transition(&mut self, to: ControllerState) {
        let from = self.state;
        self.state = to;
        self.events
            .publish(ControllerEvent::StateChange(StateChangeEvent { from, to }));
    }

    fn illegal(&self, event: &str) -> Error {
        Error::IllegalStateTransition {
            from: format!("{:?}", self.state),
            event: event.to_string(),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.state != ControllerState::Idle {
            return Err(self.illegal("start"));
        }
        self.transition(ControllerState::Running);
        Ok(())
    }

    pub fn feed_hold(&mut self) -> Result<()> {
        if self.state != ControllerState::Running {
            return Err(self.illegal("feed_hold"));
        }
        self.transition(ControllerState::Hold);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != ControllerState::Hold {
            return Err(self.illegal("resume"));
        }
        self.transition(ControllerState::Running);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        if !matches!(self.state, ControllerState::Running | ControllerState::Hold) {
            return Err(self.illegal("cancel"));
        }
        self.transition(ControllerState::Cancelled);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        if !matches!(self.state, ControllerState::Cancelled | ControllerState::Done) {
            return Err(self.illegal("reset"));
        }
        self.transition(ControllerState::Idle);
        self.completed_length = 0.0;
        self.eof_reached = false;
        self.last_reported_mm = 0.0;
        self.primitives_since_report = 0;
        self.ready_queue.clear();
        Ok(())
    }

    fn fail(&mut self, error: Error) {
        let line_number = error.line_number();
        self.transition(ControllerState::Cancelled);
        self.events
            .publish(ControllerEvent::Error(ErrorEvent { error, line_number }));
    }

    /// One bounded fill-and-step invocation. Re-entrant across calls,
    /// single-threaded within one call.
    pub async fn pump(&mut self, budget: PumpBudget) -> Result<()> {
        if matches!(self.state, ControllerState::Cancelled | ControllerState::Done) {
            return Ok(());
        }

        if let Err(e) = self.fill_phase(budget.max_lines) {
            self.fail(e.clone());
            return Err(e);
        }

        if let Err(e) = self.step_phase(budget.max_steps).await {
            self.fail(e.clone());
            return Err(e);
        }

        self.maybe_complete();

        Ok(())
    }

    fn fill_phase(&mut self, max_lines: usize) -> Result<()> {
        for _ in 0..max_lines {
            if self.ready_queue.len() >= self.lookahead_primitives {
                break;
            }
            if self.eof_reached {
                break;
            }

            let next = self
                .streamer
                .next_line()
                .map_err(|e| Error::executor(e.to_string()))?;

            let Some((line_number, text)) = next else {
                self.eof_reached = true;
                break;
            };

            if let Some(parsed) = parse_line(&text, line_number)? {
                let primitives = self.interpreter.interpret(&parsed)?;
                for p in primitives {
                    if p.is_zero_length() {
                        self.stats.primitives_dropped_zero_length += 1;
                        continue;
                    }
                    self.stats.primitives_emitted += 1;
                    self.ready_queue.push_back(p);
                }
            }

            if self.executor.queued_time() > self.high_watermark_s {
                break;
            }
        }
        Ok(())
    }

    async fn step_phase(&mut self, max_steps: usize) -> Result<()> {
        for _ in 0..max_steps {
            if self.state != ControllerState::Running {
                break;
            }
            let Some(primitive) = self.ready_queue.pop_front() else {
                break;
            };

            if primitive.feedrate_mm_per_s <= 0.0 {
                return Err(Error::UnresolvedFeedrate {
                    line_number: primitive.line_number,
                });
            }
            self.soft_limits.check(&primitive)?;
            self.executor.execute(primitive).await?;

            self.completed_length += primitive.length_mm;
            self.last_feedrate = Some(primitive.feedrate_mm_per_s);
            self.stats.primitives_executed += 1;
            self.primitives_since_report += 1;
            self.maybe_emit_progress();
        }
        Ok(())
    }

    fn maybe_emit_progress(&mut self) {
        let distance_due = self.completed_length - self.last_reported_mm >= self.progress_increment_mm;
        let count_due = self.primitives_since_report >= self.progress_increment_primitives;
        if !distance_due && !count_due {
            return;
        }

        let percent = self.total_length.map(|t| if t > 0.0 { self.completed_length / t } else { 1.0 });
        let eta_s = match (self.total_length, self.last_feedrate) {
            (Some(total), Some(feedrate)) if feedrate > 0.0 => Some((total - self.completed_length) / feedrate),
            _ => None,
        };

        self.events.publish(ControllerEvent::Progress(ProgressEvent {
            completed_mm: self.completed_length,
            total_mm: self.total_length,
            percent,
            eta_s,
        }));

        self.last_reported_mm = self.completed_length;
        self.primitives_since_report = 0;
    }

    fn maybe_complete(&mut self) {
        if self.state == ControllerState::Running
            && self.eof_reached
            && self.ready_queue.is_empty()
            && self.executor.queued_time() == 0.0
        {
            self.transition(ControllerState::Done);
            self.events.publish(ControllerEvent::Completion(CompletionEvent {
                total_executed_mm: self.completed_length,
            }));
        }
    }
}

//! Minimal blocking-loop driver
//!
//! Demonstrates the core pipeline end-to-end: reads a G-code file named on
//! the command line (or stdin if none given), prescans it for a length
//! estimate, then drives `Controller::pump` in a blocking loop against the
//! reference executor until the program completes. Configuration loading,
//! a reactor/timer integration, and a real motion backend are all out of
//! scope for this crate; this binary exists to exercise the pipeline.

use cnc_motion_core::config::{ControllerConfig, InterpreterConfig, PumpBudget};
use cnc_motion_core::controller::{prescan, Controller, ControllerState};
use cnc_motion_core::events::ControllerEvent;
use cnc_motion_core::executor::ReferenceExecutor;
use cnc_motion_core::events::EventBroadcaster;
use cnc_motion_core::interpreter::Interpreter;
use cnc_motion_core::streamer::LineStreamer;
use std::io::BufRead;

fn open_source(path: Option<&str>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(p) => Ok(Box::new(std::io::BufReader::new(std::fs::File::open(p)?))),
        None => Ok(Box::new(std::io::BufReader::new(std::io::stdin()))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cnc_motion_core::logging::init_logging(None)?;
    tracing::info!("{} v{} starting", cnc_motion_core::APP_NAME, cnc_motion_core::VERSION);

    let path = std::env::args().nth(1);
    let interpreter_config = InterpreterConfig::default();
    let controller_config = ControllerConfig::default();

    let total_length = {
        let reader = open_source(path.as_deref())?;
        let mut streamer = LineStreamer::new(reader);
        prescan::prescan(
            &mut streamer,
            interpreter_config.arc_tolerance_mm,
            interpreter_config.max_segment_time_s,
            interpreter_config.rapid_feedrate_mm_per_s,
            interpreter_config.strict,
        )?
    };
    tracing::info!(total_length_mm = total_length, "prescan complete");

    let reader = open_source(path.as_deref())?;
    let streamer = LineStreamer::new(reader);
    let interpreter = Interpreter::new(
        interpreter_config.arc_tolerance_mm,
        interpreter_config.max_segment_time_s,
        interpreter_config.rapid_feedrate_mm_per_s,
        interpreter_config.strict,
    );
    let executor = ReferenceExecutor::new();
    let events = EventBroadcaster::default();

    let mut subscriber = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = subscriber.recv().await {
            match event {
                ControllerEvent::Progress(p) => tracing::info!(?p, "progress"),
                ControllerEvent::StateChange(s) => tracing::info!(?s, "state change"),
                ControllerEvent::Error(e) => tracing::error!(?e, "error"),
                ControllerEvent::Completion(c) => tracing::info!(?c, "completion"),
            }
        }
    });

    let mut controller = Controller::new(streamer, interpreter, executor, controller_config, events);
    controller.set_total_length(total_length);
    controller.start()?;

    let budget = PumpBudget::default();
    while controller.state() != ControllerState::Done && controller.state() != ControllerState::Cancelled {
        controller.pump(budget).await?;
    }

    tracing::info!(
        executed_mm = controller.completed_length(),
        "run finished"
    );
    Ok(())
}

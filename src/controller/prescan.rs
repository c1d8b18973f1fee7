//! Dry-run length sum for progress reporting
//!
//! Constructs its own `ModalState` (via its own `Interpreter`), independent
//! of and never observed by the runtime interpreter, per the spec's
//! prescan/runtime isolation requirement. No executor is invoked, no soft
//! limits are checked; errors surface exactly as they would at runtime.

use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::parser::parse_line;
use crate::streamer::Streamer;

/// Dry-run a program to completion, returning the summed primitive length.
///
/// Used to populate `total_length` before `Controller::start()`.
pub fn prescan<S: Streamer>(
    streamer: &mut S,
    arc_tolerance: f64,
    max_segment_time: f64,
    rapid_feedrate_mm_per_s: f64,
    strict: bool,
) -> Result<f64> {
    let mut interpreter = Interpreter::new(arc_tolerance, max_segment_time, rapid_feedrate_mm_per_s, strict);
    let mut total_length = 0.0;

    loop {
        let Some((line_number, text)) = streamer.next_line().map_err(|e| crate::error::Error::config(e.to_string()))? else {
            break;
        };
        let Some(parsed) = parse_line(&text, line_number)? else {
            continue;
        };
        let primitives = interpreter.interpret(&parsed)?;
        for p in primitives {
            total_length += p.length_mm;
        }
    }

    Ok(total_length)
}

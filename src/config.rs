//! Configuration-time parameters
//!
//! These structs hold every configuration-time knob named in the spec
//! (arc tolerance, segmentation time bound, lookahead depth, backpressure
//! watermark, progress cadence, soft limits, rapid feedrate). Loading them
//! from a file, environment, or CLI flags is the driver's responsibility —
//! out of scope here, per the purpose-and-scope non-goals — so this module
//! only defines the data and sane defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interpreter-level configuration: geometry and segmentation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterpreterConfig {
    /// Maximum chord-to-arc deviation permitted when segmenting arcs (mm)
    pub arc_tolerance_mm: f64,
    /// Maximum wall-clock duration any emitted segment may represent at the
    /// current feedrate (seconds)
    pub max_segment_time_s: f64,
    /// Feedrate used for rapid (G0) primitives (mm/s)
    pub rapid_feedrate_mm_per_s: f64,
    /// When true, unrecognized G/M words are a hard error instead of a
    /// logged, ignored diagnostic (strict mode)
    pub strict: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            arc_tolerance_mm: 0.002,
            max_segment_time_s: 0.1,
            rapid_feedrate_mm_per_s: 100.0,
            strict: false,
        }
    }
}

/// Per-axis soft travel limits, in machine-space millimeters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoftLimitsConfig {
    /// axis name ("X", "Y", "Z", ...) -> (min, max)
    pub bounds: HashMap<String, (f64, f64)>,
    /// Whether rapids are checked against soft limits (spec's Open Question;
    /// defaults to yes, per spec.md §9)
    pub check_rapids: bool,
}

impl Default for SoftLimitsConfig {
    fn default() -> Self {
        Self {
            bounds: HashMap::new(),
            check_rapids: true,
        }
    }
}

/// Controller-level configuration: lookahead, backpressure, progress cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    /// Maximum number of ready primitives buffered ahead of the executor
    pub lookahead_primitives: usize,
    /// Backpressure threshold: fill phase stops early once queued executor
    /// time exceeds this many seconds
    pub high_watermark_s: f64,
    /// Progress events are emitted at least this often (distance), or every
    /// N primitives, whichever is finer
    pub progress_increment_mm: f64,
    /// "whichever is finer" primitive-count cadence
    pub progress_increment_primitives: usize,
    /// Soft limit envelope
    pub soft_limits: SoftLimitsConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            lookahead_primitives: 64,
            high_watermark_s: 0.5,
            progress_increment_mm: 1.0,
            progress_increment_primitives: 32,
            soft_limits: SoftLimitsConfig::default(),
        }
    }
}

/// Pump budget: how much work one `Controller::pump` invocation may do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PumpBudget {
    /// Maximum lines pulled from the streamer this tick
    pub max_lines: usize,
    /// Maximum primitives handed to the executor this tick
    pub max_steps: usize,
}

impl PumpBudget {
    /// Create a new budget
    pub fn new(max_lines: usize, max_steps: usize) -> Self {
        Self { max_lines, max_steps }
    }
}

impl Default for PumpBudget {
    fn default() -> Self {
        // Typical granularity named in spec.md §5 ("typical: 16/8")
        Self::new(16, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpreter_config_defaults() {
        let cfg = InterpreterConfig::default();
        assert!(cfg.arc_tolerance_mm > 0.0);
        assert!(cfg.max_segment_time_s > 0.0);
        assert!(!cfg.strict);
    }

    #[test]
    fn test_soft_limits_default_checks_rapids() {
        assert!(SoftLimitsConfig::default().check_rapids);
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let cfg = ControllerConfig::default();
        let s = toml::to_string(&cfg).unwrap();
        let back: ControllerConfig = toml::from_str(&s).unwrap();
        assert_eq!(cfg, back);
    }
}

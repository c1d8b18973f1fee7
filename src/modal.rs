//! Modal interpreter state
//!
//! A pure data container: the Interpreter enforces legal transitions, this
//! module only holds the record and its accessors. One `ModalState` belongs
//! exclusively to one Interpreter (or Prescanner) for the duration of one
//! interpretation session.

use serde::{Deserialize, Serialize};

/// Active measurement unit, selected by G20/G21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Millimeters,
    Inches,
}

impl Units {
    /// Factor to multiply a value in this unit by to get millimeters.
    pub fn to_mm_factor(self) -> f64 {
        match self {
            Units::Millimeters => 1.0,
            Units::Inches => 25.4,
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Units::Millimeters
    }
}

/// Distance interpretation mode, selected by G90/G91.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMode {
    Absolute,
    Incremental,
}

impl Default for DistanceMode {
    fn default() -> Self {
        DistanceMode::Absolute
    }
}

/// Active motion plane for arcs, selected by G17/G18/G19.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

impl Default for Plane {
    fn default() -> Self {
        Plane::Xy
    }
}

/// Sticky motion mode: which kind of move an axis-word-only line performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    Rapid,
    Linear,
    ArcCw,
    ArcCcw,
}

impl Default for MotionMode {
    fn default() -> Self {
        MotionMode::Rapid
    }
}

/// Feedrate interpretation mode, selected by G93/G94.
///
/// `InverseTime` is accepted and recorded but the interpreter degrades to
/// `UnitsPerMinute` semantics when resolving a feedrate (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedRateMode {
    UnitsPerMinute,
    InverseTime,
}

impl Default for FeedRateMode {
    fn default() -> Self {
        FeedRateMode::UnitsPerMinute
    }
}

/// Spindle direction/state, tracked as inert bookkeeping (M3/M4/M5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpindleState {
    Off,
    Clockwise,
    CounterClockwise,
}

impl Default for SpindleState {
    fn default() -> Self {
        SpindleState::Off
    }
}

/// Coolant state, tracked as inert bookkeeping (M7/M8/M9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CoolantState {
    pub mist: bool,
    pub flood: bool,
}

/// An axis-space coordinate. Fixed to the three axes the spec guarantees;
/// additional axes are reserved, not designed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCoords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AxisCoords {
    pub const ORIGIN: AxisCoords = AxisCoords { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &AxisCoords) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Default for AxisCoords {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Persistent interpreter state, mutated only by the Interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalState {
    pub units: Units,
    pub distance_mode: DistanceMode,
    pub plane: Plane,
    pub motion_mode: MotionMode,
    pub feed_rate_mode: FeedRateMode,
    /// Last-commanded F value, in the modal unit per minute, unconverted;
    /// `None` until an F word is ever seen. Conversion to mm/s happens at
    /// primitive construction time, using the unit active at that time (see
    /// `Interpreter::resolve_feedrate_mm_per_s`).
    pub feedrate_units_per_min: Option<f64>,
    pub current_position: AxisCoords,
    /// 0..=5 for G54..G59
    pub wcs_index: u8,
    pub spindle: SpindleState,
    pub coolant: CoolantState,
    /// Currently selected tool number (M6/T), inert bookkeeping.
    pub tool: Option<u32>,
    /// Maximum chord-to-arc deviation permitted when segmenting arcs (mm)
    pub arc_tolerance: f64,
    /// Maximum wall-clock duration any emitted segment may represent (s)
    pub max_segment_time: f64,
}

impl ModalState {
    /// Construct a fresh modal state with the given configuration-time
    /// geometry parameters and all other fields at their power-on defaults.
    pub fn new(arc_tolerance: f64, max_segment_time: f64) -> Self {
        Self {
            units: Units::default(),
            distance_mode: DistanceMode::default(),
            plane: Plane::default(),
            motion_mode: MotionMode::default(),
            feed_rate_mode: FeedRateMode::default(),
            feedrate_units_per_min: None,
            current_position: AxisCoords::default(),
            wcs_index: 0,
            spindle: SpindleState::default(),
            coolant: CoolantState::default(),
            tool: None,
            arc_tolerance,
            max_segment_time,
        }
    }
}

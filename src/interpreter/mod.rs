//! Parsed words + modal state -> ordered motion primitives
//!
//! The Interpreter owns one `ModalState` exclusively for the duration of one
//! interpretation session (prescan or runtime — never shared between the
//! two, enforced simply by each holding its own instance). `interpret` is
//! deterministic: the same modal state plus the same parsed line always
//! produces the same primitives.

pub mod arc;

use crate::error::{Error, Result};
use crate::modal::{AxisCoords, DistanceMode, FeedRateMode, ModalState, MotionMode, Plane, Units};
use crate::parser::ParsedLine;
use crate::primitive::{MotionPrimitive, PrimitiveKind};
use arc::ArcDirection;

const UNITS_GROUP: &[u32] = &[20, 21];
const PLANE_GROUP: &[u32] = &[17, 18, 19];
const DISTANCE_GROUP: &[u32] = &[90, 91];
const FEED_RATE_MODE_GROUP: &[u32] = &[93, 94];
const WCS_GROUP: &[u32] = &[54, 55, 56, 57, 58, 59];
const MOTION_GROUP: &[u32] = &[0, 1, 2, 3];
const NON_MODAL_GROUP: &[u32] = &[4, 28, 30];

const RECOGNIZED_G: &[u32] = &[0, 1, 2, 3, 4, 17, 18, 19, 20, 21, 28, 30, 54, 55, 56, 57, 58, 59, 90, 91, 93, 94];
const RECOGNIZED_M: &[u32] = &[3, 4, 5, 6, 7, 8, 9];

/// Parsed words + modal state -> ordered motion primitives.
pub struct Interpreter {
    pub modal: ModalState,
    /// Feedrate stamped on rapid primitives (configuration-time constant).
    pub rapid_feedrate_mm_per_s: f64,
    /// Unsupported words become a hard error instead of a logged diagnostic.
    pub strict: bool,
}

impl Interpreter {
    /// Construct a fresh interpreter with its own exclusive modal state.
    pub fn new(arc_tolerance: f64, max_segment_time: f64, rapid_feedrate_mm_per_s: f64, strict: bool) -> Self {
        Self {
            modal: ModalState::new(arc_tolerance, max_segment_time),
            rapid_feedrate_mm_per_s,
            strict,
        }
    }

    /// Interpret one parsed line, mutating modal state and returning the
    /// ordered primitives it produces (zero or more).
    pub fn interpret(&mut self, line: &ParsedLine) -> Result<Vec<MotionPrimitive>> {
        self.apply_units(line)?;
        self.apply_plane(line)?;
        self.apply_distance_mode(line)?;
        self.apply_wcs(line)?;
        self.apply_feed_rate_mode(line)?;
        self.apply_feedrate(line);
        self.apply_m_words(line);
        self.check_unsupported(line)?;

        self.dispatch_motion(line)
    }

    fn selected_group_word(&self, line: &ParsedLine, group: &[u32], line_number: u32, name: &str) -> Result<Option<u32>> {
        let mut found: Option<u32> = None;
        for w in &line.g_words {
            let n = w.value.round() as u32;
            if group.contains(&n) {
                match found {
                    Some(existing) if existing != n => {
                        return Err(Error::modal(
                            line_number,
                            format!("conflicting {name} words G{existing} and G{n} on one line"),
                        ));
                    }
                    _ => found = Some(n),
                }
            }
        }
        Ok(found)
    }

    fn apply_units(&mut self, line: &ParsedLine) -> Result<()> {
        if let Some(n) = self.selected_group_word(line, UNITS_GROUP, line.line_number, "units")? {
            self.modal.units = if n == 20 { Units::Inches } else { Units::Millimeters };
        }
        Ok(())
    }

    fn apply_plane(&mut self, line: &ParsedLine) -> Result<()> {
        if let Some(n) = self.selected_group_word(line, PLANE_GROUP, line.line_number, "plane")? {
            self.modal.plane = match n {
                17 => Plane::Xy,
                18 => Plane::Xz,
                _ => Plane::Yz,
            };
        }
        Ok(())
    }

    fn apply_distance_mode(&mut self, line: &ParsedLine) -> Result<()> {
        if let Some(n) = self.selected_group_word(line, DISTANCE_GROUP, line.line_number, "distance mode")? {
            self.modal.distance_mode = if n == 90 {
                DistanceMode::Absolute
            } else {
                DistanceMode::Incremental
            };
        }
        Ok(())
    }

    fn apply_wcs(&mut self, line: &ParsedLine) -> Result<()> {
        if let Some(n) = self.selected_group_word(line, WCS_GROUP, line.line_number, "coordinate system")? {
            self.modal.wcs_index = (n - 54) as u8;
        }
        Ok(())
    }

    fn apply_feed_rate_mode(&mut self, line: &ParsedLine) -> Result<()> {
        if let Some(n) = self.selected_group_word(line, FEED_RATE_MODE_GROUP, line.line_number, "feedrate mode")? {
            self.modal.feed_rate_mode = if n == 93 {
                FeedRateMode::InverseTime
            } else {
                FeedRateMode::UnitsPerMinute
            };
            if n == 93 {
                tracing::warn!(
                    line = line.line_number,
                    "G93 inverse-time feed mode recorded but resolved as units-per-minute"
                );
            }
        }
        Ok(())
    }

    fn apply_feedrate(&mut self, line: &ParsedLine) {
        if let Some(f) = line.param('F') {
            self.modal.feedrate_units_per_min = Some(f);
        }
    }

    /// Resolve the sticky F value to mm/s, using the *currently* active unit
    /// (spec.md §4.3: "conversion to mm/s occurs at primitive construction").
    fn resolve_feedrate_mm_per_s(&self, line_number: u32) -> Result<f64> {
        let f = self
            .modal
            .feedrate_units_per_min
            .ok_or(Error::UnresolvedFeedrate { line_number })?;
        Ok(f * self.modal.units.to_mm_factor() / 60.0)
    }

    fn apply_m_words(&mut self, line: &ParsedLine) {
        use crate::modal::SpindleState;
        for w in &line.m_words {
            match w.value.round() as u32 {
                3 => self.modal.spindle = SpindleState::Clockwise,
                4 => self.modal.spindle = SpindleState::CounterClockwise,
                5 => self.modal.spindle = SpindleState::Off,
                6 => {
                    if let Some(t) = line.param('T') {
                        self.modal.tool = Some(t.round() as u32);
                    }
                }
                7 => self.modal.coolant.mist = true,
                8 => self.modal.coolant.flood = true,
                9 => {
                    self.modal.coolant.mist = false;
                    self.modal.coolant.flood = false;
                }
                other => {
                    if self.strict {
                        // Surfaced by check_unsupported below.
                        let _ = other;
                    } else {
                        tracing::debug!(line = line.line_number, m = other, "unsupported M-word ignored");
                    }
                }
            }
        }
    }

    fn check_unsupported(&self, line: &ParsedLine) -> Result<()> {
        if !self.strict {
            for w in &line.g_words {
                let n = w.value.round() as u32;
                if !RECOGNIZED_G.contains(&n) {
                    tracing::debug!(line = line.line_number, g = n, "unsupported G-word ignored");
                }
            }
            for w in &line.m_words {
                let n = w.value.round() as u32;
                if !RECOGNIZED_M.contains(&n) {
                    tracing::debug!(line = line.line_number, m = n, "unsupported M-word ignored");
                }
            }
            return Ok(());
        }

        for w in &line.g_words {
            let n = w.value.round() as u32;
            if !RECOGNIZED_G.contains(&n) {
                return Err(Error::modal(line.line_number, format!("unsupported word G{n}")));
            }
        }
        for w in &line.m_words {
            let n = w.value.round() as u32;
            if !RECOGNIZED_M.contains(&n) {
                return Err(Error::modal(line.line_number, format!("unsupported word M{n}")));
            }
        }
        Ok(())
    }

    fn has_axis_words(&self, line: &ParsedLine) -> bool {
        line.param('X').is_some() || line.param('Y').is_some() || line.param('Z').is_some()
    }

    fn has_arc_center_words(&self, line: &ParsedLine) -> bool {
        line.param('I').is_some()
            || line.param('J').is_some()
            || line.param('K').is_some()
            || line.param('R').is_some()
    }

    fn resolve_target(&self, line: &ParsedLine) -> AxisCoords {
        let mut target = self.modal.current_position;
        let factor = self.modal.units.to_mm_factor();
        let mut apply = |word: Option<f64>, current: &mut f64| {
            if let Some(v) = word {
                let v_mm = v * factor;
                *current = match self.modal.distance_mode {
                    DistanceMode::Absolute => v_mm,
                    DistanceMode::Incremental => *current + v_mm,
                };
            }
        };
        apply(line.param('X'), &mut target.x);
        apply(line.param('Y'), &mut target.y);
        apply(line.param('Z'), &mut target.z);
        target
    }

    fn dispatch_motion(&mut self, line: &ParsedLine) -> Result<Vec<MotionPrimitive>> {
        if let Some(non_modal) = self.selected_group_word(line, NON_MODAL_GROUP, line.line_number, "non-modal motion")? {
            return self.dispatch_non_modal(non_modal, line);
        }

        if let Some(n) = self.selected_group_word(line, MOTION_GROUP, line.line_number, "motion")? {
            self.modal.motion_mode = match n {
                0 => MotionMode::Rapid,
                1 => MotionMode::Linear,
                2 => MotionMode::ArcCw,
                _ => MotionMode::ArcCcw,
            };
        }

        match self.modal.motion_mode {
            MotionMode::Rapid | MotionMode::Linear => self.dispatch_linear(line),
            MotionMode::ArcCw | MotionMode::ArcCcw => self.dispatch_arc(line),
        }
    }

    fn dispatch_non_modal(&mut self, g: u32, line: &ParsedLine) -> Result<Vec<MotionPrimitive>> {
        match g {
            4 => {
                let seconds = line.param('P').unwrap_or(0.0);
                tracing::info!(line = line.line_number, seconds, "dwell (no motion emitted)");
                Ok(Vec::new())
            }
            28 | 30 => {
                let start = self.modal.current_position;
                let end = AxisCoords::ORIGIN;
                self.modal.current_position = end;
                if start == end {
                    return Ok(Vec::new());
                }
                Ok(vec![MotionPrimitive::new(
                    PrimitiveKind::Rapid,
                    start,
                    end,
                    self.rapid_feedrate_mm_per_s,
                    line.line_number,
                )])
            }
            _ => unreachable!("non-modal group only contains G4/G28/G30"),
        }
    }

    fn dispatch_linear(&mut self, line: &ParsedLine) -> Result<Vec<MotionPrimitive>> {
        if !self.has_axis_words(line) {
            return Ok(Vec::new());
        }

        let start = self.modal.current_position;
        let end = self.resolve_target(line);

        let (kind, feedrate) = if self.modal.motion_mode == MotionMode::Rapid {
            (PrimitiveKind::Rapid, self.rapid_feedrate_mm_per_s)
        } else {
            let f = self.resolve_feedrate_mm_per_s(line.line_number)?;
            (PrimitiveKind::Linear, f)
        };

        let primitives = segment_linear(start, end, feedrate, self.modal.max_segment_time, kind, line.line_number);
        self.modal.current_position = end;
        Ok(primitives)
    }

    fn dispatch_arc(&mut self, line: &ParsedLine) -> Result<Vec<MotionPrimitive>> {
        if !self.has_axis_words(line) && !self.has_arc_center_words(line) {
            return Ok(Vec::new());
        }

        let line_number = line.line_number;
        let start = self.modal.current_position;
        let end = self.resolve_target(line);
        let plane = self.modal.plane;
        let direction = if self.modal.motion_mode == MotionMode::ArcCw {
            ArcDirection::Clockwise
        } else {
            ArcDirection::CounterClockwise
        };

        let factor = self.modal.units.to_mm_factor();
        let i = line.param('I').map(|v| v * factor);
        let j = line.param('J').map(|v| v * factor);
        let k = line.param('K').map(|v| v * factor);
        let r = line.param('R').map(|v| v * factor);

        let using_ijk = i.is_some() || j.is_some() || k.is_some();

        let (center, radius) = if using_ijk {
            let center = arc::center_from_ijk(start, plane, i, j, k);
            let radius = arc::validate_ijk_radius(line_number, start, end, center, plane)?;
            (center, radius)
        } else if let Some(r) = r {
            let center = arc::center_from_radius(line_number, start, end, plane, r, direction)?;
            let radius = start.distance_to(&center);
            (center, radius)
        } else {
            return Err(Error::arc_geometry(line_number, "arc requires I/J/K or R parameters"));
        };

        const EPSILON: f64 = 1e-9;
        let is_full_circle = using_ijk && start.distance_to(&end) < EPSILON && center != start;

        let sweep = arc::sweep_angle(line_number, start, end, center, plane, direction, is_full_circle)?;

        let feedrate = self.resolve_feedrate_mm_per_s(line_number)?;

        let n = arc::segment_count(self.modal.arc_tolerance, self.modal.max_segment_time, feedrate, radius, sweep);
        let points = arc::generate_arc_points(start, end, center, plane, direction, sweep, n);

        let mut primitives = Vec::with_capacity(points.len());
        let mut prev = start;
        for point in points {
            primitives.push(MotionPrimitive::new(PrimitiveKind::Linear, prev, point, feedrate, line_number));
            prev = point;
        }

        self.modal.current_position = end;
        Ok(primitives)
    }
}

/// Split a straight move from `start` to `end` into equal-length segments,
/// each bounded to `max_segment_time` at `feedrate`. Emits one zero-length
/// primitive for an explicitly-commanded, zero-distance move.
fn segment_linear(
    start: AxisCoords,
    end: AxisCoords,
    feedrate_mm_per_s: f64,
    max_segment_time: f64,
    kind: PrimitiveKind,
    line_number: u32,
) -> Vec<MotionPrimitive> {
    let distance = start.distance_to(&end);
    if distance == 0.0 {
        return vec![MotionPrimitive::new(kind, start, end, feedrate_mm_per_s, line_number)];
    }

    let max_segment_length = (feedrate_mm_per_s * max_segment_time).max(f64::MIN_POSITIVE);
    let n = (distance / max_segment_length).ceil().max(1.0) as usize;

    let mut primitives = Vec::with_capacity(n);
    let mut prev = start;
    for i in 1..=n {
        let point = if i == n {
            end
        } else {
            let t = i as f64 / n as f64;
            AxisCoords::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
                start.z + (end.z - start.z) * t,
            )
        };
        primitives.push(MotionPrimitive::new(kind, prev, point, feedrate_mm_per_s, line_number));
        prev = point;
    }
    primitives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn interp() -> Interpreter {
        Interpreter::new(0.002, 0.1, 100.0, false)
    }

    #[test]
    fn test_s1_linear_absolute_mm() {
        let mut it = interp();
        let l1 = parse_line("G21", 1).unwrap().unwrap();
        it.interpret(&l1).unwrap();
        let l2 = parse_line("G90", 2).unwrap().unwrap();
        it.interpret(&l2).unwrap();
        let l3 = parse_line("G1 X10 Y0 F600", 3).unwrap().unwrap();
        let prims = it.interpret(&l3).unwrap();

        let total: f64 = prims.iter().map(|p| p.length_mm).sum();
        assert!((total - 10.0).abs() < 1e-9);
        for p in &prims {
            assert!((p.feedrate_mm_per_s - 10.0).abs() < 1e-9);
        }
        assert_eq!(it.modal.current_position.x, 10.0);
    }

    #[test]
    fn test_s2_incremental() {
        let mut it = interp();
        it.interpret(&parse_line("G21", 1).unwrap().unwrap()).unwrap();
        it.interpret(&parse_line("G90", 2).unwrap().unwrap()).unwrap();
        it.interpret(&parse_line("G1 X10 Y0 F600", 3).unwrap().unwrap()).unwrap();
        it.interpret(&parse_line("G91", 4).unwrap().unwrap()).unwrap();
        let prims = it.interpret(&parse_line("G1 X-5 Y5", 5).unwrap().unwrap()).unwrap();

        let total: f64 = prims.iter().map(|p| p.length_mm).sum();
        assert!((total - 50_f64.sqrt()).abs() < 1e-9);
        assert!((it.modal.current_position.x - 5.0).abs() < 1e-9);
        assert!((it.modal.current_position.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_s3_unit_change() {
        let mut it = interp();
        let prims = it.interpret(&parse_line("G20", 1).unwrap().unwrap()).unwrap();
        assert!(prims.is_empty());
        let prims = it.interpret(&parse_line("G1 X1 F60", 2).unwrap().unwrap()).unwrap();
        let total: f64 = prims.iter().map(|p| p.length_mm).sum();
        assert!((total - 25.4).abs() < 1e-6);
        for p in &prims {
            assert!((p.feedrate_mm_per_s - 25.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_s4_arc_ijk_quarter_circle() {
        let mut it = interp();
        it.interpret(&parse_line("G21", 1).unwrap().unwrap()).unwrap();
        it.interpret(&parse_line("G90", 2).unwrap().unwrap()).unwrap();
        it.modal.current_position = AxisCoords::new(10.0, 0.0, 0.0);
        let prims = it
            .interpret(&parse_line("G3 X0 Y10 I-10 J0 F600", 3).unwrap().unwrap())
            .unwrap();

        assert!(!prims.is_empty());
        let last = prims.last().unwrap();
        assert!((last.end.x - 0.0).abs() < 1e-9);
        assert!((last.end.y - 10.0).abs() < 1e-9);

        let total: f64 = prims.iter().map(|p| p.length_mm).sum();
        let expected = std::f64::consts::PI * 10.0 / 2.0;
        assert!((total - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_s5_arc_r_form_boundary_errors() {
        let mut it = interp();
        it.interpret(&parse_line("G21", 1).unwrap().unwrap()).unwrap();
        it.interpret(&parse_line("G90", 2).unwrap().unwrap()).unwrap();
        let result = it.interpret(&parse_line("G2 X10 Y0 R-5 F600", 3).unwrap().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_g1_no_axis_words_emits_nothing_but_updates_feedrate() {
        let mut it = interp();
        let prims = it.interpret(&parse_line("G1 F200", 1).unwrap().unwrap()).unwrap();
        assert!(prims.is_empty());
        assert!((it.modal.feedrate_units_per_min.unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_feedrate_reresolved_against_unit_active_at_primitive_construction() {
        // G21 F600 sets the sticky feedrate to "600 units/min" while mm is
        // active (600 mm/min = 10 mm/s). Switching to G20 without restating F
        // re-resolves the *same* sticky 600 against inches at move time (600
        // inch/min = 254 mm/s), per spec.md §4.3.
        let mut it = interp();
        it.interpret(&parse_line("G21 G90 F600", 1).unwrap().unwrap()).unwrap();
        let prims = it.interpret(&parse_line("G1 X1 Y0", 2).unwrap().unwrap()).unwrap();
        for p in &prims {
            assert!((p.feedrate_mm_per_s - 10.0).abs() < 1e-9);
        }

        it.interpret(&parse_line("G20", 3).unwrap().unwrap()).unwrap();
        let prims = it.interpret(&parse_line("G1 X2 Y0", 4).unwrap().unwrap()).unwrap();
        for p in &prims {
            assert!((p.feedrate_mm_per_s - 254.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_no_feedrate_is_error() {
        let mut it = interp();
        let result = it.interpret(&parse_line("G1 X10", 1).unwrap().unwrap());
        assert!(matches!(result, Err(Error::UnresolvedFeedrate { .. })));
    }

    #[test]
    fn test_dwell_emits_nothing() {
        let mut it = interp();
        let prims = it.interpret(&parse_line("G4 P1.5", 1).unwrap().unwrap()).unwrap();
        assert!(prims.is_empty());
    }

    #[test]
    fn test_g28_rapids_to_origin() {
        let mut it = interp();
        it.modal.current_position = AxisCoords::new(5.0, 5.0, 5.0);
        let prims = it.interpret(&parse_line("G28", 1).unwrap().unwrap()).unwrap();
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].end, AxisCoords::ORIGIN);
        assert_eq!(it.modal.current_position, AxisCoords::ORIGIN);
    }

    #[test]
    fn test_conflicting_distance_mode_words_is_modal_error() {
        let mut it = interp();
        let line = parse_line("G90 G91 X1", 1).unwrap().unwrap();
        assert!(matches!(it.interpret(&line), Err(Error::Modal { .. })));
    }

    #[test]
    fn test_continuity_across_primitives() {
        let mut it = interp();
        it.interpret(&parse_line("G21 G90", 1).unwrap().unwrap()).unwrap();
        let prims = it
            .interpret(&parse_line("G1 X100 Y0 F60", 2).unwrap().unwrap())
            .unwrap();
        for pair in prims.windows(2) {
            assert!(pair[0].end.distance_to(&pair[1].start) < 1e-6);
        }
    }

    proptest::proptest! {
        #[test]
        fn segment_linear_conserves_length_and_bounds_segment_time(
            ex in -500.0f64..500.0,
            ey in -500.0f64..500.0,
            ez in -500.0f64..500.0,
            feedrate in 1.0f64..1000.0,
            max_segment_time in 0.01f64..1.0,
        ) {
            let start = AxisCoords::ORIGIN;
            let end = AxisCoords::new(ex, ey, ez);
            let prims = segment_linear(start, end, feedrate, max_segment_time, PrimitiveKind::Linear, 1);

            let total: f64 = prims.iter().map(|p| p.length_mm).sum();
            let direct = start.distance_to(&end);
            prop_assert!((total - direct).abs() < 1e-6);

            for p in &prims {
                let segment_time = p.length_mm / p.feedrate_mm_per_s;
                prop_assert!(segment_time <= max_segment_time + 1e-9);
            }

            for pair in prims.windows(2) {
                prop_assert!(pair[0].end.distance_to(&pair[1].start) < 1e-9);
            }
        }
    }
}

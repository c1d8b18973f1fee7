//! Fully-resolved motion primitives
//!
//! A `MotionPrimitive` is the handoff value between the Interpreter and the
//! Controller/Executor: all geometry, feedrate, and axis resolution is
//! already done. Arcs never reach this type — they are segmented into
//! `Linear` primitives by the interpreter.

use crate::modal::AxisCoords;

/// Kind of a fully-resolved primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Rapid,
    Linear,
}

/// An immutable, fully-resolved motion segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPrimitive {
    pub kind: PrimitiveKind,
    pub start: AxisCoords,
    pub end: AxisCoords,
    /// Resolved feedrate in mm/s. For rapids this is the backend's
    /// configured rapid feedrate, still carried explicitly.
    pub feedrate_mm_per_s: f64,
    /// Euclidean distance between `start` and `end`, precomputed.
    pub length_mm: f64,
    /// Source line number, for diagnostics.
    pub line_number: u32,
}

impl MotionPrimitive {
    /// Construct a primitive, precomputing `length_mm` from its endpoints.
    pub fn new(
        kind: PrimitiveKind,
        start: AxisCoords,
        end: AxisCoords,
        feedrate_mm_per_s: f64,
        line_number: u32,
    ) -> Self {
        let length_mm = start.distance_to(&end);
        Self {
            kind,
            start,
            end,
            feedrate_mm_per_s,
            length_mm,
            line_number,
        }
    }

    /// True when this primitive represents zero commanded travel.
    pub fn is_zero_length(&self) -> bool {
        self.length_mm == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_precomputed() {
        let p = MotionPrimitive::new(
            PrimitiveKind::Linear,
            AxisCoords::new(0.0, 0.0, 0.0),
            AxisCoords::new(3.0, 4.0, 0.0),
            100.0,
            1,
        );
        assert_eq!(p.length_mm, 5.0);
        assert!(!p.is_zero_length());
    }

    #[test]
    fn test_zero_length() {
        let p = MotionPrimitive::new(
            PrimitiveKind::Linear,
            AxisCoords::new(1.0, 1.0, 1.0),
            AxisCoords::new(1.0, 1.0, 1.0),
            100.0,
            1,
        );
        assert!(p.is_zero_length());
    }
}

//! Arc geometry: center resolution, sweep angle, and chord-error segmentation
//!
//! Generalizes the teacher's XY-only `Parser::calculate_arc_center*` /
//! `Segment::arc_length` math to all three planes by projecting onto the
//! plane's in-plane (u, v) axes and carrying the out-of-plane axis as a
//! helical component distributed linearly over the sweep.

use crate::error::{Error, Result};
use crate::modal::{AxisCoords, Plane};
use std::f64::consts::PI;

/// Arc winding direction (G2 clockwise, G3 counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    Clockwise,
    CounterClockwise,
}

/// Minimum segments emitted per full turn, regardless of tolerance.
const MIN_SEGMENTS_PER_TURN: f64 = 8.0;
/// Maximum segments emitted per full turn, regardless of tolerance.
const MAX_SEGMENTS_PER_TURN: f64 = 2048.0;

/// Project a point onto a plane's (in-plane-u, in-plane-v, out-of-plane-w)
/// basis. The (u, v, w) triple is always a right-handed cyclic permutation of
/// (X, Y, Z) — (X,Y,Z) for G17, (Z,X,Y) for G18, (Y,Z,X) for G19 — so that
/// CW/CCW winding (computed uniformly as `atan2(v, u)`) comes out consistent
/// across all three planes. G18 in particular is ordered (Z, X), not (X, Z):
/// the RS274/NGC plane normal for G18 is +Y, and (X, Z) would be left-handed.
fn to_plane(p: AxisCoords, plane: Plane) -> (f64, f64, f64) {
    match plane {
        Plane::Xy => (p.x, p.y, p.z),
        Plane::Xz => (p.z, p.x, p.y),
        Plane::Yz => (p.y, p.z, p.x),
    }
}

/// Inverse of [`to_plane`].
fn from_plane(u: f64, v: f64, w: f64, plane: Plane) -> AxisCoords {
    match plane {
        Plane::Xy => AxisCoords::new(u, v, w),
        Plane::Xz => AxisCoords::new(v, w, u),
        Plane::Yz => AxisCoords::new(w, u, v),
    }
}

/// Select the plane-appropriate pair of I/J/K offsets, in the same (u, v)
/// order as [`to_plane`].
fn ijk_uv(plane: Plane, i: Option<f64>, j: Option<f64>, k: Option<f64>) -> (f64, f64) {
    match plane {
        Plane::Xy => (i.unwrap_or(0.0), j.unwrap_or(0.0)),
        Plane::Xz => (k.unwrap_or(0.0), i.unwrap_or(0.0)),
        Plane::Yz => (j.unwrap_or(0.0), k.unwrap_or(0.0)),
    }
}

/// Resolve the arc center from I/J/K offsets, relative to `start`.
pub fn center_from_ijk(
    start: AxisCoords,
    plane: Plane,
    i: Option<f64>,
    j: Option<f64>,
    k: Option<f64>,
) -> AxisCoords {
    let (su, sv, sw) = to_plane(start, plane);
    let (ou, ov) = ijk_uv(plane, i, j, k);
    from_plane(su + ou, sv + ov, sw, plane)
}

/// Resolve the arc center from a signed radius (the `R` word form).
///
/// The sign of `radius` selects the short arc (`R > 0`) or the long arc
/// (`R < 0`) *for the commanded winding direction* — which side of the chord
/// the center falls on also depends on whether the arc is CW (`G2`) or CCW
/// (`G3`), since the perpendicular bisector has two sides and direction picks
/// which one is "toward" the short arc. The boundary `|R| == chord/2` is
/// itself a geometric error since it leaves short and long arcs
/// indistinguishable (both are exact semicircles).
pub fn center_from_radius(
    line_number: u32,
    start: AxisCoords,
    end: AxisCoords,
    plane: Plane,
    radius: f64,
    direction: ArcDirection,
) -> Result<AxisCoords> {
    let (su, sv, sw) = to_plane(start, plane);
    let (eu, ev, _ew) = to_plane(end, plane);

    let chord = ((eu - su).powi(2) + (ev - sv).powi(2)).sqrt();
    if chord == 0.0 {
        return Err(Error::arc_geometry(
            line_number,
            "R-form arc requires distinct start and end points",
        ));
    }

    let half_chord = chord / 2.0;
    let h_sq = radius * radius - half_chord * half_chord;
    if h_sq <= 0.0 {
        return Err(Error::arc_geometry(
            line_number,
            format!(
                "radius {radius} too small for chord {chord} (|R| must exceed half the chord)"
            ),
        ));
    }
    let h = h_sq.sqrt();

    let mid_u = (su + eu) / 2.0;
    let mid_v = (sv + ev) / 2.0;
    let perp_u = -(ev - sv) / chord;
    let perp_v = (eu - su) / chord;

    let r_sign = if radius > 0.0 { 1.0 } else { -1.0 };
    let direction_sign = match direction {
        ArcDirection::Clockwise => -1.0,
        ArcDirection::CounterClockwise => 1.0,
    };
    let sign = r_sign * direction_sign;
    let cu = mid_u + sign * h * perp_u;
    let cv = mid_v + sign * h * perp_v;

    Ok(from_plane(cu, cv, sw, plane))
}

/// Radius implied by an IJK-form center, validated against both endpoints.
///
/// Fails if `|start - center|` and `|end - center|` disagree by more than
/// `max(0.002mm, 1e-4 * radius)`.
pub fn validate_ijk_radius(
    line_number: u32,
    start: AxisCoords,
    end: AxisCoords,
    center: AxisCoords,
    plane: Plane,
) -> Result<f64> {
    let (su, sv, _) = to_plane(start, plane);
    let (eu, ev, _) = to_plane(end, plane);
    let (cu, cv, _) = to_plane(center, plane);

    let r_start = ((su - cu).powi(2) + (sv - cv).powi(2)).sqrt();
    let r_end = ((eu - cu).powi(2) + (ev - cv).powi(2)).sqrt();

    let tolerance = (0.002_f64).max(1e-4 * r_start);
    if (r_start - r_end).abs() > tolerance {
        return Err(Error::arc_geometry(
            line_number,
            format!(
                "IJK center radius mismatch: start radius {r_start}, end radius {r_end}, tolerance {tolerance}"
            ),
        ));
    }

    Ok(r_start)
}

/// Sweep angle in radians, wrapped to `(0, 2*PI]` in the commanded direction.
///
/// `is_full_circle` forces a full 2*PI turn (used when start == end under
/// IJK form with a non-zero offset).
pub fn sweep_angle(
    line_number: u32,
    start: AxisCoords,
    end: AxisCoords,
    center: AxisCoords,
    plane: Plane,
    direction: ArcDirection,
    is_full_circle: bool,
) -> Result<f64> {
    if is_full_circle {
        return Ok(2.0 * PI);
    }

    let (su, sv, _) = to_plane(start, plane);
    let (eu, ev, _) = to_plane(end, plane);
    let (cu, cv, _) = to_plane(center, plane);

    let start_angle = (sv - cv).atan2(su - cu);
    let end_angle = (ev - cv).atan2(eu - cu);

    let mut delta = end_angle - start_angle;
    let sweep = match direction {
        ArcDirection::Clockwise => {
            if delta >= 0.0 {
                delta -= 2.0 * PI;
            }
            -delta
        }
        ArcDirection::CounterClockwise => {
            if delta <= 0.0 {
                delta += 2.0 * PI;
            }
            delta
        }
    };

    const EPSILON: f64 = 1e-9;
    if sweep.abs() < EPSILON {
        return Err(Error::arc_geometry(
            line_number,
            "degenerate zero-sweep arc with non-equal endpoints",
        ));
    }

    Ok(sweep)
}

/// Angular step that keeps the chord-to-arc deviation within `tolerance`,
/// clamped to between 1/2048 and 1/8 of a full turn.
fn chord_error_step_angle(tolerance: f64, radius: f64) -> f64 {
    let ratio = (1.0 - tolerance / radius).clamp(-1.0, 1.0);
    let angle = 2.0 * ratio.acos();
    let min_angle = 2.0 * PI / MAX_SEGMENTS_PER_TURN;
    let max_angle = 2.0 * PI / MIN_SEGMENTS_PER_TURN;
    angle.clamp(min_angle, max_angle)
}

/// Number of linear segments to approximate this arc, honoring both the
/// chord-error tolerance and the `max_segment_time` bound at `feedrate`.
pub fn segment_count(
    arc_tolerance: f64,
    max_segment_time: f64,
    feedrate_mm_per_s: f64,
    radius: f64,
    sweep: f64,
) -> usize {
    let step_angle = chord_error_step_angle(arc_tolerance, radius);
    let n_geometric = (sweep.abs() / step_angle).ceil().max(1.0);

    let n_time = if feedrate_mm_per_s > 0.0 && max_segment_time > 0.0 {
        (sweep.abs() * radius / (feedrate_mm_per_s * max_segment_time))
            .ceil()
            .max(1.0)
    } else {
        1.0
    };

    n_geometric.max(n_time) as usize
}

/// Generate the `n` segment endpoints of the arc (excludes `start`, the
/// caller's current position; the final point exactly equals `end`).
pub fn generate_arc_points(
    start: AxisCoords,
    end: AxisCoords,
    center: AxisCoords,
    plane: Plane,
    direction: ArcDirection,
    sweep: f64,
    n: usize,
) -> Vec<AxisCoords> {
    let (su, sv, sw) = to_plane(start, plane);
    let (_eu, _ev, ew) = to_plane(end, plane);
    let (cu, cv, _) = to_plane(center, plane);

    let radius = ((su - cu).powi(2) + (sv - cv).powi(2)).sqrt();
    let start_angle = (sv - cv).atan2(su - cu);
    let signed_sweep = match direction {
        ArcDirection::Clockwise => -sweep,
        ArcDirection::CounterClockwise => sweep,
    };

    let mut points = Vec::with_capacity(n);
    for i in 1..=n {
        let t = i as f64 / n as f64;
        if i == n {
            points.push(end);
            continue;
        }
        let theta = start_angle + signed_sweep * t;
        let u = cu + radius * theta.cos();
        let v = cv + radius * theta.sin();
        let w = sw + (ew - sw) * t;
        points.push(from_plane(u, v, w, plane));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ijk_center_xy() {
        let start = AxisCoords::new(10.0, 0.0, 0.0);
        let center = center_from_ijk(start, Plane::Xy, Some(-10.0), Some(0.0), None);
        assert_eq!(center, AxisCoords::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_ijk_center_xz() {
        let start = AxisCoords::new(10.0, 0.0, 0.0);
        let center = center_from_ijk(start, Plane::Xz, Some(-10.0), None, Some(0.0));
        assert_eq!(center, AxisCoords::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_xz_plane_g2_quarter_circle_winds_clockwise() {
        // G18 plane is ordered (Z, X) with normal +Y, not (X, Z); a left-handed
        // basis here would flip G2/G3 winding for this plane only.
        let start = AxisCoords::new(10.0, 0.0, 0.0);
        let end = AxisCoords::new(0.0, 0.0, 10.0);
        let center = center_from_ijk(start, Plane::Xz, Some(-10.0), None, Some(0.0));
        assert_eq!(center, AxisCoords::ORIGIN);

        let radius = validate_ijk_radius(1, start, end, center, Plane::Xz).unwrap();
        assert!((radius - 10.0).abs() < 1e-9);

        let sweep =
            sweep_angle(1, start, end, center, Plane::Xz, ArcDirection::Clockwise, false).unwrap();
        assert!((sweep - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_ijk_radius_validation_passes_for_consistent_circle() {
        let start = AxisCoords::new(10.0, 0.0, 0.0);
        let end = AxisCoords::new(0.0, 10.0, 0.0);
        let center = AxisCoords::new(0.0, 0.0, 0.0);
        let r = validate_ijk_radius(1, start, end, center, Plane::Xy).unwrap();
        assert!((r - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_ijk_radius_validation_fails_for_inconsistent_circle() {
        let start = AxisCoords::new(10.0, 0.0, 0.0);
        let end = AxisCoords::new(0.0, 5.0, 0.0);
        let center = AxisCoords::new(0.0, 0.0, 0.0);
        assert!(validate_ijk_radius(1, start, end, center, Plane::Xy).is_err());
    }

    #[test]
    fn test_quarter_circle_ccw_sweep() {
        let start = AxisCoords::new(10.0, 0.0, 0.0);
        let end = AxisCoords::new(0.0, 10.0, 0.0);
        let center = AxisCoords::new(0.0, 0.0, 0.0);
        let sweep = sweep_angle(1, start, end, center, Plane::Xy, ArcDirection::CounterClockwise, false)
            .unwrap();
        assert!((sweep - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_r_form_boundary_is_geometric_error() {
        // chord = 10, R = -5: |R| == chord/2 exactly, a degenerate semicircle.
        let start = AxisCoords::new(0.0, 0.0, 0.0);
        let end = AxisCoords::new(10.0, 0.0, 0.0);
        assert!(center_from_radius(1, start, end, Plane::Xy, -5.0, ArcDirection::Clockwise).is_err());
    }

    #[test]
    fn test_r_form_positive_radius_is_short_arc_for_commanded_direction() {
        // G2 (clockwise), R+6: short arc (< PI), per the direction-aware sign.
        let start = AxisCoords::new(0.0, 0.0, 0.0);
        let end = AxisCoords::new(10.0, 0.0, 0.0);
        let center = center_from_radius(1, start, end, Plane::Xy, 6.0, ArcDirection::Clockwise).unwrap();
        let sweep =
            sweep_angle(1, start, end, center, Plane::Xy, ArcDirection::Clockwise, false).unwrap();
        assert!(sweep < PI);
    }

    #[test]
    fn test_r_form_long_arc_sweeps_more_than_half_turn() {
        // G2 (clockwise), R-6: long arc (> PI), matching spec.md S5.
        let start = AxisCoords::new(0.0, 0.0, 0.0);
        let end = AxisCoords::new(10.0, 0.0, 0.0);
        let center = center_from_radius(1, start, end, Plane::Xy, -6.0, ArcDirection::Clockwise).unwrap();
        let sweep =
            sweep_angle(1, start, end, center, Plane::Xy, ArcDirection::Clockwise, false).unwrap();
        assert!(sweep > PI);
    }

    #[test]
    fn test_r_form_ccw_sign_unaffected_by_direction_fix() {
        // G3 (counter-clockwise), R+6: short arc, matching the CCW case that
        // was already correct before the direction-aware sign was introduced.
        let start = AxisCoords::new(0.0, 0.0, 0.0);
        let end = AxisCoords::new(10.0, 0.0, 0.0);
        let center =
            center_from_radius(1, start, end, Plane::Xy, 6.0, ArcDirection::CounterClockwise).unwrap();
        let sweep = sweep_angle(1, start, end, center, Plane::Xy, ArcDirection::CounterClockwise, false)
            .unwrap();
        assert!(sweep < PI);
    }

    #[test]
    fn test_segment_count_respects_tolerance() {
        let n_tight = segment_count(0.001, 1000.0, 100.0, 10.0, PI / 2.0);
        let n_loose = segment_count(1.0, 1000.0, 100.0, 10.0, PI / 2.0);
        assert!(n_tight > n_loose);
    }

    #[test]
    fn test_generate_arc_points_ends_exactly_at_end() {
        let start = AxisCoords::new(10.0, 0.0, 0.0);
        let end = AxisCoords::new(0.0, 10.0, 0.0);
        let center = AxisCoords::new(0.0, 0.0, 0.0);
        let points = generate_arc_points(
            start,
            end,
            center,
            Plane::Xy,
            ArcDirection::CounterClockwise,
            PI / 2.0,
            16,
        );
        assert_eq!(points.len(), 16);
        assert_eq!(*points.last().unwrap(), end);
    }
}

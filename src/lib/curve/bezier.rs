//! Tangent-continuous piecewise Bezier fit through an ordered point list.
//!
//! Each interior point gets a tangent angle interpolated between its two neighbouring chords, weighted by chord
//! length. Consecutive points are joined with a quadratic whose single control point is the intersection of the two
//! tangent lines. When both tangents fall on the same side of the chord (a point of inflection) the tangent lines
//! can't meet usefully, so that segment becomes a cubic with control points on each tangent line instead.

use nalgebra::geometry::Point2;
use nalgebra::Vector2;

use crate::geometry::{direction, intersect_lines, wrap_angle, LineSegment};

/// Tangent deviations (radians) below this count as lying on the chord
const ON_CHORD: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        p0: Point2<f64>,
        p1: Point2<f64>,
    },
    Quadratic {
        p0: Point2<f64>,
        c: Point2<f64>,
        p1: Point2<f64>,
    },
    Cubic {
        p0: Point2<f64>,
        c0: Point2<f64>,
        c1: Point2<f64>,
        p1: Point2<f64>,
    },
}

impl Segment {
    pub fn start(&self) -> Point2<f64> {
        match *self {
            Segment::Line { p0, .. } | Segment::Quadratic { p0, .. } | Segment::Cubic { p0, .. } => p0,
        }
    }

    pub fn end(&self) -> Point2<f64> {
        match *self {
            Segment::Line { p1, .. } | Segment::Quadratic { p1, .. } | Segment::Cubic { p1, .. } => p1,
        }
    }

    pub fn chord_length(&self) -> f64 {
        (self.end() - self.start()).norm()
    }

    /// Evaluate the Bernstein polynomial at `t` in [0, 1]
    pub fn eval(&self, t: f64) -> Point2<f64> {
        let u = 1.0 - t;
        match *self {
            Segment::Line { p0, p1 } => p0 + (p1 - p0) * t,
            Segment::Quadratic { p0, c, p1 } => Point2::from(
                p0.coords * (u * u) + c.coords * (2.0 * u * t) + p1.coords * (t * t),
            ),
            Segment::Cubic { p0, c0, c1, p1 } => Point2::from(
                p0.coords * (u * u * u)
                    + c0.coords * (3.0 * u * u * t)
                    + c1.coords * (3.0 * u * t * t)
                    + p1.coords * (t * t * t),
            ),
        }
    }
}

/// Tangent angle (radians) at every point. Needs at least 3 points.
pub fn tangent_angles(points: &[Point2<f64>]) -> Vec<f64> {
    let n = points.len();
    debug_assert!(n >= 3);

    let chords: Vec<LineSegment> = points
        .windows(2)
        .map(|w| LineSegment::new(w[0], w[1]))
        .collect();
    let lengths: Vec<f64> = chords.iter().map(LineSegment::length).collect();
    let seg_angles = chord_angles(&chords);

    let mut angles = vec![0.0; n];
    for i in 1..n - 1 {
        let (before, after) = (lengths[i - 1], lengths[i]);
        let w = if before + after > 0.0 {
            before / (before + after)
        } else {
            0.5
        };
        angles[i] = seg_angles[i - 1] + wrap_angle(seg_angles[i] - seg_angles[i - 1]) * w;
    }
    // Endpoints reflect their neighbour's tangent about the end chord
    angles[0] = seg_angles[0] + wrap_angle(seg_angles[0] - angles[1]);
    angles[n - 1] = seg_angles[n - 2] + wrap_angle(seg_angles[n - 2] - angles[n - 2]);
    angles
}

/// Chord directions, with zero-length chords borrowing a neighbour's direction
fn chord_angles(chords: &[LineSegment]) -> Vec<f64> {
    let mut angles: Vec<Option<f64>> = chords
        .iter()
        .map(|c| (!c.is_degenerate()).then(|| c.angle()))
        .collect();
    let mut last = None;
    for a in angles.iter_mut() {
        match a {
            Some(v) => last = Some(*v),
            None => *a = last,
        }
    }
    let mut next = None;
    for a in angles.iter_mut().rev() {
        match a {
            Some(v) => next = Some(*v),
            None => *a = next,
        }
    }
    angles.into_iter().map(|a| a.unwrap_or(0.0)).collect()
}

/// True if the tangents at both ends of a chord lie on the same side of it, so the segment has to change curvature
/// direction somewhere between them. Angle differences are wrapped, so this holds across the +/-180 degree seam.
pub fn is_inflection(start_angle: f64, end_angle: f64, chord_angle: f64) -> bool {
    let d0 = wrap_angle(start_angle - chord_angle);
    let d1 = wrap_angle(end_angle - chord_angle);
    d0.abs() > ON_CHORD && d1.abs() > ON_CHORD && d0.signum() == d1.signum()
}

/// Fit one segment per consecutive point pair. Needs at least 3 points.
pub fn fit(points: &[Point2<f64>]) -> Vec<Segment> {
    let angles = tangent_angles(points);
    points
        .windows(2)
        .zip(angles.windows(2))
        .map(|(p, a)| fit_segment(p[0], p[1], a[0], a[1]))
        .collect()
}

fn fit_segment(p0: Point2<f64>, p1: Point2<f64>, a0: f64, a1: f64) -> Segment {
    let chord = LineSegment::new(p0, p1);
    if chord.is_degenerate() {
        return Segment::Line { p0, p1 };
    }
    let chord_angle = chord.angle();
    let d0 = wrap_angle(a0 - chord_angle);
    let d1 = wrap_angle(a1 - chord_angle);
    if d0.abs() <= ON_CHORD && d1.abs() <= ON_CHORD {
        return Segment::Line { p0, p1 };
    }

    if !is_inflection(a0, a1, chord_angle) {
        if let Some(c) = intersect_lines(p0, direction(a0), p1, direction(a1)) {
            // Only accept a control point that projects inside the chord, otherwise the quadratic loops
            let v = p1 - p0;
            let t = (c - p0).dot(&v) / v.norm_squared();
            if (0.0..=1.0).contains(&t) {
                return Segment::Quadratic { p0, c, p1 };
            }
        }
    }

    let v = p1 - p0;
    Segment::Cubic {
        p0,
        c0: on_tangent(p0, a0, p0, v, 0.25),
        c1: on_tangent(p1, a1, p0, v, 0.75),
        p1,
    }
}

/// Point on the tangent line through `anchor` at `angle`, placed `fraction` of the way along the chord `v` from
/// `start`. The axis the tangent is less steep against is used as the parameter, so the slope never divides by ~0.
fn on_tangent(
    anchor: Point2<f64>,
    angle: f64,
    start: Point2<f64>,
    v: Vector2<f64>,
    fraction: f64,
) -> Point2<f64> {
    let dir = direction(angle);
    if dir.x.abs() >= dir.y.abs() {
        let x = start.x + fraction * v.x;
        Point2::new(x, anchor.y + (x - anchor.x) * dir.y / dir.x)
    } else {
        let y = start.y + fraction * v.y;
        Point2::new(anchor.x + (y - anchor.y) * dir.x / dir.y, y)
    }
}

/// Sample the fitted segments; each segment gets a step count proportional to its chord length
pub fn sample(points: &[Point2<f64>], spacing: f64) -> Vec<Point2<f64>> {
    let segments = fit(points);
    let mut out = Vec::new();
    for seg in segments.iter().filter(|s| s.chord_length() > 0.0) {
        let steps = (seg.chord_length() / spacing).ceil().max(1.0) as usize;
        for k in 0..steps {
            out.push(seg.eval(k as f64 / steps as f64));
        }
    }
    match segments.last() {
        Some(seg) => out.push(seg.end()),
        None => out.extend(points.first()),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_symmetric_arch_is_quadratic() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.3),
            Point2::new(1.0, 0.0),
        ];
        let angles = tangent_angles(&pts);
        assert_abs_diff_eq!(angles[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angles[0], -angles[2], epsilon = 1e-12);

        let segs = fit(&pts);
        assert_eq!(segs.len(), 2);
        match segs[0] {
            Segment::Quadratic { c, .. } => {
                // Control point sits on the horizontal tangent through the apex
                assert_abs_diff_eq!(c.y, 0.3, epsilon = 1e-12);
                assert!(c.x > 0.0 && c.x < 0.5);
            }
            other => panic!("expected quadratic, got {other:?}"),
        }
    }

    #[test]
    fn test_s_curve_uses_cubic() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 1.0),
        ];
        let segs = fit(&pts);
        assert!(matches!(segs[1], Segment::Cubic { .. }));
        assert!(matches!(segs[0], Segment::Quadratic { .. }));
    }

    #[test]
    fn test_collinear_points_give_lines() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ];
        for seg in fit(&pts) {
            assert!(matches!(seg, Segment::Line { .. }));
        }
    }

    #[test]
    fn test_coincident_points_are_skipped() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
        ];
        let out = sample(&pts, 0.1);
        assert_eq!(out[0], pts[0]);
        assert_eq!(*out.last().unwrap(), pts[3]);
        assert!(out.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_segment_eval_endpoints() {
        let seg = Segment::Cubic {
            p0: Point2::new(0.0, 0.0),
            c0: Point2::new(0.2, 1.0),
            c1: Point2::new(0.8, 1.0),
            p1: Point2::new(1.0, 0.0),
        };
        assert_eq!(seg.eval(0.0), seg.start());
        assert_eq!(seg.eval(1.0), seg.end());
        assert_abs_diff_eq!(seg.eval(0.5).y, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_inflection_near_seam() {
        // Chord pointing at -179 degrees, both tangents just across the seam on the same side
        let chord = (-179.0_f64).to_radians();
        assert!(is_inflection(
            178.0_f64.to_radians(),
            179.5_f64.to_radians(),
            chord
        ));
        // One tangent either side of the chord is an ordinary arc
        assert!(!is_inflection(
            179.0_f64.to_radians(),
            (-177.0_f64).to_radians(),
            chord
        ));
    }

    proptest! {
        #[test]
        fn inflection_is_rotation_invariant(
            a0 in -1.4f64..1.4,
            a1 in -1.4f64..1.4,
            rot in -4.0 * PI..4.0 * PI,
        ) {
            // Rotating the whole configuration (including across +/-180) must not change the classification
            prop_assert_eq!(
                is_inflection(a0, a1, 0.0),
                is_inflection(a0 + rot, a1 + rot, rot)
            );
        }

        #[test]
        fn samples_hit_every_control_point(
            ys in proptest::collection::vec(-1.0f64..1.0, 3..8),
        ) {
            let pts: Vec<Point2<f64>> = ys
                .iter()
                .enumerate()
                .map(|(i, y)| Point2::new(i as f64, *y))
                .collect();
            let out = sample(&pts, 0.05);
            for p in &pts {
                prop_assert!(out.iter().any(|s| (s - p).norm() < 1e-9));
            }
        }
    }
}

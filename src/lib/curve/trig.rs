//! Quarter-sine/cosine fit. Even-indexed points are on the curve; each odd point between two of them is the corner
//! of the quarter ellipse joining them, so moving it changes how sharply that span bends. A trailing even point with
//! no odd partner is joined with a straight line.

use std::f64::consts::FRAC_PI_2;

use nalgebra::geometry::Point2;

use crate::geometry::LineSegment;

/// Quarter ellipse from `a` to `b` inscribed in the corner `m`.
/// At `t = 0` it leaves `a` heading towards `m`, at `t = 1` it arrives at `b` heading away from `m`.
pub fn quarter_arc(a: Point2<f64>, m: Point2<f64>, b: Point2<f64>, t: f64) -> Point2<f64> {
    let center = Point2::from(a.coords + b.coords - m.coords);
    let theta = t * FRAC_PI_2;
    center + (a - center) * theta.cos() + (b - center) * theta.sin()
}

pub fn sample(points: &[Point2<f64>], spacing: f64) -> Vec<Point2<f64>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i + 2 < points.len() {
        let (a, m, b) = (points[i], points[i + 1], points[i + 2]);
        let legs = (m - a).norm() + (b - m).norm();
        if legs > 0.0 {
            let steps = (legs / spacing).ceil().max(1.0) as usize;
            for k in 0..steps {
                out.push(quarter_arc(a, m, b, k as f64 / steps as f64));
            }
        }
        i += 2;
    }
    if i + 1 < points.len() {
        let seg = LineSegment::new(points[i], points[i + 1]);
        if !seg.is_degenerate() {
            let steps = (seg.length() / spacing).ceil().max(1.0) as usize;
            for k in 0..steps {
                out.push(seg.lerp(k as f64 / steps as f64));
            }
        }
        i += 1;
    }
    out.extend(points.get(i));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quarter_arc_is_a_quarter_circle() {
        let a = Point2::new(0.0, 0.0);
        let m = Point2::new(0.0, 1.0);
        let b = Point2::new(1.0, 1.0);
        // Centre at (1, 0), radius 1
        for k in 0..=10 {
            let p = quarter_arc(a, m, b, k as f64 / 10.0);
            assert_abs_diff_eq!((p - Point2::new(1.0, 0.0)).norm(), 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(quarter_arc(a, m, b, 1.0).x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quarter_arc(a, m, b, 1.0).y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_corner_on_chord_is_straight() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 1.0);
        let m = Point2::new(1.0, 0.5);
        for k in 0..=8 {
            let p = quarter_arc(a, m, b, k as f64 / 8.0);
            assert_abs_diff_eq!(p.y, p.x / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_trailing_point_is_joined_straight() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 1.0),
        ];
        let out = sample(&pts, 0.25);
        assert_eq!(*out.last().unwrap(), pts[3]);
        let tail: Vec<_> = out.iter().filter(|p| p.x > 1.0).collect();
        assert!(!tail.is_empty());
        for p in tail {
            assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);
        }
    }
}

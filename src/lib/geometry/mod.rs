use std::f64::consts::{PI, TAU};

use nalgebra::geometry::Point2;
use nalgebra::Vector2;

/// Chords shorter than this are treated as coincident points
pub const DEGENERATE_LEN: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct LineSegment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl LineSegment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        LineSegment { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Direction of the chord in radians, in (-PI, PI]
    pub fn angle(&self) -> f64 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < DEGENERATE_LEN
    }

    pub fn lerp(&self, t: f64) -> Point2<f64> {
        self.start + (self.end - self.start) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BoundingBox {
    /// Smallest box containing every point, or None for an empty slice
    pub fn around<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point2<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = BoundingBox {
            min: *first,
            max: *first,
        };
        for p in iter {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        Some(bb)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Containment test with a tolerance `eps` on every side
    pub fn contains(&self, p: &Point2<f64>, eps: f64) -> bool {
        p.x >= self.min.x - eps
            && p.x <= self.max.x + eps
            && p.y >= self.min.y - eps
            && p.y <= self.max.y + eps
    }
}

/// Wrap an angle in radians into (-PI, PI]
pub fn wrap_angle(a: f64) -> f64 {
    let w = (a + PI).rem_euclid(TAU) - PI;
    if w <= -PI {
        w + TAU
    } else {
        w
    }
}

/// Unit vector pointing along `angle` (radians)
pub fn direction(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

/// Intersect the line through `p0` with direction `d0` and the line through `p1` with direction `d1`.
/// Returns None for parallel (or nearly parallel) lines.
pub fn intersect_lines(
    p0: Point2<f64>,
    d0: Vector2<f64>,
    p1: Point2<f64>,
    d1: Vector2<f64>,
) -> Option<Point2<f64>> {
    // Solve p0 + s*d0 = p1 + t*d1 for s using the 2D cross product
    let denom = d0.perp(&d1);
    if denom.abs() < 1e-12 {
        return None;
    }
    let s = (p1 - p0).perp(&d1) / denom;
    Some(p0 + d0 * s)
}

/// Left-hand unit normal of the direction `d`, or None if `d` has no length
pub fn left_normal(d: Vector2<f64>) -> Option<Vector2<f64>> {
    let len = d.norm();
    if len < DEGENERATE_LEN {
        None
    } else {
        Some(Vector2::new(-d.y, d.x) / len)
    }
}

/// Total length along a polyline
pub fn polyline_length(points: &[Point2<f64>]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Re-sample a polyline so consecutive points are (as near as possible) `spacing` apart, measured along the line.
/// The first and last points are kept exactly. `spacing` must be positive.
pub fn resample(polyline: &[Point2<f64>], spacing: f64) -> Vec<Point2<f64>> {
    if polyline.len() < 2 {
        return polyline.to_vec();
    }
    let total = polyline_length(polyline);
    if total < DEGENERATE_LEN {
        return vec![polyline[0]];
    }

    let count = (total / spacing).ceil().max(1.0) as usize;
    let step = total / count as f64;

    let mut result = Vec::with_capacity(count + 1);
    result.push(polyline[0]);

    let mut idx = 0;
    // Distance already consumed along polyline[idx] -> polyline[idx + 1]
    let mut consumed = 0.0;
    for _ in 1..count {
        let mut needed = step;
        while idx + 1 < polyline.len() {
            let seg = LineSegment::new(polyline[idx], polyline[idx + 1]);
            let available = seg.length() - consumed;
            if available >= needed {
                consumed += needed;
                result.push(seg.lerp(consumed / seg.length()));
                break;
            }
            needed -= available;
            consumed = 0.0;
            idx += 1;
        }
    }

    result.push(polyline[polyline.len() - 1]);
    result
}

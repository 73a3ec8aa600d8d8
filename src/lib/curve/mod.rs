//! Curve engine: an owned list of control points plus a lazily rebuilt sample cache.
//!
//! All mutation goes through `Curve`, which drops the cached samples (`touch`) and tells the caller whether anything
//! actually changed. Nothing holds a reference back into a curve, so there is no notification to get out of order.

pub mod bezier;
pub mod trig;

use std::str::FromStr;

use nalgebra::geometry::Point2;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geometry::{polyline_length, BoundingBox, LineSegment};

/// Sample spacing used until a caller asks for something else
pub const DEFAULT_SPACING: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStyle {
    /// Join the dots
    Straight,
    /// Tangent-continuous quadratic/cubic Bezier
    Bezier,
    /// Quarter sine/cosine arcs, odd points are arc corners
    Trig,
    /// Samples are the points themselves
    Raw,
}

impl FromStr for FitStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "straight" | "line" => Ok(FitStyle::Straight),
            "bezier" => Ok(FitStyle::Bezier),
            "trig" | "sine" => Ok(FitStyle::Trig),
            "raw" => Ok(FitStyle::Raw),
            other => Err(Error::Parse(format!("unknown fit style '{other}'"))),
        }
    }
}

/// Handle to a control point, stable across insertions and deletions on the same curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointId(u32);

#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    id: PointId,
    pub pos: Point2<f64>,
    /// Second ordinate for curves that carry two values per abscissa
    pub alt: Option<f64>,
}

impl ControlPoint {
    pub fn id(&self) -> PointId {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct Curve {
    style: FitStyle,
    points: Vec<ControlPoint>,
    next_id: u32,
    spacing: f64,
    cache: Option<Vec<Point2<f64>>>,
}

impl Curve {
    pub fn new(style: FitStyle) -> Self {
        Curve {
            style,
            points: Vec::new(),
            next_id: 0,
            spacing: DEFAULT_SPACING,
            cache: None,
        }
    }

    pub fn with_points<I>(style: FitStyle, points: I) -> Self
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        let mut curve = Curve::new(style);
        curve.set_all_points(points);
        curve
    }

    /// Drop the sample cache; the next read rebuilds it
    pub fn touch(&mut self) {
        self.cache = None;
    }

    pub fn style(&self) -> FitStyle {
        self.style
    }

    pub fn set_style(&mut self, style: FitStyle) -> bool {
        if self.style == style {
            return false;
        }
        self.style = style;
        self.touch();
        true
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: f64) -> Result<bool> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "sample spacing must be positive, got {spacing}"
            )));
        }
        if spacing == self.spacing {
            return Ok(false);
        }
        self.spacing = spacing;
        self.touch();
        Ok(true)
    }

    fn alloc_id(&mut self) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    /// Append a point at the end of the list
    pub fn add_point(&mut self, pos: Point2<f64>) -> PointId {
        let id = self.alloc_id();
        self.points.push(ControlPoint { id, pos, alt: None });
        self.touch();
        id
    }

    /// Insert a point keeping the list sorted by x. Equal x goes after existing points.
    pub fn insert_sorted(&mut self, pos: Point2<f64>) -> PointId {
        let id = self.alloc_id();
        let idx = self.points.partition_point(|p| p.pos.x <= pos.x);
        self.points.insert(idx, ControlPoint { id, pos, alt: None });
        self.touch();
        id
    }

    pub fn delete_point(&mut self, id: PointId) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                self.points.remove(idx);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Drag a point. A curve that was sorted by x stays sorted.
    pub fn move_point(&mut self, id: PointId, to: Point2<f64>) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if self.points[idx].pos == to {
            return false;
        }
        let was_sorted = self.is_sorted();
        let mut point = self.points.remove(idx);
        point.pos = to;
        let idx = if was_sorted {
            self.points.partition_point(|p| p.pos.x <= to.x)
        } else {
            idx
        };
        self.points.insert(idx, point);
        self.touch();
        true
    }

    pub fn set_alt(&mut self, id: PointId, alt: Option<f64>) -> bool {
        match self.index_of(id) {
            Some(idx) if self.points[idx].alt != alt => {
                self.points[idx].alt = alt;
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Replace every point, keeping the given order. Returns the new ids in that order.
    pub fn set_all_points<I>(&mut self, points: I) -> Vec<PointId>
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        self.points.clear();
        let ids = points.into_iter().map(|p| self.add_point(p)).collect();
        self.touch();
        ids
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn point(&self, id: PointId) -> Option<&ControlPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn positions(&self) -> Vec<Point2<f64>> {
        self.points.iter().map(|p| p.pos).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.points.windows(2).all(|w| w[0].pos.x <= w[1].pos.x)
    }

    /// Samples at the current spacing, rebuilt only if something changed since the last call
    pub fn samples(&mut self) -> &[Point2<f64>] {
        if self.cache.is_none() {
            self.cache = Some(self.build_samples());
        }
        self.cache.as_deref().unwrap_or_default()
    }

    /// Samples at approximately `spacing` apart
    pub fn sample(&mut self, spacing: f64) -> Result<&[Point2<f64>]> {
        self.set_spacing(spacing)?;
        Ok(self.samples())
    }

    fn build_samples(&self) -> Vec<Point2<f64>> {
        let pts = self.positions();
        match pts.len() {
            0 | 1 => pts,
            2 => straight(&pts, self.spacing),
            _ => match self.style {
                FitStyle::Straight => straight(&pts, self.spacing),
                FitStyle::Bezier => bezier::sample(&pts, self.spacing),
                FitStyle::Trig => trig::sample(&pts, self.spacing),
                FitStyle::Raw => pts,
            },
        }
    }

    /// Length along the sampled curve
    pub fn length(&mut self) -> f64 {
        polyline_length(self.samples())
    }

    /// y at abscissa `x`, interpolated between samples. None outside the sampled x range.
    /// The samples have to be sorted by x for the answer to mean anything.
    pub fn value_at(&mut self, x: f64) -> Option<f64> {
        let s = self.samples();
        let idx = s.partition_point(|p| p.x < x);
        if idx == s.len() {
            return None;
        }
        if idx == 0 {
            return (s[0].x == x).then_some(s[0].y);
        }
        let (a, b) = (s[idx - 1], s[idx]);
        let dx = b.x - a.x;
        if dx <= 0.0 {
            return Some(b.y);
        }
        Some(a.y + (b.y - a.y) * (x - a.x) / dx)
    }

    /// Like `value_at`, but `x` is clamped into the sampled range first. None only for an empty curve.
    pub fn clamped_value_at(&mut self, x: f64) -> Option<f64> {
        let s = self.samples();
        let lo = s.first()?.x;
        let hi = s.last()?.x;
        self.value_at(x.clamp(lo.min(hi), hi.max(lo)))
    }

    /// First abscissa where the sampled curve reaches `y`, or None if it never does
    pub fn abscissa_at(&mut self, y: f64) -> Option<f64> {
        let s = self.samples();
        if let [only] = s {
            return (only.y == y).then_some(only.x);
        }
        s.windows(2).find_map(|w| {
            let (a, b) = (w[0], w[1]);
            if y < a.y.min(b.y) || y > a.y.max(b.y) {
                return None;
            }
            let dy = b.y - a.y;
            if dy == 0.0 {
                Some(a.x)
            } else {
                Some(a.x + (b.x - a.x) * (y - a.y) / dy)
            }
        })
    }

    /// Secondary ordinate at `x`, linear between the control points that carry one
    pub fn alt_at(&self, x: f64) -> Option<f64> {
        let dual: Vec<(f64, f64)> = self
            .points
            .iter()
            .filter_map(|p| p.alt.map(|a| (p.pos.x, a)))
            .collect();
        let idx = dual.partition_point(|(px, _)| *px < x);
        match (idx.checked_sub(1).map(|i| dual[i]), dual.get(idx)) {
            (_, Some(&(px, a))) if px == x => Some(a),
            (Some((x0, a0)), Some(&(x1, a1))) => Some(a0 + (a1 - a0) * (x - x0) / (x1 - x0)),
            _ => None,
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::around(self.points.iter().map(|p| &p.pos))
    }

    /// Mirror the curve about the x axis
    pub fn invert(&mut self) {
        for p in &mut self.points {
            p.pos.y = -p.pos.y;
            p.alt = p.alt.map(|a| -a);
        }
        self.touch();
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        for p in &mut self.points {
            p.pos.x *= sx;
            p.pos.y *= sy;
            p.alt = p.alt.map(|a| a * sy);
        }
        if sx < 0.0 {
            self.points.reverse();
        }
        self.touch();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.pos.x += dx;
            p.pos.y += dy;
            p.alt = p.alt.map(|a| a + dy);
        }
        self.touch();
    }
}

/// Straight segments between consecutive points, each stepped in proportion to its length
fn straight(points: &[Point2<f64>], spacing: f64) -> Vec<Point2<f64>> {
    let mut out = Vec::new();
    for w in points.windows(2) {
        let seg = LineSegment::new(w[0], w[1]);
        if seg.is_degenerate() {
            continue;
        }
        let steps = (seg.length() / spacing).ceil().max(1.0) as usize;
        for k in 0..steps {
            out.push(seg.lerp(k as f64 / steps as f64));
        }
    }
    out.extend(points.last());
    out
}

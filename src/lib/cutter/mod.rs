//! Cutters, where they are mounted, and the path a cutter's reference point follows to cut a digitized surface.

use std::fmt;
use std::str::FromStr;

use log::warn;
use nalgebra::geometry::Point2;
use nalgebra::Vector2;
use serde::Deserialize;

use crate::curve::{Curve, FitStyle};
use crate::error::{Error, Result};
use crate::geometry::{left_normal, resample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
}

/// Which surface of the (hollow) workpiece something is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Inside,
    Outside,
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inside" | "in" => Ok(Side::Inside),
            "outside" | "out" => Ok(Side::Outside),
            other => Err(Error::Parse(format!("unknown side '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub face: Face,
    pub side: Side,
}

impl Location {
    pub fn new(face: Face, side: Side) -> Self {
        Location { face, side }
    }

    /// Sign applied to the offset distance. Positive displaces along the left-hand normal of the digitized curve.
    /// Mounting at the back mirrors the cutter through the spindle axis, and so does cutting from inside.
    pub fn sign(&self) -> f64 {
        match (self.face, self.side) {
            (Face::Front, Side::Outside) | (Face::Back, Side::Inside) => 1.0,
            (Face::Front, Side::Inside) | (Face::Back, Side::Outside) => -1.0,
        }
    }
}

impl FromStr for Location {
    type Err = Error;

    /// Parses `front-outside`, `back-inside` and so on
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        let (face, side) = lower
            .split_once(|c| c == '-' || c == '_' || c == ' ')
            .ok_or_else(|| Error::Parse(format!("expected <front|back>-<inside|outside>, got '{s}'")))?;
        let face = match face {
            "front" => Face::Front,
            "back" => Face::Back,
            other => return Err(Error::Parse(format!("unknown face '{other}'"))),
        };
        Ok(Location::new(face, side.parse()?))
    }
}

#[derive(Debug, Clone)]
pub enum CutterShape {
    /// Rotating disc (or ball) with the given radius
    Disc { radius: f64 },
    /// Pointed or rod cutter. `tip` maps depth below the point (x) to the half-width on one side (y), with the
    /// other side's half-width in the secondary ordinate when the tip is asymmetric. `width` is the full body width.
    Pointed { tip: Curve, width: f64 },
}

#[derive(Debug, Clone)]
pub struct Cutter {
    pub shape: CutterShape,
    pub location: Location,
    /// Rotation of the cutter frame about the machine's vertical axis, degrees
    pub rotation: f64,
    /// Tilt of the cutter frame, degrees
    pub tilt: f64,
}

impl Cutter {
    pub fn disc(radius: f64, location: Location) -> Self {
        Cutter {
            shape: CutterShape::Disc { radius },
            location,
            rotation: 0.0,
            tilt: 0.0,
        }
    }

    pub fn pointed(tip: Curve, width: f64, location: Location) -> Self {
        Cutter {
            shape: CutterShape::Pointed { tip, width },
            location,
            rotation: 0.0,
            tilt: 0.0,
        }
    }

    /// A symmetric V point with the given included angle (degrees)
    pub fn v_point(included_angle: f64, width: f64, location: Location) -> Self {
        let half_width_per_depth = (included_angle.to_radians() / 2.0).tan();
        let depth = (width / 2.0) / half_width_per_depth;
        let tip = Curve::with_points(
            FitStyle::Straight,
            [Point2::new(0.0, 0.0), Point2::new(depth, width / 2.0)],
        );
        Cutter::pointed(tip, width, location)
    }

    /// Distance from the reference point to the cutting edge. Pointed cutters cut at their reference point.
    pub fn radius(&self) -> f64 {
        match self.shape {
            CutterShape::Disc { radius } => radius,
            CutterShape::Pointed { .. } => 0.0,
        }
    }

    /// Width of the groove the cutter leaves when plunged `depth` into the work
    pub fn width_at_depth(&mut self, depth: f64) -> f64 {
        if depth <= 0.0 {
            return 0.0;
        }
        match &mut self.shape {
            CutterShape::Disc { radius } => {
                let r = *radius;
                if depth >= r {
                    2.0 * r
                } else {
                    2.0 * (2.0 * r * depth - depth * depth).sqrt()
                }
            }
            CutterShape::Pointed { tip, width } => match tip.value_at(depth) {
                Some(right) => {
                    let left = tip.alt_at(depth).unwrap_or(right);
                    (right + left).min(*width)
                }
                None => *width,
            },
        }
    }

    pub fn describe(&self) -> String {
        let shape = match &self.shape {
            CutterShape::Disc { radius } => format!("disc R={radius}"),
            CutterShape::Pointed { width, .. } => format!("pointed W={width}"),
        };
        format!(
            "{shape}, {}, rotation {} tilt {}",
            self.location, self.rotation, self.tilt
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let face = match self.face {
            Face::Front => "front",
            Face::Back => "back",
        };
        let side = match self.side {
            Side::Inside => "inside",
            Side::Outside => "outside",
        };
        write!(f, "{face}-{side}")
    }
}

/// Everything the offset between a digitized surface and the cutter path depends on
#[derive(Debug, Clone)]
pub struct CutterSetup {
    pub cutter: Cutter,
    /// Surface of the workpiece the outline was digitized from
    pub surface: Side,
    /// Material thickness between inside and outside surfaces
    pub thickness: f64,
}

impl CutterSetup {
    /// Signed perpendicular distance from the digitized surface to the cutter path.
    /// Cutting the digitized side only needs the cutter radius; cutting the other side adds the material thickness.
    pub fn offset_distance(&self) -> f64 {
        let r = self.cutter.radius();
        let magnitude = if self.cutter.location.side == self.surface {
            r
        } else {
            r + self.thickness.max(0.0)
        };
        magnitude * self.cutter.location.sign()
    }
}

/// The path the cutter's reference point follows to cut `surface`
pub fn cutter_path(surface: &mut Curve, setup: &CutterSetup) -> Curve {
    cutter_path_with_allowance(surface, setup, 0.0)
}

/// As `cutter_path`, standing a further `allowance` off the surface (for roughing passes).
/// Always computed from the surface samples, so repeated calls never accumulate error.
pub fn cutter_path_with_allowance(surface: &mut Curve, setup: &CutterSetup, allowance: f64) -> Curve {
    let base = setup.offset_distance();
    let distance = base + allowance * setup.cutter.location.sign();
    let spacing = surface.spacing();
    let samples = surface.samples();

    let displaced: Vec<Point2<f64>> = match normals(samples) {
        Some(normals) => samples
            .iter()
            .zip(normals)
            .map(|(p, n)| p + n * distance)
            .collect(),
        None => samples.to_vec(),
    };

    let mut path = Curve::with_points(FitStyle::Raw, resample(&displaced, spacing));
    // Spacing came from a curve that already validated it
    let _ = path.set_spacing(spacing);
    path
}

/// Unit left-hand normal at every sample, from the neighbouring samples. Where neighbours coincide the nearest good
/// normal is reused. None if the samples have no direction at all.
fn normals(samples: &[Point2<f64>]) -> Option<Vec<Vector2<f64>>> {
    let n = samples.len();
    let raw: Vec<Option<Vector2<f64>>> = (0..n)
        .map(|i| {
            let before = samples[i.saturating_sub(1)];
            let after = samples[(i + 1).min(n - 1)];
            left_normal(after - before)
        })
        .collect();

    let first_good = raw.iter().flatten().next().copied()?;
    let missing = raw.iter().filter(|n| n.is_none()).count();
    if missing > 0 {
        warn!("{missing} coincident samples, reusing neighbouring normals");
    }
    let mut last = first_good;
    Some(
        raw.into_iter()
            .map(|n| {
                if let Some(n) = n {
                    last = n;
                }
                last
            })
            .collect(),
    )
}

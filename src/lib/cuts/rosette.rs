use log::debug;
use serde::Deserialize;

use crate::curve::Curve;
use crate::cuts::{pass_depths, require_points};
use crate::error::{Error, Result};
use crate::motion::{forward_to, wrap_degrees, MotionList};

/// Which way the pattern moves the cutter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosetteAxis {
    /// Cutting the side of a cylinder, pattern moves x
    Radial,
    /// Cutting a face, pattern moves z
    Axial,
}

impl std::str::FromStr for RosetteAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "radial" => Ok(RosetteAxis::Radial),
            "axial" | "face" => Ok(RosetteAxis::Axial),
            other => Err(Error::Parse(format!("unknown rosette axis '{other}'"))),
        }
    }
}

/// A rosette: one pattern curve repeated around the work, cut in coarse passes then a fine pass.
///
/// The pattern's x range is one repeat and its y is the displacement, scaled by `amplitude`.
#[derive(Debug, Clone)]
pub struct Rosette {
    /// Radius the cutter works at
    pub radius: f64,
    pub amplitude: f64,
    /// Pattern repeats per revolution
    pub repeats: u32,
    /// Pattern rotation, degrees
    pub phase: f64,
    /// Axial position of the surface being cut
    pub surface_z: f64,
    pub depth: f64,
    pub pass_depth: f64,
    /// Left for the last pass; zero for no fine pass
    pub finish_depth: f64,
    /// Spindle increments per revolution
    pub steps: u32,
    pub clearance: f64,
    pub axis: RosetteAxis,
}

impl Rosette {
    pub fn generate(&self, pattern: &mut Curve, list: &mut MotionList) -> Result<()> {
        require_points(pattern, "rosette", 2)?;
        if self.repeats == 0 || self.steps == 0 {
            return Err(Error::InvalidParameter(
                "a rosette needs at least one repeat and one step".into(),
            ));
        }
        let depths = pass_depths(self.depth, self.pass_depth, self.finish_depth)?;
        let offsets = self.offsets(pattern)?;
        let peak = offsets.iter().fold(0.0f64, |m, o| m.max(*o));
        debug!(
            "Rosette: {} repeats, {} steps, {} passes, peak displacement {:.4}",
            self.repeats,
            self.steps,
            depths.len(),
            peak
        );

        let mut c = 0.0;
        for (pass, depth) in depths.iter().enumerate() {
            let kind = if self.finish_depth > 0.0 && pass + 1 == depths.len() {
                "fine"
            } else {
                "coarse"
            };
            list.comment(format!(
                "Rosette {kind} pass {} of {}, depth {:.4}",
                pass + 1,
                depths.len(),
                depth
            ));

            let c0 = forward_to(c, 0.0);
            let (rx, rz) = self.retract(peak);
            list.move_xz_fastest(rx, rz);
            list.turn_spindle(c0);
            let (x, z) = self.position(*depth, offsets[0]);
            list.move_xz(x, z);
            for step in 1..=self.steps as usize {
                let (x, z) = self.position(*depth, offsets[step % offsets.len()]);
                let angle = 360.0 * step as f64 / self.steps as f64;
                list.move_xzc_at_rpm(x, z, c0 + angle);
            }
            list.move_xz_fastest(rx, rz);
            list.wrap_spindle();
            c = wrap_degrees(c0 + 360.0);
        }
        Ok(())
    }

    /// Scaled pattern displacement at each spindle step
    fn offsets(&self, pattern: &mut Curve) -> Result<Vec<f64>> {
        let samples = pattern.samples();
        let (lo, hi) = match (samples.first(), samples.last()) {
            (Some(a), Some(b)) if a.x != b.x => (a.x, b.x),
            _ => {
                return Err(Error::InvalidParameter(
                    "rosette pattern has no extent in x".into(),
                ))
            }
        };
        (0..self.steps)
            .map(|step| {
                let turns = (360.0 * step as f64 / self.steps as f64 + self.phase) / 360.0;
                let fraction = (turns * self.repeats as f64).rem_euclid(1.0);
                pattern
                    .clamped_value_at(lo + fraction * (hi - lo))
                    .map(|v| v * self.amplitude)
                    .ok_or_else(|| Error::InvalidParameter("rosette pattern has no samples".into()))
            })
            .collect()
    }

    /// Where the cutter sits `depth` into the work with the pattern displaced by `offset`
    fn position(&self, depth: f64, offset: f64) -> (f64, f64) {
        match self.axis {
            RosetteAxis::Radial => (self.radius - depth + offset, self.surface_z),
            RosetteAxis::Axial => (self.radius, self.surface_z - depth + offset),
        }
    }

    fn retract(&self, peak: f64) -> (f64, f64) {
        match self.axis {
            RosetteAxis::Radial => (self.radius + peak + self.clearance, self.surface_z),
            RosetteAxis::Axial => (self.radius, self.surface_z + peak + self.clearance),
        }
    }
}

//! Machine constants and digitized profile files.
//!
//! Both are TOML. Every machine field has a default, so a file only needs the values that differ.
//!
//! ```toml
//! steps_per_inch = 16000.0
//! steps_per_rev = 14400
//! max_velocity = 20.0
//! ```

use std::fs::read_to_string;
use std::path::Path;

use log::debug;
use nalgebra::geometry::Point2;
use serde::Deserialize;

use crate::curve::{Curve, FitStyle, DEFAULT_SPACING};
use crate::cutter::Side;
use crate::error::{Error, Result};
use crate::svg;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Machine {
    /// Linear stepper resolution, steps per inch
    pub steps_per_inch: f64,
    /// Spindle stepper resolution, steps per revolution
    pub steps_per_rev: u32,
    /// Fastest linear motion, inches per minute
    pub max_velocity: f64,
    /// Fastest spindle rotation, revolutions per minute
    pub max_rpm: f64,
    /// Most motion instructions the controller can issue per minute.
    /// Caps inverse-time feeds so very short moves don't starve the controller.
    pub max_issue_rate: f64,
    /// Linear cutting rate, inches per minute
    pub cruise_velocity: f64,
    /// Spindle cutting rate, revolutions per minute
    pub cruise_rpm: f64,
}

impl Default for Machine {
    fn default() -> Self {
        Machine {
            steps_per_inch: 16000.0,
            steps_per_rev: 14400,
            max_velocity: 20.0,
            max_rpm: 10.0,
            max_issue_rate: 6000.0,
            cruise_velocity: 5.0,
            cruise_rpm: 2.0,
        }
    }
}

impl Machine {
    pub fn from_toml(text: &str) -> Result<Self> {
        let machine: Machine = toml::from_str(text)?;
        machine.validate()?;
        Ok(machine)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading machine constants from {}", path.display());
        Self::from_toml(&read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("steps_per_inch", self.steps_per_inch),
            ("max_velocity", self.max_velocity),
            ("max_rpm", self.max_rpm),
            ("max_issue_rate", self.max_issue_rate),
            ("cruise_velocity", self.cruise_velocity),
            ("cruise_rpm", self.cruise_rpm),
        ];
        for (name, v) in rates {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        if self.steps_per_rev < 2 {
            return Err(Error::InvalidParameter(format!(
                "steps_per_rev must be at least 2, got {}",
                self.steps_per_rev
            )));
        }
        Ok(())
    }
}

/// A digitized outline plus what is known about the material it was taken from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub fit: FitStyle,
    /// Material thickness, inches
    pub thickness: f64,
    /// Surface the points were digitized on
    pub surface: Side,
    /// Sample spacing along the fitted curve, inches
    pub resolution: f64,
    pub points: Vec<[f64; 2]>,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            fit: FitStyle::Bezier,
            thickness: 0.0,
            surface: Side::Outside,
            resolution: DEFAULT_SPACING,
            points: Vec::new(),
        }
    }
}

impl Profile {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a `.toml` profile, or take the points from an `.svg` outline with default settings
    pub fn load(path: &Path) -> Result<Self> {
        let is_svg = path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("svg"));
        if is_svg {
            let points = svg::load_outline(path)?;
            Ok(Profile {
                points: points.iter().map(|p| [p.x, p.y]).collect(),
                ..Default::default()
            })
        } else {
            let profile = Self::from_toml(&read_to_string(path)?)?;
            debug!("Read {} profile points from {}", profile.points.len(), path.display());
            Ok(profile)
        }
    }

    /// The fitted curve through the profile's points
    pub fn curve(&self) -> Result<Curve> {
        let mut curve = Curve::with_points(
            self.fit,
            self.points.iter().map(|[x, y]| Point2::new(*x, *y)),
        );
        curve.set_spacing(self.resolution)?;
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_partial_machine_file_keeps_defaults() {
        let m = Machine::from_toml("max_velocity = 30.0\nsteps_per_rev = 3600\n").unwrap();
        assert_abs_diff_eq!(m.max_velocity, 30.0);
        assert_eq!(m.steps_per_rev, 3600);
        assert_abs_diff_eq!(m.cruise_rpm, Machine::default().cruise_rpm);
    }

    #[test]
    fn test_machine_rejects_zero_rates() {
        assert!(Machine::from_toml("cruise_rpm = 0.0").is_err());
        assert!(Machine::from_toml("steps_per_rev = 1").is_err());
        assert!(Machine::from_toml("max_rpm = \"fast\"").is_err());
    }

    #[test]
    fn test_profile_curve() {
        let p = Profile::from_toml(
            r#"
            fit = "trig"
            thickness = 0.125
            surface = "inside"
            resolution = 0.05
            points = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
            "#,
        )
        .unwrap();
        assert_eq!(p.surface, Side::Inside);
        let c = p.curve().unwrap();
        assert_eq!(c.style(), FitStyle::Trig);
        assert_eq!(c.len(), 3);
        assert_abs_diff_eq!(c.spacing(), 0.05);
    }
}

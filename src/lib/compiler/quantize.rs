use crate::config::Machine;

/// Axis positions in integer stepper units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Steps {
    pub x: i64,
    pub z: i64,
    pub c: i64,
}

/// Converts between real coordinates and the controller's integer step resolution
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    steps_per_inch: f64,
    steps_per_rev: i64,
}

impl Quantizer {
    pub fn new(machine: &Machine) -> Self {
        Quantizer {
            steps_per_inch: machine.steps_per_inch,
            steps_per_rev: i64::from(machine.steps_per_rev),
        }
    }

    pub fn linear_steps(&self, inches: f64) -> i64 {
        (inches * self.steps_per_inch).round() as i64
    }

    /// The real position a linear step count stands for
    pub fn linear(&self, steps: i64) -> f64 {
        steps as f64 / self.steps_per_inch
    }

    pub fn angle_steps(&self, degrees: f64) -> i64 {
        (degrees / 360.0 * self.steps_per_rev as f64).round() as i64
    }

    /// The angle in degrees a spindle step count stands for
    pub fn angle(&self, steps: i64) -> f64 {
        steps as f64 * 360.0 / self.steps_per_rev as f64
    }

    /// Equivalent spindle position in [-half, half) revolution, or None if `steps` is already there
    pub fn wrap(&self, steps: i64) -> Option<i64> {
        let half = self.steps_per_rev / 2;
        if (-half..self.steps_per_rev - half).contains(&steps) {
            return None;
        }
        Some((steps + half).rem_euclid(self.steps_per_rev) - half)
    }
}

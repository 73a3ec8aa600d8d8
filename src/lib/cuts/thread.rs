use std::f64::consts::PI;

use log::debug;

use crate::error::{Error, Result};
use crate::motion::{forward_to, wrap_degrees, MotionList};

/// Geometry of a 60 degree thread form, all in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadForm {
    pub pitch: f64,
    /// Axial advance per revolution (pitch times number of starts)
    pub lead: f64,
    /// Depth of a sharp-V thread at this pitch
    pub full_depth: f64,
    /// Depth actually cut for the requested percentage of engagement
    pub cut_depth: f64,
}

impl ThreadForm {
    /// `percent` is the thread engagement, 0 to 100
    pub fn new(tpi: f64, starts: u32, percent: f64) -> Result<Self> {
        if !(tpi.is_finite() && tpi > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "threads per inch must be positive, got {tpi}"
            )));
        }
        if starts == 0 {
            return Err(Error::InvalidParameter("a thread needs at least one start".into()));
        }
        if !(percent > 0.0 && percent <= 100.0) {
            return Err(Error::InvalidParameter(format!(
                "thread engagement must be in (0, 100] percent, got {percent}"
            )));
        }
        let pitch = 1.0 / tpi;
        let full_depth = pitch * (PI / 3.0).sin();
        Ok(ThreadForm {
            pitch,
            lead: pitch * starts as f64,
            full_depth,
            cut_depth: (full_depth + full_depth * percent / 100.0) / 2.0,
        })
    }
}

/// Helical thread cut, external or internal
#[derive(Debug, Clone)]
pub struct Thread {
    pub tpi: f64,
    pub starts: u32,
    /// Engagement percentage
    pub percent: f64,
    /// Radius of the surface being threaded: the outside of a rod, or the inside of a bore
    pub radius: f64,
    /// Thread length, cut from `start_z` towards the headstock (negative z)
    pub length: f64,
    pub start_z: f64,
    pub internal: bool,
    /// Most infeed per pass
    pub pass_depth: f64,
    /// Radial clearance when not cutting
    pub clearance: f64,
}

impl Thread {
    pub fn form(&self) -> Result<ThreadForm> {
        ThreadForm::new(self.tpi, self.starts, self.percent)
    }

    pub fn generate(&self, list: &mut MotionList) -> Result<()> {
        let form = self.form()?;
        if !(self.length > 0.0 && self.pass_depth > 0.0 && self.clearance >= 0.0) {
            return Err(Error::InvalidParameter(
                "thread length and pass depth must be positive".into(),
            ));
        }

        // Internal threads cut outwards from the bore, external ones inwards from the rod
        let outwards = if self.internal { -1.0 } else { 1.0 };
        let retract_x = self.radius + outwards * self.clearance;
        let end_z = self.start_z - self.length;
        let turn = 360.0 * self.length / form.lead;

        let passes = (form.cut_depth / self.pass_depth).ceil().max(1.0) as usize;
        debug!(
            "Thread pitch {:.4} lead {:.4} depth {:.4} in {} passes",
            form.pitch, form.lead, form.cut_depth, passes
        );
        list.comment(format!(
            "{} tpi, {} start(s), {}% thread, depth {:.4}",
            self.tpi, self.starts, self.percent, form.cut_depth
        ));

        // Spindle angle as the machine will read it
        let mut c = 0.0;
        for pass in 0..passes {
            let depth = (self.pass_depth * (pass + 1) as f64).min(form.cut_depth);
            let cut_x = self.radius - outwards * depth;
            for start in 0..self.starts {
                list.comment(format!(
                    "Pass {} of {}, start {} of {}, depth {:.4}",
                    pass + 1,
                    passes,
                    start + 1,
                    self.starts,
                    depth
                ));
                let c0 = forward_to(c, 360.0 * start as f64 / self.starts as f64);
                list.move_xz_fastest(retract_x, self.start_z);
                list.turn_spindle(c0);
                list.move_xz(cut_x, self.start_z);
                list.move_xzc_at_rpm(cut_x, end_z, c0 + turn);
                list.move_xz_fastest(retract_x, end_z);
                list.wrap_spindle();
                c = wrap_degrees(c0 + turn);
            }
        }
        list.move_xz_fastest(retract_x, self.start_z);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionInstruction;
    use approx::assert_abs_diff_eq;

    fn thread() -> Thread {
        Thread {
            tpi: 20.0,
            starts: 1,
            percent: 60.0,
            radius: 0.25,
            length: 0.5,
            start_z: 0.0,
            internal: false,
            pass_depth: 0.01,
            clearance: 0.05,
        }
    }

    #[test]
    fn test_thread_form() {
        let f = ThreadForm::new(20.0, 1, 60.0).unwrap();
        assert_abs_diff_eq!(f.pitch, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(f.lead, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(f.full_depth, 0.0433, epsilon = 1e-4);
        assert_abs_diff_eq!(f.cut_depth, 0.0346, epsilon = 1e-4);

        let two_start = ThreadForm::new(20.0, 2, 60.0).unwrap();
        assert_abs_diff_eq!(two_start.lead, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_thread_parameters() {
        assert!(ThreadForm::new(0.0, 1, 60.0).is_err());
        assert!(ThreadForm::new(20.0, 0, 60.0).is_err());
        assert!(ThreadForm::new(20.0, 1, 120.0).is_err());
        let mut t = thread();
        t.pass_depth = 0.0;
        assert!(t.generate(&mut MotionList::new()).is_err());
    }

    #[test]
    fn test_helix_moves() {
        let t = thread();
        let mut list = MotionList::new();
        t.generate(&mut list).unwrap();

        let helices: Vec<_> = list
            .iter()
            .filter_map(|i| match i {
                MotionInstruction::MoveXzcAtRpm { x, z, c } => Some((*x, *z, *c)),
                _ => None,
            })
            .collect();
        // 0.0346 deep in 0.01 passes
        assert_eq!(helices.len(), 4);
        // Half an inch at 0.05 lead is ten turns
        let (x, z, c) = helices[0];
        assert_abs_diff_eq!(x, 0.24, epsilon = 1e-12);
        assert_abs_diff_eq!(z, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(c, 3600.0, epsilon = 1e-9);
        let (x, _, _) = helices[3];
        assert_abs_diff_eq!(x, 0.25 - t.form().unwrap().cut_depth, epsilon = 1e-12);
        // Every helix starts from the same spindle angle, so the passes stay in register
        for (_, _, c) in &helices {
            assert_abs_diff_eq!(*c, 3600.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_multi_start_and_internal() {
        let mut t = thread();
        t.starts = 3;
        t.internal = true;
        t.pass_depth = 1.0;
        let mut list = MotionList::new();
        t.generate(&mut list).unwrap();

        let turns: Vec<f64> = list
            .iter()
            .filter_map(|i| match i {
                MotionInstruction::TurnSpindle { c } => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(turns.len(), 3);
        // Each start begins a third of a turn on from the last one
        for (start, c) in turns.iter().enumerate() {
            assert_abs_diff_eq!(
                wrap_degrees(*c - 120.0 * start as f64),
                0.0,
                epsilon = 1e-6
            );
        }
        // Internal threads cut outwards
        let cut = list.iter().find_map(|i| match i {
            MotionInstruction::MoveXzcAtRpm { x, .. } => Some(*x),
            _ => None,
        });
        assert!(cut.unwrap() > t.radius);
    }
}

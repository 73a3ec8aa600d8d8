use log::{debug, info};
use nalgebra::geometry::Point2;

use crate::curve::Curve;
use crate::cutter::{cutter_path_with_allowance, CutterSetup};
use crate::cuts::require_points;
use crate::error::{Error, Result};
use crate::motion::{forward_to, wrap_degrees, MotionList};

/// Follow a digitized surface with the cutter, optionally at several spindle indexes (fluting).
///
/// Curve x is the machine's z (along the bed), curve y is the machine's x (radius).
#[derive(Debug, Clone)]
pub struct Contour {
    /// Stock left on by the first pass; each later pass takes an equal share until the last follows the surface
    pub allowance: f64,
    pub passes: u32,
    /// Cut from the last digitized point to the first
    pub reverse: bool,
    /// Equally spaced spindle positions to repeat the contour at
    pub divisions: u32,
    pub clearance: f64,
    /// Spindle angle of the first division, degrees
    pub start_angle: f64,
}

impl Contour {
    pub fn generate(
        &self,
        surface: &mut Curve,
        setup: &CutterSetup,
        list: &mut MotionList,
    ) -> Result<()> {
        require_points(surface, "contour", 2)?;
        if self.passes == 0 || self.divisions == 0 {
            return Err(Error::InvalidParameter(
                "a contour needs at least one pass and one division".into(),
            ));
        }
        if !(self.allowance >= 0.0 && self.clearance >= 0.0) {
            return Err(Error::InvalidParameter(
                "allowance and clearance can't be negative".into(),
            ));
        }

        // Every pass comes straight from the surface, never from the previous pass
        let paths: Vec<Vec<Point2<f64>>> = (0..self.passes)
            .map(|i| {
                let allowance = self.allowance * (1.0 - (i + 1) as f64 / self.passes as f64);
                let mut path = cutter_path_with_allowance(surface, setup, allowance);
                let mut points = path.samples().to_vec();
                if self.reverse {
                    points.reverse();
                }
                points
            })
            .collect();

        let sign = setup.cutter.location.sign();
        let safe_x = self.safe_x(&paths, sign);
        info!(
            "Contour with {}, offset {:.4}, {} passes at {} divisions",
            setup.cutter.describe(),
            setup.offset_distance(),
            self.passes,
            self.divisions
        );

        let mut c = 0.0;
        for division in 0..self.divisions {
            let target = self.start_angle + 360.0 * division as f64 / self.divisions as f64;
            let c0 = forward_to(c, target);
            list.comment(format!(
                "Division {} of {} at {:.2} degrees",
                division + 1,
                self.divisions,
                wrap_degrees(target)
            ));
            if let Some(first) = paths.first().and_then(|p| p.first()) {
                list.move_xz_fastest(safe_x, first.x);
            }
            list.turn_spindle(c0);

            for (pass, points) in paths.iter().enumerate() {
                let (first, last) = match (points.first(), points.last()) {
                    (Some(f), Some(l)) => (f, l),
                    _ => continue,
                };
                debug!("Contour pass {} with {} points", pass + 1, points.len());
                list.comment(format!("Pass {} of {}", pass + 1, self.passes));
                list.move_xz_fastest(safe_x, first.x);
                for p in points {
                    list.move_xz(p.y, p.x);
                }
                list.move_xz_fastest(safe_x, last.x);
            }
            list.wrap_spindle();
            c = wrap_degrees(c0);
        }
        Ok(())
    }

    /// Radius clear of every pass, on the side the cutter approaches from
    fn safe_x(&self, paths: &[Vec<Point2<f64>>], sign: f64) -> f64 {
        let ys = paths.iter().flatten().map(|p| p.y);
        if sign >= 0.0 {
            ys.fold(f64::NEG_INFINITY, f64::max) + self.clearance
        } else {
            ys.fold(f64::INFINITY, f64::min) - self.clearance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::FitStyle;
    use crate::cutter::{Cutter, Face, Location, Side};
    use crate::motion::MotionInstruction;
    use approx::assert_abs_diff_eq;

    fn surface() -> Curve {
        Curve::with_points(
            FitStyle::Straight,
            vec![Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)],
        )
    }

    fn setup(face: Face) -> CutterSetup {
        CutterSetup {
            cutter: Cutter::disc(0.1, Location::new(face, Side::Outside)),
            surface: Side::Outside,
            thickness: 0.05,
        }
    }

    fn contour() -> Contour {
        Contour {
            allowance: 0.02,
            passes: 2,
            reverse: false,
            divisions: 2,
            clearance: 0.05,
            start_angle: 0.0,
        }
    }

    fn cutting_moves(list: &MotionList) -> Vec<(f64, f64)> {
        list.iter()
            .filter_map(|i| match i {
                MotionInstruction::MoveXz { x, z } => Some((*x, *z)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_passes_close_in_on_the_path() {
        let mut list = MotionList::new();
        contour()
            .generate(&mut surface(), &setup(Face::Front), &mut list)
            .unwrap();

        let moves = cutting_moves(&list);
        let (x, z) = moves[0];
        assert_abs_diff_eq!(x, 1.11, epsilon = 1e-9);
        assert_abs_diff_eq!(z, 0.0, epsilon = 1e-9);
        let (x, z) = moves[moves.len() / 4 - 1];
        assert_abs_diff_eq!(x, 1.11, epsilon = 1e-9);
        assert_abs_diff_eq!(z, 1.0, epsilon = 1e-9);
        let (x, _) = moves[moves.len() / 4 * 3];
        assert_abs_diff_eq!(x, 1.1, epsilon = 1e-9);

        let safe = list.iter().find_map(|i| match i {
            MotionInstruction::MoveXzFastest { x, .. } => Some(*x),
            _ => None,
        });
        assert_abs_diff_eq!(safe.unwrap(), 1.16, epsilon = 1e-9);
    }

    #[test]
    fn test_divisions_index_the_spindle() {
        let mut c = contour();
        c.divisions = 3;
        c.start_angle = 30.0;
        let mut list = MotionList::new();
        c.generate(&mut surface(), &setup(Face::Front), &mut list)
            .unwrap();
        let turns: Vec<f64> = list
            .iter()
            .filter_map(|i| match i {
                MotionInstruction::TurnSpindle { c } => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(turns.len(), 3);
        for (t, expected) in turns.iter().zip([30.0, 150.0, 270.0]) {
            assert_abs_diff_eq!(*t, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reverse_and_back_mounting() {
        let mut c = contour();
        c.reverse = true;
        c.passes = 1;
        c.divisions = 1;
        let mut list = MotionList::new();
        c.generate(&mut surface(), &setup(Face::Back), &mut list)
            .unwrap();
        let moves = cutting_moves(&list);
        let (x, z) = moves[0];
        // Back mounting offsets the other way
        assert_abs_diff_eq!(x, 0.9, epsilon = 1e-9);
        assert_abs_diff_eq!(z, 1.0, epsilon = 1e-9);
        let safe = list.iter().find_map(|i| match i {
            MotionInstruction::MoveXzFastest { x, .. } => Some(*x),
            _ => None,
        });
        assert_abs_diff_eq!(safe.unwrap(), 0.85, epsilon = 1e-9);
    }

    #[test]
    fn test_needs_two_points() {
        let mut one = Curve::with_points(FitStyle::Straight, vec![Point2::new(0.0, 1.0)]);
        let err = contour().generate(&mut one, &setup(Face::Front), &mut MotionList::new());
        assert!(matches!(err, Err(Error::NotEnoughPoints { .. })));
    }
}

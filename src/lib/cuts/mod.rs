//! Cut strategies. Each one turns its parameters (and a curve, where it follows one) into a `MotionList`;
//! ordering, direction and pass count are decided here, never by the compiler.

pub mod contour;
pub mod rosette;
pub mod thread;

pub use contour::Contour;
pub use rosette::{Rosette, RosetteAxis};
pub use thread::{Thread, ThreadForm};

use crate::curve::Curve;
use crate::error::{Error, Result};

fn require_points(curve: &Curve, operation: &'static str, needed: usize) -> Result<()> {
    if curve.len() < needed {
        return Err(Error::NotEnoughPoints {
            operation,
            needed,
            found: curve.len(),
        });
    }
    Ok(())
}

/// Depths of successive passes: `pass_depth` at a time down to `depth - finish`, then one pass at full `depth` if
/// `finish` is non-zero
fn pass_depths(depth: f64, pass_depth: f64, finish: f64) -> Result<Vec<f64>> {
    if !(depth > 0.0 && pass_depth > 0.0 && finish >= 0.0 && finish < depth) {
        return Err(Error::InvalidParameter(format!(
            "need depth > finish depth >= 0 and a positive pass depth, got depth {depth}, pass {pass_depth}, finish {finish}"
        )));
    }
    let rough = depth - finish;
    let coarse = (rough / pass_depth).ceil().max(1.0) as usize;
    let mut depths: Vec<f64> = (1..=coarse)
        .map(|i| (pass_depth * i as f64).min(rough))
        .collect();
    if finish > 0.0 {
        depths.push(depth);
    }
    Ok(depths)
}

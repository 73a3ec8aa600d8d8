//! Tool paths for an ornamental lathe with a rotary spindle axis.
//!
//! Digitized points become a fitted `curve::Curve`, the cutter's path is an offset of that curve, cut strategies in
//! `cuts` turn paths and patterns into a `motion::MotionList`, and `compiler` turns the list into G code.

pub mod compiler;
pub mod config;
pub mod curve;
pub mod cuts;
pub mod cutter;
pub mod error;
pub mod geometry;
pub mod motion;
pub mod svg;

pub use error::{Error, Result};

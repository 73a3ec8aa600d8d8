//! Error type shared by the whole tool-path pipeline.
//!
//! Geometry degeneracies (coincident points, zero-length chords, zero
//! thickness) are not errors; they are repaired where they happen.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The operation needs more digitized points than were supplied
    #[error("{operation} needs at least {needed} points, found {found}")]
    NotEnoughPoints {
        operation: &'static str,
        needed: usize,
        found: usize,
    },

    /// A parameter is outside the range the operation can work with
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A motion instruction carried a NaN or infinite coordinate.
    /// This is a bug in whatever produced the motion list.
    #[error("Motion instruction {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("Malformed input: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("SVG error: {0}")]
    Svg(#[from] roxmltree::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

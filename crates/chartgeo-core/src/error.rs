//! Error types for chartgeo-core
//!
//! Provides a unified error type for all operations in the core crate:
//! point validation, raster construction and the affine solver.

use thiserror::Error;

/// Chartgeo core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Fewer coordinate pairs than the transform needs
    #[error("insufficient points: {required} required, {supplied} supplied")]
    InsufficientPoints { required: usize, supplied: usize },

    /// Reference points are collinear or coincident, so no unique
    /// transform exists
    #[error("degenerate geometry: reference points are collinear")]
    DegenerateGeometry,

    /// Non-finite or out-of-range coordinate
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Invalid raster dimensions
    #[error("invalid raster dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Raster without any band
    #[error("raster has no bands")]
    NoBands,

    /// Band buffer does not hold `width * height` samples
    #[error("band {band} has {actual} samples, expected {expected}")]
    BandLengthMismatch {
        band: usize,
        expected: usize,
        actual: usize,
    },

    /// Band sample type differs from the first band
    #[error("band {band} sample type differs from band 0")]
    SampleTypeMismatch { band: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for chartgeo core operations
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the georeferencing pipeline

use chartgeo_io::IoError;
use thiserror::Error;

/// Error type for [`Georeferencer`](crate::Georeferencer) runs
///
/// A run either succeeds completely or fails with one of these; no
/// partially written output is left behind.
#[derive(Error, Debug)]
pub enum GeorefError {
    /// Invalid reference points or raster
    #[error(transparent)]
    Core(#[from] chartgeo_core::Error),

    /// Reading the source image or writing the output failed
    #[error(transparent)]
    Io(#[from] IoError),

    /// The finished output file could not be kept
    #[error("failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Coarse classification of a [`GeorefError`], for reporting to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fewer than three coordinate pairs
    InsufficientPoints,
    /// Reference points collinear or coincident
    DegenerateGeometry,
    /// Bad coordinates or an invalid raster
    InvalidInput,
    /// Source could not be read or decoded, or the output could not be written
    Io,
}

impl GeorefError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeorefError::Core(e) | GeorefError::Io(IoError::Core(e)) => core_kind(e),
            GeorefError::Io(_) | GeorefError::Persist(_) => ErrorKind::Io,
        }
    }
}

fn core_kind(e: &chartgeo_core::Error) -> ErrorKind {
    match e {
        chartgeo_core::Error::InsufficientPoints { .. } => ErrorKind::InsufficientPoints,
        chartgeo_core::Error::DegenerateGeometry => ErrorKind::DegenerateGeometry,
        _ => ErrorKind::InvalidInput,
    }
}

/// Result type alias for pipeline operations
pub type GeorefResult<T> = Result<T, GeorefError>;

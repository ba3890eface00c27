//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// Failed to encode a fixture image
    #[error("failed to encode fixture: {message}")]
    FixtureEncode { message: String },

    /// Fixture raster has a layout the encoder cannot express
    #[error("unsupported fixture layout: {0}")]
    UnsupportedFixture(String),

    /// Failed to write an output file
    #[error("failed to write '{path}': {message}")]
    FileWrite { path: String, message: String },

    /// Invalid fixture parameters
    #[error("core error: {0}")]
    Core(#[from] chartgeo_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;

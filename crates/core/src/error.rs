//! Error types for AgroRisk

use thiserror::Error;

/// Main error type for AgroRisk operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid array shape: expected {expected} axes, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("Band index {index} out of range for raster with {bands} bands")]
    BandIndex { index: usize, bands: usize },

    #[error("Invalid raster dimensions: {rows}x{cols}x{bands}")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        bands: usize,
    },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("{0}")]
    Other(String),
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        Error::Other(format!("TIFF error: {}", e))
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(e: ndarray::ShapeError) -> Self {
        Error::Other(format!("Array shape error: {}", e))
    }
}

/// Result type alias for AgroRisk operations
pub type Result<T> = std::result::Result<T, Error>;

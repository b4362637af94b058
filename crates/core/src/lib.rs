//! # AgroRisk Core
//!
//! Core types and I/O for the AgroRisk spectral analysis workspace.
//!
//! This crate provides:
//! - `SpectralCube`: immutable multi-band raster (rows, cols, bands)
//! - `Raster<T>`: single-band 2D grid used for index, risk and confidence maps
//! - `Error` / `Result`: the error taxonomy shared by every crate
//! - TIFF reading and writing without GDAL

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{Raster, RasterElement, SpectralCube};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Raster, RasterElement, RasterStatistics, SpectralCube};
}

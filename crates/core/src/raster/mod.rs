//! Raster data structures
//!
//! - [`SpectralCube`]: the multi-band input raster
//! - [`Raster`]: single-band grids derived from it

mod cube;
mod element;
mod grid;

pub use cube::SpectralCube;
pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};

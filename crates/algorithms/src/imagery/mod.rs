//! Imagery analysis algorithms
//!
//! Spectral indices computed straight from a multi-band cube:
//! - NDVI, NDRE: normalized differences, clipped to [-1, 1]
//! - MSI: SWIR / NIR moisture ratio, unclipped
//! - SAVI: soil adjusted vegetation index, clipped to [-2, 2]

mod indices;

pub use indices::{
    msi, ndre, ndvi, normalized_difference, savi, BandMapping, IndexSummary, SaviParams,
    SpectralIndex,
};

//! # AgroRisk Algorithms
//!
//! Analysis stages for multispectral crop imagery.
//!
//! ## Available Algorithm Categories
//!
//! - **imagery**: Spectral indices (NDVI, NDRE, MSI, SAVI) and their summaries
//! - **risk**: Sliding-window risk mapping, region alerts, end-to-end analysis

pub mod imagery;
pub mod risk;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        msi, ndre, ndvi, normalized_difference, savi, BandMapping, IndexSummary, SaviParams,
        SpectralIndex,
    };
    pub use crate::risk::{
        analyze, analyze_with_indices, annotate_regions, map_risk, Alert, AnalysisParams,
        AnalysisReport, AnnotatorParams, FnClassifier, MinimumDistanceClassifier,
        PatchClassifier, RiskCatalog, RiskLevel, RiskMapperParams,
    };
    pub use agrorisk_core::prelude::*;
}

//! Crop risk mapping
//!
//! - [`map_risk`]: sliding-window classification into risk and confidence maps
//! - [`annotate_regions`]: connected regions of each risk class as alerts
//! - [`analyze`]: both stages packed into a serializable report
//!
//! Class names, recommendations and level thresholds come from a
//! [`RiskCatalog`]. The classifier is supplied by the caller through
//! [`PatchClassifier`].

mod analysis;
mod catalog;
mod classifier;
mod mapper;
mod regions;
mod windows;

pub use analysis::{analyze, analyze_with_indices, AnalysisParams, AnalysisReport, Dimensions};
pub use catalog::{
    RiskCatalog, RiskClass, RiskLevel, RiskLevelThresholds, DEFAULT_FALLBACK_RECOMMENDATION,
};
pub use classifier::{
    top_class, ClassSignature, FnClassifier, MinimumDistanceClassifier, PatchClassifier,
};
pub use mapper::{map_risk, ClassProbability, RiskMapperParams, RiskMapping};
pub use regions::{
    annotate_regions, label_components, Alert, AnnotatorParams, BoundingBox, PixelPoint, Zone,
};
pub use windows::{patch_size_for, Window, WindowIterator};

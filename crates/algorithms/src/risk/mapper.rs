//! Sliding-window risk mapping
//!
//! The cube is tiled into square patches that overlap their neighbours by
//! half. Each patch is scored by a [`PatchClassifier`]; the winning class id
//! and its probability are painted over the patch footprint in a risk map
//! and a confidence map. Where footprints overlap, the window visited last
//! in row-major order wins.
//!
//! Patches are scored in parallel, but the maps are written in window order
//! afterwards, so the result does not depend on thread scheduling.

use crate::maybe_rayon::*;
use crate::risk::catalog::RiskCatalog;
use crate::risk::classifier::{check_probabilities, top_class, PatchClassifier};
use crate::risk::windows::{patch_size_for, Window, WindowIterator};
use agrorisk_core::{Error, Raster, Result, SpectralCube};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for [`map_risk`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMapperParams {
    /// Largest patch edge; the actual edge is capped by the shorter
    /// raster side (default: 32)
    pub max_patch_size: usize,
}

impl Default for RiskMapperParams {
    fn default() -> Self {
        Self { max_patch_size: 32 }
    }
}

/// Probability assigned to one class by the whole-raster classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub name: String,
    pub probability: f32,
}

/// Output of [`map_risk`]
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMapping {
    /// Winning class id per pixel; 0 where no window reached
    pub risk_map: Raster<u8>,
    /// Probability of the winning class per pixel, in [0, 1]
    pub confidence_map: Raster<f32>,
    /// Top class of the whole-raster classification
    pub overall_class: usize,
    /// Name of `overall_class`
    pub overall_prediction: String,
    pub overall_confidence: f32,
    /// Whole-raster probabilities in class-id order
    pub class_probabilities: Vec<ClassProbability>,
    /// Patch edge used
    pub patch_size: usize,
    /// Number of windows classified
    pub window_count: usize,
}

/// Classify one patch and return the winning class id and its clamped
/// probability
fn classify_window<C: PatchClassifier + ?Sized>(
    cube: &SpectralCube,
    classifier: &C,
    window: &Window,
    num_classes: usize,
) -> Result<(u8, f32)> {
    let patch = cube.patch(window.row, window.col, window.size);
    let probabilities = classifier.classify(patch.view())?;
    check_probabilities(&probabilities, num_classes)?;
    let (class, probability) = top_class(&probabilities)
        .ok_or_else(|| Error::Classifier("empty probability vector".into()))?;
    Ok((class as u8, probability.clamp(0.0, 1.0)))
}

/// Build per-pixel risk and confidence maps.
///
/// Patch size is `min(max_patch_size, rows, cols)` with stride half of
/// that. A one-pixel patch would give a zero stride, so the stride is
/// raised to 1 and a raster with a side of 1 is still mapped pixel by
/// pixel. Windows are placed at every stride step where they fit entirely,
/// row-major. Pixels that no window reaches keep class 0 and confidence 0.
///
/// The whole cube is also classified once to produce an overall verdict.
///
/// # Errors
/// - [`Error::InvalidParameter`] for a zero `max_patch_size` or an invalid catalog
/// - [`Error::Classifier`] when the classifier fails or returns a vector
///   whose length differs from the catalog's class count. The first failing
///   patch aborts the run; no partial maps are returned.
pub fn map_risk<C: PatchClassifier + ?Sized>(
    cube: &SpectralCube,
    classifier: &C,
    catalog: &RiskCatalog,
    params: &RiskMapperParams,
) -> Result<RiskMapping> {
    if params.max_patch_size == 0 {
        return Err(Error::InvalidParameter {
            name: "max_patch_size",
            value: "0".into(),
            reason: "patch size must be at least 1".into(),
        });
    }
    catalog.validate()?;
    let num_classes = catalog.num_classes();

    let (rows, cols, bands) = cube.shape();

    // Whole-raster verdict
    let probabilities = classifier.classify(cube.view())?;
    check_probabilities(&probabilities, num_classes)?;
    let (overall_class, overall_confidence) = top_class(&probabilities)
        .ok_or_else(|| Error::Classifier("empty probability vector".into()))?;
    let class_probabilities: Vec<ClassProbability> = catalog
        .classes
        .iter()
        .zip(&probabilities)
        .map(|(class, &p)| ClassProbability {
            name: class.name.clone(),
            probability: p,
        })
        .collect();
    let overall_prediction = catalog
        .class_name(overall_class)
        .unwrap_or_default()
        .to_string();

    let patch_size = patch_size_for(rows, cols, params.max_patch_size);
    let windows: Vec<Window> = WindowIterator::half_overlap(rows, cols, patch_size).collect();
    debug!(
        rows,
        cols,
        bands,
        patch_size,
        windows = windows.len(),
        "mapping risk"
    );

    let results: Vec<(u8, f32)> = windows
        .par_iter()
        .map(|w| classify_window(cube, classifier, w, num_classes))
        .collect::<Result<Vec<_>>>()?;

    let mut risk_map: Raster<u8> = Raster::new(rows, cols);
    let mut confidence_map: Raster<f32> = Raster::new(rows, cols);
    for (w, &(class, probability)) in windows.iter().zip(&results) {
        risk_map.fill_square(w.row, w.col, w.size, class);
        confidence_map.fill_square(w.row, w.col, w.size, probability);
    }

    Ok(RiskMapping {
        risk_map,
        confidence_map,
        overall_class,
        overall_prediction,
        overall_confidence: overall_confidence.clamp(0.0, 1.0),
        class_probabilities,
        patch_size,
        window_count: windows.len(),
    })
}

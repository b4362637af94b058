//! Patch classifiers
//!
//! The risk mapper does not know how a patch is scored. Anything that turns
//! a `(rows, cols, bands)` block of reflectance into one probability per
//! risk class can be plugged in through [`PatchClassifier`].
//!
//! Two implementations ship with the crate:
//! - [`FnClassifier`] wraps a closure
//! - [`MinimumDistanceClassifier`] scores the mean spectrum of a patch
//!   against per-class mean signatures

use agrorisk_core::{Error, Result};
use ndarray::{ArrayView3, Axis};
use serde::{Deserialize, Serialize};

/// Scores a multi-band patch against the risk classes.
///
/// `classify` returns one probability per class, indexed by class id.
/// The mapper rejects vectors whose length differs from the class count.
/// Implementations are shared across worker threads while tiles are being
/// classified, hence the `Sync` bound.
pub trait PatchClassifier: Sync {
    fn classify(&self, patch: ArrayView3<'_, f32>) -> Result<Vec<f32>>;
}

impl<C: PatchClassifier + ?Sized> PatchClassifier for &C {
    fn classify(&self, patch: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
        (**self).classify(patch)
    }
}

impl<C: PatchClassifier + ?Sized> PatchClassifier for Box<C> {
    fn classify(&self, patch: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
        (**self).classify(patch)
    }
}

/// Adapter turning a closure into a [`PatchClassifier`]
pub struct FnClassifier<F> {
    f: F,
}

impl<F> FnClassifier<F>
where
    F: Fn(ArrayView3<'_, f32>) -> Result<Vec<f32>> + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> PatchClassifier for FnClassifier<F>
where
    F: Fn(ArrayView3<'_, f32>) -> Result<Vec<f32>> + Sync,
{
    fn classify(&self, patch: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
        (self.f)(patch)
    }
}

/// Index and value of the largest probability.
///
/// Ties resolve to the lowest class id. Returns `None` for an empty slice.
pub fn top_class(probabilities: &[f32]) -> Option<(usize, f32)> {
    let mut iter = probabilities.iter().copied().enumerate();
    let first = iter.next()?;
    Some(iter.fold(first, |best, (i, p)| if p > best.1 { (i, p) } else { best }))
}

/// Check a probability vector returned by a classifier
pub(crate) fn check_probabilities(probabilities: &[f32], num_classes: usize) -> Result<()> {
    if probabilities.len() != num_classes {
        return Err(Error::Classifier(format!(
            "expected {} class probabilities, got {}",
            num_classes,
            probabilities.len()
        )));
    }
    if let Some(p) = probabilities.iter().find(|p| !p.is_finite()) {
        return Err(Error::Classifier(format!(
            "non-finite class probability: {}",
            p
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Minimum distance
// ---------------------------------------------------------------------------

/// Mean reflectance spectrum of one risk class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSignature {
    /// Class name, matching the catalog entry at the same position
    pub name: String,
    /// Mean value per band
    pub mean: Vec<f32>,
}

fn default_temperature() -> f32 {
    1.0
}

/// Minimum distance classifier with soft output.
///
/// Each patch is reduced to its mean spectrum. Class scores are the negated
/// Euclidean distances to the class signatures divided by `temperature`,
/// turned into probabilities with a softmax. A lower temperature gives
/// sharper, more confident output.
///
/// Zero padding at the raster edge is averaged in like any other pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumDistanceClassifier {
    signatures: Vec<ClassSignature>,
    #[serde(default = "default_temperature")]
    temperature: f32,
}

impl MinimumDistanceClassifier {
    pub fn new(signatures: Vec<ClassSignature>, temperature: f32) -> Result<Self> {
        let classifier = Self {
            signatures,
            temperature,
        };
        classifier.validate()?;
        Ok(classifier)
    }

    /// Load signatures from JSON:
    /// `{"temperature": 0.1, "signatures": [{"name": "healthy", "mean": [..]}, ..]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let classifier: Self = serde_json::from_str(json).map_err(|e| Error::InvalidParameter {
            name: "signatures",
            value: "<json>".into(),
            reason: e.to_string(),
        })?;
        classifier.validate()?;
        Ok(classifier)
    }

    fn validate(&self) -> Result<()> {
        if self.signatures.len() < 2 {
            return Err(Error::InvalidParameter {
                name: "signatures",
                value: self.signatures.len().to_string(),
                reason: "at least 2 class signatures are required".into(),
            });
        }
        let bands = self.signatures[0].mean.len();
        if bands == 0 {
            return Err(Error::InvalidParameter {
                name: "signatures",
                value: self.signatures[0].name.clone(),
                reason: "signature has no bands".into(),
            });
        }
        if let Some(sig) = self.signatures.iter().find(|s| s.mean.len() != bands) {
            return Err(Error::InvalidParameter {
                name: "signatures",
                value: sig.name.clone(),
                reason: format!("expected {} bands, found {}", bands, sig.mean.len()),
            });
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(Error::InvalidParameter {
                name: "temperature",
                value: self.temperature.to_string(),
                reason: "must be a positive finite number".into(),
            });
        }
        Ok(())
    }

    pub fn signatures(&self) -> &[ClassSignature] {
        &self.signatures
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Number of bands the signatures describe
    pub fn bands(&self) -> usize {
        self.signatures[0].mean.len()
    }
}

impl PatchClassifier for MinimumDistanceClassifier {
    fn classify(&self, patch: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
        let (rows, cols, bands) = patch.dim();
        if bands != self.bands() {
            return Err(Error::Classifier(format!(
                "patch has {} bands, signatures describe {}",
                bands,
                self.bands()
            )));
        }
        let pixels = (rows * cols) as f32;
        if pixels == 0.0 {
            return Err(Error::Classifier("empty patch".into()));
        }

        let spectrum = patch.sum_axis(Axis(0)).sum_axis(Axis(0)) / pixels;

        let scores: Vec<f32> = self
            .signatures
            .iter()
            .map(|sig| {
                let dist = spectrum
                    .iter()
                    .zip(&sig.mean)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
                    .sqrt();
                -dist / self.temperature
            })
            .collect();

        Ok(softmax(&scores))
    }
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

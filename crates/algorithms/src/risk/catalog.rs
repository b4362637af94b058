//! Risk class vocabulary, recommendations and severity thresholds.
//!
//! These are lookup tables rather than branches in the algorithms, so they
//! can be tuned or translated by loading a different catalog from JSON
//! without touching the tiling or labeling code.

use agrorisk_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Recommendation used for any class without a specific entry
pub const DEFAULT_FALLBACK_RECOMMENDATION: &str =
    "Consult local agricultural expert for appropriate treatment.";

/// Severity of an alert, derived from its average confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence cutoffs for [`RiskLevel`]. Both bounds are exclusive:
/// a confidence must be strictly greater than `high` to rate as high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLevelThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            high: 0.8,
            medium: 0.6,
        }
    }
}

impl RiskLevelThresholds {
    /// Classify a confidence: `> high` is high, `> medium` is medium, else low
    pub fn level(&self, confidence: f64) -> RiskLevel {
        if confidence > self.high {
            RiskLevel::High
        } else if confidence > self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// One entry of the class table. The position in the table is the class id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskClass {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl RiskClass {
    pub fn new(name: &str, recommendation: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            recommendation: recommendation.map(str::to_string),
        }
    }
}

/// Class names, per-class recommendations and level thresholds.
///
/// Class id 0 is the healthy baseline; it is never alerted and carries no
/// recommendation in the default table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCatalog {
    pub classes: Vec<RiskClass>,
    #[serde(default = "default_fallback")]
    pub fallback_recommendation: String,
    #[serde(default)]
    pub thresholds: RiskLevelThresholds,
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK_RECOMMENDATION.to_string()
}

impl Default for RiskCatalog {
    fn default() -> Self {
        Self {
            classes: vec![
                RiskClass::new("healthy", None),
                RiskClass::new(
                    "stress",
                    Some(
                        "Apply appropriate fertilizers and adjust irrigation schedule. \
                         Monitor for nutrient deficiencies.",
                    ),
                ),
                RiskClass::new(
                    "pest_risk",
                    Some(
                        "Apply appropriate pesticide treatment. \
                         Consider Integrated Pest Management (IPM) practices.",
                    ),
                ),
                RiskClass::new(
                    "disease",
                    Some(
                        "Apply fungicide treatment as per local agricultural guidelines. \
                         Remove affected plant parts if possible.",
                    ),
                ),
            ],
            fallback_recommendation: default_fallback(),
            thresholds: RiskLevelThresholds::default(),
        }
    }
}

impl RiskCatalog {
    /// Parse and validate a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json).map_err(|e| Error::InvalidParameter {
            name: "catalog",
            value: "<json>".into(),
            reason: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the table is usable: 2 to 256 uniquely named classes and
    /// thresholds with `medium <= high`.
    pub fn validate(&self) -> Result<()> {
        let n = self.classes.len();
        if !(2..=256).contains(&n) {
            return Err(Error::InvalidParameter {
                name: "classes",
                value: n.to_string(),
                reason: "catalog needs between 2 and 256 classes".into(),
            });
        }

        for (i, class) in self.classes.iter().enumerate() {
            if self.classes[..i].iter().any(|c| c.name == class.name) {
                return Err(Error::InvalidParameter {
                    name: "classes",
                    value: class.name.clone(),
                    reason: "duplicate class name".into(),
                });
            }
        }

        let t = self.thresholds;
        if !(t.medium.is_finite() && t.high.is_finite()) || t.medium > t.high {
            return Err(Error::InvalidParameter {
                name: "thresholds",
                value: format!("medium={}, high={}", t.medium, t.high),
                reason: "expected finite values with medium <= high".into(),
            });
        }
        Ok(())
    }

    /// Number of classes, including the healthy baseline
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Name of a class id
    pub fn class_name(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(|c| c.name.as_str())
    }

    /// Recommendation keyed by class name, or the fallback text
    pub fn recommendation(&self, risk_type: &str) -> &str {
        self.classes
            .iter()
            .find(|c| c.name == risk_type)
            .and_then(|c| c.recommendation.as_deref())
            .unwrap_or(&self.fallback_recommendation)
    }

    /// Severity for an average confidence
    pub fn risk_level(&self, confidence: f64) -> RiskLevel {
        self.thresholds.level(confidence)
    }
}

//! End-to-end risk analysis
//!
//! [`analyze`] runs the risk mapper and the region annotator and packs the
//! outcome into a serializable [`AnalysisReport`]. [`analyze_with_indices`]
//! additionally computes spectral indices alongside the risk path.

use crate::imagery::{BandMapping, IndexSummary, SpectralIndex};
use crate::maybe_rayon::*;
use crate::risk::catalog::{RiskCatalog, RiskLevel};
use crate::risk::classifier::PatchClassifier;
use crate::risk::mapper::{map_risk, ClassProbability, RiskMapperParams};
use crate::risk::regions::{annotate_regions, Alert, AnnotatorParams};
use agrorisk_core::{Error, Raster, RasterElement, Result, SpectralCube};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::info;

/// Parameters for [`analyze`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub mapper: RiskMapperParams,
    pub annotator: AnnotatorParams,
}

/// Raster extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: usize,
    pub width: usize,
}

/// Everything an analysis produces.
///
/// Maps serialize as nested row arrays and `class_probabilities` as a
/// name to probability object in class-id order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    #[serde(serialize_with = "serialize_raster")]
    pub risk_map: Raster<u8>,
    #[serde(serialize_with = "serialize_raster")]
    pub confidence_map: Raster<f32>,
    pub overall_prediction: String,
    pub overall_confidence: f32,
    #[serde(serialize_with = "serialize_probabilities")]
    pub class_probabilities: Vec<ClassProbability>,
    pub alerts: Vec<Alert>,
    pub dimensions: Dimensions,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub index_summaries: BTreeMap<SpectralIndex, IndexSummary>,
}

fn serialize_raster<T, S>(raster: &Raster<T>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: RasterElement + Serialize,
    S: Serializer,
{
    serializer.collect_seq(raster.to_nested())
}

fn serialize_probabilities<S: Serializer>(
    probabilities: &[ClassProbability],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(probabilities.iter().map(|c| (&c.name, c.probability)))
}

impl AnalysisReport {
    /// Alerts at a given level
    pub fn alerts_at(&self, level: RiskLevel) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(move |a| a.risk_level == level)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }
}

/// Map risk over the cube and annotate the resulting regions.
///
/// Fails fast: any classifier or parameter error aborts the analysis.
pub fn analyze<C: PatchClassifier + ?Sized>(
    cube: &SpectralCube,
    classifier: &C,
    catalog: &RiskCatalog,
    params: &AnalysisParams,
) -> Result<AnalysisReport> {
    let mapping = map_risk(cube, classifier, catalog, &params.mapper)?;
    let alerts = annotate_regions(
        &mapping.risk_map,
        &mapping.confidence_map,
        catalog,
        &params.annotator,
    )?;

    info!(
        prediction = %mapping.overall_prediction,
        confidence = mapping.overall_confidence,
        alerts = alerts.len(),
        "risk analysis complete"
    );

    Ok(AnalysisReport {
        dimensions: Dimensions {
            height: cube.rows(),
            width: cube.cols(),
        },
        risk_map: mapping.risk_map,
        confidence_map: mapping.confidence_map,
        overall_prediction: mapping.overall_prediction,
        overall_confidence: mapping.overall_confidence,
        class_probabilities: mapping.class_probabilities,
        alerts,
        index_summaries: BTreeMap::new(),
    })
}

/// Run [`analyze`] and compute the requested spectral indices concurrently.
///
/// The report carries a summary of each index; the full index rasters are
/// returned alongside in the order requested. An error on either side
/// fails the whole call.
pub fn analyze_with_indices<C: PatchClassifier + ?Sized>(
    cube: &SpectralCube,
    classifier: &C,
    catalog: &RiskCatalog,
    params: &AnalysisParams,
    bands: &BandMapping,
    indices: &[SpectralIndex],
) -> Result<(AnalysisReport, Vec<(SpectralIndex, Raster<f32>)>)> {
    let (report, rasters) = join(
        || analyze(cube, classifier, catalog, params),
        || {
            indices
                .par_iter()
                .map(|&index| index.compute(cube, bands).map(|raster| (index, raster)))
                .collect::<Result<Vec<_>>>()
        },
    );
    let mut report = report?;
    let rasters = rasters?;

    report.index_summaries = rasters
        .iter()
        .map(|(index, raster)| (*index, IndexSummary::of(raster)))
        .collect();

    Ok((report, rasters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::classifier::FnClassifier;
    use ndarray::{Array3, ArrayView3};

    fn cube() -> SpectralCube {
        let mut data = Array3::<f32>::zeros((64, 64, 6));
        data.index_axis_mut(ndarray::Axis(2), 2).fill(0.1);
        data.index_axis_mut(ndarray::Axis(2), 3).fill(0.2);
        SpectralCube::from_array(data).unwrap()
    }

    fn pest(_: ArrayView3<f32>) -> Result<Vec<f32>> {
        Ok(vec![0.05, 0.03, 0.9, 0.02])
    }

    #[test]
    fn test_analyze_constant_pest() {
        let report = analyze(
            &cube(),
            &FnClassifier::new(pest),
            &RiskCatalog::default(),
            &AnalysisParams::default(),
        )
        .unwrap();

        assert_eq!(report.dimensions, Dimensions { height: 64, width: 64 });
        assert_eq!(report.overall_prediction, "pest_risk");
        assert!((report.overall_confidence - 0.9).abs() < 1e-6);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts_at(RiskLevel::High).count(), 1);
        assert!(report.index_summaries.is_empty());
    }

    #[test]
    fn test_tiny_regions_give_no_alerts() {
        let mut data = Array3::<f32>::zeros((100, 100, 2));
        data[(50, 50, 0)] = 1.0;
        let cube = SpectralCube::from_array(data).unwrap();

        // Only the window anchored on the marked pixel reports disease
        let classifier = FnClassifier::new(|patch: ArrayView3<f32>| {
            if patch[(0, 0, 0)] == 1.0 {
                Ok(vec![0.1, 0.0, 0.1, 0.8])
            } else {
                Ok(vec![0.8, 0.1, 0.1, 0.0])
            }
        });
        let params = AnalysisParams {
            mapper: RiskMapperParams { max_patch_size: 2 },
            ..AnalysisParams::default()
        };

        let report = analyze(&cube, &classifier, &RiskCatalog::default(), &params).unwrap();
        assert!(report.alerts.is_empty());
        assert_eq!(report.risk_map.get(50, 50).unwrap(), 3);
        assert_eq!(report.risk_map.data().iter().filter(|&&c| c == 3).count(), 1);
        // stride 1 reaches every pixel
        assert!(report
            .confidence_map
            .data()
            .iter()
            .all(|&p| (p - 0.8).abs() < 1e-6));
    }

    #[test]
    fn test_report_json_layout() {
        let report = analyze(
            &cube(),
            &FnClassifier::new(pest),
            &RiskCatalog::default(),
            &AnalysisParams::default(),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["risk_map"].as_array().unwrap().len(), 64);
        assert_eq!(json["risk_map"][0].as_array().unwrap().len(), 64);
        assert_eq!(json["risk_map"][10][20], 2);
        assert_eq!(json["dimensions"]["height"], 64);
        assert_eq!(json["alerts"][0]["risk_level"], "high");

        let probs = json["class_probabilities"].as_object().unwrap();
        let names: Vec<&String> = probs.keys().collect();
        assert_eq!(names.len(), 4);
        assert!(probs.contains_key("disease"));
        assert!(json.get("index_summaries").is_none());
    }

    #[test]
    fn test_analyze_with_indices() {
        let (report, rasters) = analyze_with_indices(
            &cube(),
            &FnClassifier::new(pest),
            &RiskCatalog::default(),
            &AnalysisParams::default(),
            &BandMapping::default(),
            &[SpectralIndex::Ndvi, SpectralIndex::Msi],
        )
        .unwrap();

        assert_eq!(rasters.len(), 2);
        assert_eq!(rasters[0].0, SpectralIndex::Ndvi);
        let ndvi = &report.index_summaries[&SpectralIndex::Ndvi];
        assert!((ndvi.mean - 1.0 / 3.0).abs() < 1e-5);
        assert_eq!(report.alerts.len(), 1);
    }

    #[test]
    fn test_index_failure_fails_analysis() {
        let bands = BandMapping {
            swir: 9,
            ..BandMapping::default()
        };
        let result = analyze_with_indices(
            &cube(),
            &FnClassifier::new(pest),
            &RiskCatalog::default(),
            &AnalysisParams::default(),
            &bands,
            &[SpectralIndex::Msi],
        );
        assert!(matches!(result, Err(Error::BandIndex { index: 9, .. })));
    }
}

//! Region annotation
//!
//! Turns a risk map into alerts: for every non-baseline class, the
//! 4-connected regions of that class are found, small ones are dropped and
//! each remaining region is described by its centroid, bounding box, area
//! share and mean confidence.

use crate::risk::catalog::{RiskCatalog, RiskLevel};
use agrorisk_core::{Error, Raster, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for [`annotate_regions`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorParams {
    /// A region is kept only if its pixel count is strictly greater than
    /// this fraction of the raster (default: 0.01)
    pub min_area_fraction: f64,
}

impl Default for AnnotatorParams {
    fn default() -> Self {
        Self {
            min_area_fraction: 0.01,
        }
    }
}

impl AnnotatorParams {
    /// `min_area_fraction` must be finite and in `[0, 1)`
    pub fn validate(&self) -> Result<()> {
        let f = self.min_area_fraction;
        if !f.is_finite() || !(0.0..1.0).contains(&f) {
            return Err(Error::InvalidParameter {
                name: "min_area_fraction",
                value: f.to_string(),
                reason: "must be a finite fraction in [0, 1)".into(),
            });
        }
        Ok(())
    }
}

/// Pixel position, `x` along columns and `y` along rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: usize,
    pub y: usize,
}

/// Bounding box in pixels. `width` and `height` are `max - min` of the
/// region's columns and rows, so a single-pixel region has size 0x0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Truncated mean of the region's pixel coordinates
    pub center: PixelPoint,
    pub bbox: BoundingBox,
}

/// A reportable risk region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub risk_type: String,
    pub risk_level: RiskLevel,
    pub zone: Zone,
    /// Share of the raster covered by the region, rounded to 2 decimals
    pub area_percentage: f64,
    /// Mean confidence over the region's pixels
    pub average_confidence: f64,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// Label the 4-connected components of a boolean mask.
///
/// Returns the label grid (0 = background, components numbered from 1) and
/// the number of components. Labels are assigned in raster-scan order of
/// each component's first pixel.
pub fn label_components(mask: ArrayView2<'_, bool>) -> (Array2<u32>, usize) {
    let (rows, cols) = mask.dim();
    let mut labels = Array2::<u32>::zeros((rows, cols));
    let mut count: u32 = 0;
    let mut stack = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            if !mask[(r, c)] || labels[(r, c)] != 0 {
                continue;
            }
            count += 1;
            labels[(r, c)] = count;
            stack.push((r, c));

            while let Some((cr, cc)) = stack.pop() {
                let mut visit = |nr: usize, nc: usize| {
                    if mask[(nr, nc)] && labels[(nr, nc)] == 0 {
                        labels[(nr, nc)] = count;
                        stack.push((nr, nc));
                    }
                };
                // 4-connected neighbors
                if cr > 0 {
                    visit(cr - 1, cc);
                }
                if cr + 1 < rows {
                    visit(cr + 1, cc);
                }
                if cc > 0 {
                    visit(cr, cc - 1);
                }
                if cc + 1 < cols {
                    visit(cr, cc + 1);
                }
            }
        }
    }

    (labels, count as usize)
}

/// Running totals for one labeled region
#[derive(Debug, Clone)]
struct RegionStats {
    count: usize,
    sum_row: usize,
    sum_col: usize,
    min_row: usize,
    max_row: usize,
    min_col: usize,
    max_col: usize,
    sum_confidence: f64,
}

impl RegionStats {
    fn new() -> Self {
        Self {
            count: 0,
            sum_row: 0,
            sum_col: 0,
            min_row: usize::MAX,
            max_row: 0,
            min_col: usize::MAX,
            max_col: 0,
            sum_confidence: 0.0,
        }
    }

    fn add(&mut self, row: usize, col: usize, confidence: f32) {
        self.count += 1;
        self.sum_row += row;
        self.sum_col += col;
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
        self.sum_confidence += confidence as f64;
    }

    fn zone(&self) -> Zone {
        Zone {
            center: PixelPoint {
                x: self.sum_col / self.count,
                y: self.sum_row / self.count,
            },
            bbox: BoundingBox {
                x: self.min_col,
                y: self.min_row,
                width: self.max_col - self.min_col,
                height: self.max_row - self.min_row,
            },
        }
    }
}

/// Two decimals, ties to even
fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// Extract alerts from a risk map and its confidence map.
///
/// Classes `1..num_classes` are processed in ascending id order and, within
/// a class, regions in label order. Class 0 is the healthy baseline and is
/// never alerted. Cells holding ids outside the catalog are ignored.
///
/// # Errors
/// - [`Error::SizeMismatch`] if the two maps differ in shape
/// - [`Error::InvalidParameter`] if `min_area_fraction` is not in `[0, 1)`
pub fn annotate_regions(
    risk_map: &Raster<u8>,
    confidence_map: &Raster<f32>,
    catalog: &RiskCatalog,
    params: &AnnotatorParams,
) -> Result<Vec<Alert>> {
    params.validate()?;

    let (rows, cols) = risk_map.shape();
    let (ar, ac) = confidence_map.shape();
    if (ar, ac) != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar,
            ac,
        });
    }

    let total = rows * cols;
    let min_area = total as f64 * params.min_area_fraction;
    let risk = risk_map.view();
    let confidence = confidence_map.view();
    let mut alerts = Vec::new();

    for (class_id, class) in catalog.classes.iter().enumerate().skip(1) {
        let target = class_id as u8;
        let mask = risk.mapv(|v| v == target);
        if !mask.iter().any(|&m| m) {
            continue;
        }

        let (labels, n) = label_components(mask.view());
        let mut stats = vec![RegionStats::new(); n];
        for ((r, c), &label) in labels.indexed_iter() {
            if label != 0 {
                stats[label as usize - 1].add(r, c, confidence[(r, c)]);
            }
        }

        let mut kept = 0usize;
        for region in stats.iter().filter(|s| s.count as f64 > min_area) {
            let average_confidence = region.sum_confidence / region.count as f64;
            alerts.push(Alert {
                risk_type: class.name.clone(),
                risk_level: catalog.risk_level(average_confidence),
                zone: region.zone(),
                area_percentage: round2(region.count as f64 / total as f64 * 100.0),
                average_confidence,
                recommendation: catalog.recommendation(&class.name).to_string(),
            });
            kept += 1;
        }
        debug!(class = %class.name, regions = n, kept, "annotated class");
    }

    Ok(alerts)
}

//! Spectral vegetation and moisture indices
//!
//! Indices are computed directly from a [`SpectralCube`] given the band
//! positions that play each spectral role. Every pixel is independent, so
//! rows are processed in parallel; the result is identical to evaluating the
//! formula pixel by pixel.
//!
//! Division policy: a zero denominator is replaced by 1 before dividing, so
//! those pixels evaluate to `numerator / 1` (0 for the normalized
//! differences, where a zero sum implies a zero difference for
//! non-negative reflectance).

use crate::maybe_rayon::*;
use agrorisk_core::raster::{Raster, SpectralCube};
use agrorisk_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Enumeration of supported spectral indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralIndex {
    /// Normalized Difference Vegetation Index
    Ndvi,
    /// Normalized Difference Red Edge Index
    Ndre,
    /// Moisture Stress Index
    Msi,
    /// Soil Adjusted Vegetation Index
    Savi,
}

impl SpectralIndex {
    /// All indices, in reporting order
    pub const ALL: &'static [SpectralIndex] = &[Self::Ndvi, Self::Ndre, Self::Msi, Self::Savi];

    /// Short lowercase name used in file names and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ndvi => "ndvi",
            Self::Ndre => "ndre",
            Self::Msi => "msi",
            Self::Savi => "savi",
        }
    }

    /// Parse a short name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|idx| idx.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Compute this index using the band roles from `bands`
    pub fn compute(&self, cube: &SpectralCube, bands: &BandMapping) -> Result<Raster<f32>> {
        match self {
            Self::Ndvi => ndvi(cube, bands.red, bands.nir),
            Self::Ndre => ndre(cube, bands.red_edge, bands.nir),
            Self::Msi => msi(cube, bands.nir, bands.swir),
            Self::Savi => savi(cube, bands.red, bands.nir, SaviParams::default()),
        }
    }
}

/// Which band position plays each spectral role.
///
/// Defaults match a six-band multispectral layout
/// (red = 2, NIR = 3, red edge = 3, SWIR = 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandMapping {
    pub red: usize,
    pub nir: usize,
    pub red_edge: usize,
    pub swir: usize,
}

impl Default for BandMapping {
    fn default() -> Self {
        Self {
            red: 2,
            nir: 3,
            red_edge: 3,
            swir: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Zero sums are divided by 1 instead; the result is clipped to [-1, 1].
///
/// # Arguments
/// * `cube` - Input cube
/// * `band_a` - Position of the positive band
/// * `band_b` - Position of the negative band
pub fn normalized_difference(
    cube: &SpectralCube,
    band_a: usize,
    band_b: usize,
) -> Result<Raster<f32>> {
    band_pair_map(cube, band_a, band_b, |a, b| (a - b) / nonzero(a + b))
        .map(|r| clip(r, -1.0, 1.0))
}

// ---------------------------------------------------------------------------
// NDVI
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`, clipped to [-1, 1].
///
/// Values range from -1 to 1:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
///
/// # Arguments
/// * `cube` - Input cube
/// * `red` - Red band position
/// * `nir` - Near-infrared band position
pub fn ndvi(cube: &SpectralCube, red: usize, nir: usize) -> Result<Raster<f32>> {
    normalized_difference(cube, nir, red)
}

// ---------------------------------------------------------------------------
// NDRE
// ---------------------------------------------------------------------------

/// Normalized Difference Red Edge Index
///
/// `NDRE = (NIR - RedEdge) / (NIR + RedEdge)`, clipped to [-1, 1].
///
/// Sensitive to leaf chlorophyll; holds up better than NDVI over dense
/// canopy in mid-to-late growth stages.
pub fn ndre(cube: &SpectralCube, red_edge: usize, nir: usize) -> Result<Raster<f32>> {
    normalized_difference(cube, nir, red_edge)
}

// ---------------------------------------------------------------------------
// MSI
// ---------------------------------------------------------------------------

/// Moisture Stress Index
///
/// `MSI = SWIR / NIR`
///
/// A plain ratio; not clipped. Higher values indicate drier canopy.
/// Pixels with zero NIR are divided by 1.
pub fn msi(cube: &SpectralCube, nir: usize, swir: usize) -> Result<Raster<f32>> {
    band_pair_map(cube, swir, nir, |s, n| s / nonzero(n))
}

// ---------------------------------------------------------------------------
// SAVI
// ---------------------------------------------------------------------------

/// Parameters for SAVI
#[derive(Debug, Clone, Copy)]
pub struct SaviParams {
    /// Soil brightness correction factor (0 = high vegetation, 1 = low vegetation)
    /// Default: 0.5
    pub l_factor: f32,
}

impl Default for SaviParams {
    fn default() -> Self {
        Self { l_factor: 0.5 }
    }
}

/// Soil Adjusted Vegetation Index (Huete, 1988)
///
/// `SAVI = ((NIR - Red) / (NIR + Red + L)) * (1 + L)`, clipped to [-2, 2].
///
/// # Arguments
/// * `cube` - Input cube
/// * `red` - Red band position
/// * `nir` - Near-infrared band position
/// * `params` - SAVI parameters (L factor)
pub fn savi(cube: &SpectralCube, red: usize, nir: usize, params: SaviParams) -> Result<Raster<f32>> {
    let l = params.l_factor;
    if !l.is_finite() {
        return Err(Error::InvalidParameter {
            name: "l_factor",
            value: l.to_string(),
            reason: "must be finite".into(),
        });
    }

    band_pair_map(cube, nir, red, |n, r| ((n - r) / nonzero(n + r + l)) * (1.0 + l))
        .map(|r| clip(r, -2.0, 2.0))
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Min / max / mean of an index map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl IndexSummary {
    /// Summarize the valid (non-NaN) cells of an index map.
    ///
    /// An all-NaN map summarizes to NaN everywhere.
    pub fn of(raster: &Raster<f32>) -> Self {
        let stats = raster.statistics();
        Self {
            min: stats.min.unwrap_or(f32::NAN),
            max: stats.max.unwrap_or(f32::NAN),
            mean: stats.mean.map(|m| m as f32).unwrap_or(f32::NAN),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[inline]
fn nonzero(denominator: f32) -> f32 {
    if denominator == 0.0 {
        1.0
    } else {
        denominator
    }
}

fn clip(mut raster: Raster<f32>, lo: f32, hi: f32) -> Raster<f32> {
    raster.data_mut().mapv_inplace(|v| v.clamp(lo, hi));
    raster
}

/// Evaluate `f(a, b)` for every pixel, with `a` and `b` read from two bands.
fn band_pair_map<F>(cube: &SpectralCube, band_a: usize, band_b: usize, f: F) -> Result<Raster<f32>>
where
    F: Fn(f32, f32) -> f32 + Sync + Send,
{
    let a = cube.band(band_a)?;
    let b = cube.band(band_b)?;
    let (rows, cols, _) = cube.shape();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0f32; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                *out = f(a[(row, col)], b[(row, col)]);
            }
            row_data
        })
        .collect();

    Raster::from_vec(data, rows, cols)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Cube where every band is constant, with the given per-band values
    fn constant_cube(rows: usize, cols: usize, values: &[f32]) -> SpectralCube {
        let mut data = Array3::zeros((rows, cols, values.len()));
        for (band, &v) in values.iter().enumerate() {
            data.index_axis_mut(ndarray::Axis(2), band).fill(v);
        }
        SpectralCube::from_array(data).unwrap()
    }

    /// Two-band cube whose values vary per pixel
    fn gradient_cube(rows: usize, cols: usize) -> SpectralCube {
        let mut data = Array3::zeros((rows, cols, 2));
        for row in 0..rows {
            for col in 0..cols {
                data[(row, col, 0)] = (row * cols + col) as f32;
                data[(row, col, 1)] = ((rows - row) * 3 + col * 7) as f32;
            }
        }
        SpectralCube::from_array(data).unwrap()
    }

    #[test]
    fn test_ndvi_constant() {
        // bands: [0, 0, red, nir, 0, 0]
        let cube = constant_cube(64, 64, &[1.0, 1.0, 100.0, 200.0, 1.0, 1.0]);
        let result = ndvi(&cube, 2, 3).unwrap();

        assert_eq!(result.shape(), (64, 64));
        for &v in result.data().iter() {
            assert!((v - 1.0 / 3.0).abs() < 1e-6, "Expected 0.3333, got {}", v);
        }
    }

    #[test]
    fn test_ndvi_zero_denominator() {
        let cube = constant_cube(4, 4, &[0.0, 0.0]);
        let result = ndvi(&cube, 0, 1).unwrap();
        assert!(result.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_ndvi_range_and_antisymmetry() {
        let cube = gradient_cube(12, 9);
        let forward = ndvi(&cube, 0, 1).unwrap();
        let reverse = ndvi(&cube, 1, 0).unwrap();

        for (&f, &r) in forward.data().iter().zip(reverse.data().iter()) {
            assert!((-1.0..=1.0).contains(&f), "NDVI out of range: {}", f);
            assert!((f + r).abs() < 1e-6, "NDVI not antisymmetric: {} vs {}", f, r);
        }
    }

    #[test]
    fn test_ndvi_clips_negative_reflectance() {
        // Negative samples can push the ratio outside [-1, 1]:
        // (1 - (-3)) / (1 + (-3)) = -2
        let cube = constant_cube(2, 2, &[-3.0, 1.0]);
        let result = ndvi(&cube, 0, 1).unwrap();
        assert_eq!(result.get(0, 0).unwrap(), -1.0);
    }

    #[test]
    fn test_band_out_of_range() {
        let cube = constant_cube(3, 3, &[1.0, 2.0, 3.0]);
        assert!(matches!(ndvi(&cube, 2, 3), Err(Error::BandIndex { index: 3, .. })));
        assert!(matches!(ndre(&cube, 5, 0), Err(Error::BandIndex { index: 5, .. })));
        assert!(matches!(msi(&cube, 0, 9), Err(Error::BandIndex { index: 9, .. })));
        assert!(savi(&cube, 7, 0, SaviParams::default()).is_err());
    }

    #[test]
    fn test_ndre() {
        let cube = constant_cube(5, 5, &[0.3, 0.6]);
        let result = ndre(&cube, 0, 1).unwrap();
        let expected = (0.6 - 0.3) / (0.6 + 0.3);
        let val = result.get(2, 2).unwrap();
        assert!((val - expected).abs() < 1e-6, "Expected {}, got {}", expected, val);
    }

    #[test]
    fn test_msi_unclipped() {
        let cube = constant_cube(3, 3, &[0.5, 4.0]);
        let result = msi(&cube, 0, 1).unwrap();
        assert!((result.get(1, 1).unwrap() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_msi_zero_nir() {
        let cube = constant_cube(3, 3, &[0.0, 0.7]);
        let result = msi(&cube, 0, 1).unwrap();
        assert!((result.get(0, 0).unwrap() - 0.7).abs() < 1e-6);

        let dark = constant_cube(3, 3, &[0.0, 0.0]);
        assert!(msi(&dark, 0, 1).unwrap().data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_savi() {
        let cube = constant_cube(5, 5, &[0.1, 0.5]);
        let result = savi(&cube, 0, 1, SaviParams::default()).unwrap();
        let expected = ((0.5 - 0.1) / (0.5 + 0.1 + 0.5)) * 1.5;
        let val = result.get(2, 2).unwrap();
        assert!((val - expected).abs() < 1e-6, "Expected {}, got {}", expected, val);
    }

    #[test]
    fn test_savi_zero_denominator_and_clip() {
        // NIR + Red + L == 0 -> divide by 1
        let cube = constant_cube(2, 2, &[-0.25, -0.25]);
        let result = savi(&cube, 0, 1, SaviParams::default()).unwrap();
        assert_eq!(result.get(0, 0).unwrap(), 0.0);

        // Large ratio is clipped to 2
        let cube = constant_cube(2, 2, &[-1.0, 1.0]);
        let result = savi(&cube, 0, 1, SaviParams { l_factor: 0.1 }).unwrap();
        assert_eq!(result.get(1, 1).unwrap(), 2.0);
    }

    #[test]
    fn test_savi_rejects_non_finite_l() {
        let cube = constant_cube(2, 2, &[0.1, 0.5]);
        let result = savi(&cube, 0, 1, SaviParams { l_factor: f32::NAN });
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_index_dispatch_matches_functions() {
        let cube = constant_cube(4, 4, &[10.0, 20.0, 30.0, 60.0, 45.0, 90.0]);
        let bands = BandMapping::default();

        assert_eq!(
            SpectralIndex::Ndvi.compute(&cube, &bands).unwrap(),
            ndvi(&cube, 2, 3).unwrap()
        );
        assert_eq!(
            SpectralIndex::Msi.compute(&cube, &bands).unwrap(),
            msi(&cube, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_index_names() {
        assert_eq!(SpectralIndex::from_name("NDVI"), Some(SpectralIndex::Ndvi));
        assert_eq!(SpectralIndex::from_name(" savi "), Some(SpectralIndex::Savi));
        assert_eq!(SpectralIndex::from_name("evi"), None);
    }

    #[test]
    fn test_index_summary() {
        let raster = Raster::from_vec(vec![-0.5f32, 0.0, 0.5, 1.0], 2, 2).unwrap();
        let summary = IndexSummary::of(&raster);
        assert_eq!(summary.min, -0.5);
        assert_eq!(summary.max, 1.0);
        assert!((summary.mean - 0.25).abs() < 1e-6);
    }
}

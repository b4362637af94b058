//! Raster-to-RGB rendering.
//!
//! Every renderer returns an image of shape (rows, cols, 3) with `u8`
//! channels, ready for `agrorisk_core::io::write_rgb`.

use crate::scheme::{evaluate, risk_color, ColorScheme, HealthClass, Rgb};
use agrorisk_core::{Raster, RasterElement};
use ndarray::{Array3, ArrayView2};

/// Parameters for continuous colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Minimum value for normalization. Values below this are clamped.
    pub min: f64,
    /// Maximum value for normalization. Values above this are clamped.
    pub max: f64,
    /// Color for NaN pixels. Default: black.
    pub nodata_color: Rgb,
}

impl ColormapParams {
    /// Create params with explicit min/max range.
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            nodata_color: Rgb::new(0, 0, 0),
        }
    }
}

/// Auto-detect min/max from a raster, returning `ColormapParams` ready to use.
///
/// NaN cells are ignored. A constant or all-NaN raster gets a unit range.
pub fn auto_params<T: RasterElement>(raster: &Raster<T>, scheme: ColorScheme) -> ColormapParams {
    let stats = raster.statistics();
    let min = stats.min.and_then(|v| v.to_f64()).filter(|v| v.is_finite());
    let max = stats.max.and_then(|v| v.to_f64()).filter(|v| v.is_finite());

    match (min, max) {
        (Some(min), Some(max)) if (max - min).abs() >= f64::EPSILON => {
            ColormapParams::with_range(scheme, min, max)
        }
        (Some(min), Some(_)) => ColormapParams::with_range(scheme, min, min + 1.0),
        _ => ColormapParams::with_range(scheme, 0.0, 1.0),
    }
}

fn paint<T: Copy>(data: ArrayView2<'_, T>, color: impl Fn(T) -> Rgb) -> Array3<u8> {
    let (rows, cols) = data.dim();
    let mut image = Array3::<u8>::zeros((rows, cols, 3));
    for ((r, c), &v) in data.indexed_iter() {
        let Rgb { r: red, g, b } = color(v);
        image[(r, c, 0)] = red;
        image[(r, c, 1)] = g;
        image[(r, c, 2)] = b;
    }
    image
}

/// Discretize an NDVI map into the four health colors.
///
/// Every pixel receives exactly one of [`HealthClass`]'s colors; NaN cells
/// are painted as bare soil.
pub fn health_map(ndvi: &Raster<f32>) -> Array3<u8> {
    paint(ndvi.view(), |v| HealthClass::from_ndvi(v).color())
}

/// Color a risk map by class id
pub fn risk_map_to_rgb(risk: &Raster<u8>) -> Array3<u8> {
    paint(risk.view(), risk_color)
}

/// Render a continuous raster through a color scheme.
///
/// NaN pixels are rendered with `params.nodata_color`.
pub fn raster_to_rgb<T: RasterElement>(raster: &Raster<T>, params: &ColormapParams) -> Array3<u8> {
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON {
        1.0 / range
    } else {
        1.0
    };

    paint(raster.view(), |val| match val.to_f64() {
        Some(v) if v.is_finite() => evaluate(params.scheme, (v - params.min) * inv_range),
        _ => params.nodata_color,
    })
}

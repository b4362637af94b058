//! # AgroRisk Colormap
//!
//! Raster-to-RGB rendering for AgroRisk products.
//!
//! - [`health_map`]: NDVI discretized into four vegetation health colors
//! - [`risk_map_to_rgb`]: one color per risk class id
//! - [`raster_to_rgb`]: continuous index or confidence maps through a
//!   multi-stop [`ColorScheme`]
//!
//! ## Usage
//!
//! ```ignore
//! use agrorisk_colormap::health_map;
//!
//! let ndvi = agrorisk_algorithms::imagery::ndvi(&cube, 2, 3)?;
//! let image = health_map(&ndvi);
//! agrorisk_core::io::write_rgb(&image, "health.tif")?;
//! ```

mod render;
mod scheme;

pub use render::{auto_params, health_map, raster_to_rgb, risk_map_to_rgb, ColormapParams};
pub use scheme::{evaluate, risk_color, ColorScheme, ColorStop, HealthClass, Rgb};

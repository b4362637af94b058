//! I/O operations for reading spectral cubes and writing analysis products

mod native;

pub use native::{read_cube, read_cube_from_buffer, write_raster, write_rgb};

// Buffer-based I/O (no filesystem dependency)
pub use native::{write_raster_to_buffer, write_rgb_to_buffer};

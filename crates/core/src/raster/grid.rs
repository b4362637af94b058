//! Single-band raster grid

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::{s, Array2, ArrayView2};

/// A 2D raster grid with one value per pixel.
///
/// `Raster<T>` holds the per-pixel products of an analysis: index maps
/// (`Raster<f32>`), risk maps (`Raster<u8>` class ids) and confidence maps
/// (`Raster<f32>`). Its shape always matches the [`SpectralCube`] it was
/// derived from.
///
/// # Example
///
/// ```ignore
/// use agrorisk_core::Raster;
///
/// let mut risk: Raster<u8> = Raster::new(64, 64);
/// risk.set(10, 20, 2)?;
/// assert_eq!(risk.get(10, 20)?, 2);
/// ```
///
/// [`SpectralCube`]: crate::raster::SpectralCube
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                rows,
                cols,
                bands: 1,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)?;
        Ok(Self { data: array })
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Fill the `size x size` square whose top-left corner is (row, col).
    ///
    /// The square is clipped to the raster extent, so a footprint hanging
    /// over the high edge only touches the cells that exist.
    pub fn fill_square(&mut self, row: usize, col: usize, size: usize, value: T) {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return;
        }
        let row_end = (row + size).min(rows);
        let col_end = (col + size).min(cols);
        self.data
            .slice_mut(s![row..row_end, col..col_end])
            .fill(value);
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    /// Rows as nested vectors, the layout used when a map is serialized
    pub fn to_nested(&self) -> Vec<Vec<T>> {
        self.data.rows().into_iter().map(|r| r.to_vec()).collect()
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells).
    ///
    /// NaN cells are skipped.
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if !value.is_valid() {
                continue;
            }

            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }

            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            invalid_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

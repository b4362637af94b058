//! Multi-band spectral cube

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::{s, Array2, Array3, ArrayD, ArrayView2, ArrayView3, Axis, Ix3};

/// An immutable multi-band raster with axes (row, col, band).
///
/// This is the input to every analysis stage. Band order is whatever the
/// source delivered; nothing in the workspace renumbers bands, callers say
/// which position plays red, NIR, red-edge or SWIR.
///
/// All samples are held as `f32`. Construction fails for anything that is
/// not a non-empty 3-axis array, so downstream code can rely on
/// `rows, cols, bands >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralCube {
    data: Array3<f32>,
}

impl SpectralCube {
    /// Create a cube from a typed 3D array, converting samples to `f32`.
    pub fn from_array<T: RasterElement>(data: Array3<T>) -> Result<Self> {
        let data = data.mapv(|v| v.to_f32_lossy());
        Self::checked(data)
    }

    /// Create a cube from a dynamically shaped array.
    ///
    /// Fails with [`Error::Shape`] unless the array has exactly 3 axes.
    pub fn from_dyn(data: ArrayD<f32>) -> Result<Self> {
        let ndim = data.ndim();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| Error::Shape {
                expected: 3,
                actual: ndim,
            })?;
        Self::checked(data)
    }

    /// Create a cube from pixel-interleaved samples and an arbitrary shape.
    ///
    /// `data` is row-major with bands varying fastest, the layout of a
    /// chunky TIFF strip.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        if shape.len() != 3 {
            return Err(Error::Shape {
                expected: 3,
                actual: shape.len(),
            });
        }
        let (rows, cols, bands) = (shape[0], shape[1], shape[2]);
        if data.len() != rows * cols * bands {
            return Err(Error::InvalidDimensions { rows, cols, bands });
        }
        let array = Array3::from_shape_vec((rows, cols, bands), data)?;
        Self::checked(array)
    }

    /// Stack single-band grids into a cube. All bands must share one shape.
    pub fn from_bands(bands: &[Array2<f32>]) -> Result<Self> {
        let first = bands.first().ok_or(Error::InvalidDimensions {
            rows: 0,
            cols: 0,
            bands: 0,
        })?;
        let (rows, cols) = first.dim();

        for band in bands.iter().skip(1) {
            if band.dim() != (rows, cols) {
                let (ar, ac) = band.dim();
                return Err(Error::SizeMismatch {
                    er: rows,
                    ec: cols,
                    ar,
                    ac,
                });
            }
        }

        let views: Vec<_> = bands.iter().map(|b| b.view()).collect();
        let data = ndarray::stack(Axis(2), &views)?;
        Self::checked(data)
    }

    fn checked(data: Array3<f32>) -> Result<Self> {
        let (rows, cols, bands) = data.dim();
        if rows == 0 || cols == 0 || bands == 0 {
            return Err(Error::InvalidDimensions { rows, cols, bands });
        }
        Ok(Self { data })
    }

    // Dimensions

    /// Number of rows (height)
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns (width)
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Number of spectral bands
    pub fn bands(&self) -> usize {
        self.data.dim().2
    }

    /// Dimensions as (rows, cols, bands)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Number of pixels (rows * cols)
    pub fn pixel_count(&self) -> usize {
        self.rows() * self.cols()
    }

    // Data access

    /// View of the full cube
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// View of one band, or [`Error::BandIndex`] if it does not exist
    pub fn band(&self, index: usize) -> Result<ArrayView2<'_, f32>> {
        self.check_band(index)?;
        Ok(self.data.index_axis(Axis(2), index))
    }

    /// Fail with [`Error::BandIndex`] unless `index` names a band
    pub fn check_band(&self, index: usize) -> Result<()> {
        if index >= self.bands() {
            return Err(Error::BandIndex {
                index,
                bands: self.bands(),
            });
        }
        Ok(())
    }

    /// Extract a `size x size x bands` patch with top-left corner (row, col).
    ///
    /// Where the square runs past the high edge of the cube, the remainder is
    /// zero-padded so the result always has the requested spatial size.
    pub fn patch(&self, row: usize, col: usize, size: usize) -> Array3<f32> {
        let (rows, cols, bands) = self.shape();
        let mut patch = Array3::zeros((size, size, bands));
        if row >= rows || col >= cols {
            return patch;
        }

        let row_end = (row + size).min(rows);
        let col_end = (col + size).min(cols);
        patch
            .slice_mut(s![..row_end - row, ..col_end - col, ..])
            .assign(&self.data.slice(s![row..row_end, col..col_end, ..]));
        patch
    }

    /// Consume the cube and return the underlying array
    pub fn into_array(self) -> Array3<f32> {
        self.data
    }
}

//! Sliding window placement over a raster

/// A square window with its top-left corner at (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub row: usize,
    pub col: usize,
    pub size: usize,
}

/// Edge length of the patches used for a raster: `max_size` capped by the
/// shorter raster side.
pub fn patch_size_for(rows: usize, cols: usize, max_size: usize) -> usize {
    max_size.min(rows.min(cols))
}

/// Iterator over square windows, row-major, top to bottom and left to right.
///
/// Only windows that fit entirely inside the raster are produced. When
/// `(rows - size)` is not a multiple of the stride the last rows and columns
/// are not covered by any window.
#[derive(Debug, Clone)]
pub struct WindowIterator {
    rows: usize,
    cols: usize,
    size: usize,
    stride: usize,
    current_row: usize,
    current_col: usize,
}

impl WindowIterator {
    /// Windows of `size` with the given stride (a stride of 0 is taken as 1)
    pub fn new(rows: usize, cols: usize, size: usize, stride: usize) -> Self {
        Self {
            rows,
            cols,
            size,
            stride: stride.max(1),
            current_row: 0,
            current_col: 0,
        }
    }

    /// Windows of `size` overlapping their neighbours by half
    pub fn half_overlap(rows: usize, cols: usize, size: usize) -> Self {
        Self::new(rows, cols, size, size / 2)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of window positions along one axis of length `len`
    fn positions(&self, len: usize) -> usize {
        if self.size == 0 || self.size > len {
            0
        } else {
            (len - self.size) / self.stride + 1
        }
    }

    /// Total number of windows, independent of iteration progress
    pub fn window_count(&self) -> usize {
        self.positions(self.rows) * self.positions(self.cols)
    }
}

impl Iterator for WindowIterator {
    type Item = Window;

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 || self.size > self.cols || self.current_row + self.size > self.rows {
            return None;
        }

        let window = Window {
            row: self.current_row,
            col: self.current_col,
            size: self.size,
        };

        // Move to next window
        self.current_col += self.stride;
        if self.current_col + self.size > self.cols {
            self.current_col = 0;
            self.current_row += self.stride;
        }

        Some(window)
    }
}

//! Raster grid container.

use crate::BoundingBox;

/// A single-band raster grid in row-major order.
///
/// Cell values are `f32`; `nodata` is the sentinel the source file uses for
/// "no measurement". The grid is read-only once loaded — classification and
/// rendering never mutate it.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    data: Vec<f32>,
    width: usize,
    height: usize,
    /// No-data sentinel from the source file, if any.
    pub nodata: Option<f32>,
    /// Geographic bounds used only to position the rendered overlay.
    pub bbox: BoundingBox,
}

impl RasterGrid {
    /// Create a grid, checking that the buffer matches the declared shape.
    pub fn new(
        data: Vec<f32>,
        width: usize,
        height: usize,
        nodata: Option<f32>,
        bbox: BoundingBox,
    ) -> Result<Self, GridShapeError> {
        if data.len() != width * height {
            return Err(GridShapeError {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            nodata,
            bbox,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major cell values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at (x, y), or None when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Whether a cell value is the no-data sentinel or otherwise not a
    /// real measurement.
    pub fn is_missing(&self, value: f32) -> bool {
        !value.is_finite() || self.nodata.map(|nd| value == nd).unwrap_or(false)
    }

    /// Fraction of cells carrying a real measurement.
    pub fn valid_fraction(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let valid = self.data.iter().filter(|&&v| !self.is_missing(v)).count();
        valid as f64 / self.data.len() as f64
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Buffer length does not match width * height.
#[derive(Debug, thiserror::Error)]
#[error("Grid shape mismatch: expected {expected} cells, got {actual}")]
pub struct GridShapeError {
    pub expected: usize,
    pub actual: usize,
}

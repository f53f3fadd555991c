//! Per-pixel feature vectors

use crate::error::{Error, Result};
use crate::raster::Raster;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// H×W grid of F-dimensional feature vectors.
///
/// Stored as a `(rows * cols) × F` sample matrix in row-major pixel order, so
/// the sample list handed to clustering is a view rather than a copy. Pixel
/// `(row, col)` lives at sample index `row * cols + col`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    rows: usize,
    cols: usize,
    samples: Array2<f64>,
}

impl FeatureMap {
    /// Wrap a sample matrix with its spatial layout
    pub fn from_samples(rows: usize, cols: usize, samples: Array2<f64>) -> Result<Self> {
        if samples.nrows() != rows * cols {
            return Err(Error::SizeMismatch {
                er: rows * cols,
                ec: samples.ncols(),
                ar: samples.nrows(),
                ac: samples.ncols(),
            });
        }
        Ok(Self {
            rows,
            cols,
            samples,
        })
    }

    /// Stack single-channel rasters of identical shape into a feature map
    pub fn from_channels(channels: &[Raster<f64>]) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(Error::Other("feature map needs at least one channel".into()));
        };
        for channel in &channels[1..] {
            first.check_same_shape(channel)?;
        }

        let (rows, cols) = first.shape();
        let mut samples = Array2::zeros((rows * cols, channels.len()));
        for (c, channel) in channels.iter().enumerate() {
            for (dst, &src) in samples.column_mut(c).iter_mut().zip(channel.iter()) {
                *dst = src;
            }
        }

        Self::from_samples(rows, cols, samples)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    /// Whether the map holds no pixels
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature dimension F
    pub fn channels(&self) -> usize {
        self.samples.ncols()
    }

    /// All feature vectors, one row per pixel
    pub fn samples(&self) -> ArrayView2<'_, f64> {
        self.samples.view()
    }

    /// Feature vector of the pixel at (row, col). Panics when out of bounds.
    pub fn pixel(&self, row: usize, col: usize) -> ArrayView1<'_, f64> {
        self.samples.row(row * self.cols + col)
    }

    /// One channel as a column view in pixel order
    pub fn channel(&self, channel: usize) -> Result<ArrayView1<'_, f64>> {
        if channel >= self.channels() {
            return Err(Error::IndexOutOfBounds {
                row: 0,
                col: channel,
                rows: self.len(),
                cols: self.channels(),
            });
        }
        Ok(self.samples.column(channel))
    }

    /// One channel copied out as a raster
    pub fn channel_raster(&self, channel: usize) -> Result<Raster<f64>> {
        let values = self.channel(channel)?.to_vec();
        Raster::from_vec(values, self.rows, self.cols)
    }
}

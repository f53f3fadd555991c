//! Decoded color images

use crate::error::{Error, Result, Stage};
use crate::mask::Mask;
use ndarray::{Array3, ArrayView3};

/// Order of the three color samples in an interleaved buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// An H×W×3 grid of RGB samples in [0, 1].
///
/// Stored row-major as `(row, col, channel)`. The pipeline only borrows a
/// `PixelGrid`; decoding files into one is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    data: Array3<f32>,
}

impl PixelGrid {
    /// Build from an interleaved 8-bit buffer of length `rows * cols * 3`.
    pub fn from_interleaved_u8(
        rows: usize,
        cols: usize,
        data: &[u8],
        order: ChannelOrder,
    ) -> Result<Self> {
        check_buffer(rows, cols, data.len())?;

        let mut samples = Vec::with_capacity(data.len());
        for px in data.chunks_exact(3) {
            let (r, g, b) = match order {
                ChannelOrder::Rgb => (px[0], px[1], px[2]),
                ChannelOrder::Bgr => (px[2], px[1], px[0]),
            };
            samples.extend([r, g, b].map(|v| v as f32 / 255.0));
        }

        Self::from_shape_vec(rows, cols, samples)
    }

    /// Build from interleaved 8-bit RGB
    pub fn from_rgb8(rows: usize, cols: usize, data: &[u8]) -> Result<Self> {
        Self::from_interleaved_u8(rows, cols, data, ChannelOrder::Rgb)
    }

    /// Build from interleaved 8-bit BGR
    pub fn from_bgr8(rows: usize, cols: usize, data: &[u8]) -> Result<Self> {
        Self::from_interleaved_u8(rows, cols, data, ChannelOrder::Bgr)
    }

    /// Build from interleaved float RGB samples, each in [0, 1]
    pub fn from_rgb_f32(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        check_buffer(rows, cols, data.len())?;

        if let Some(bad) = data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(Error::Input {
                stage: Stage::FeatureExtraction,
                reason: format!("float sample {} outside [0, 1]", bad),
            });
        }

        Self::from_shape_vec(rows, cols, data)
    }

    /// Build by evaluating `f(row, col)` for every pixel
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Result<Self>
    where
        F: Fn(usize, usize) -> [u8; 3],
    {
        let mut data = Vec::with_capacity(rows * cols * 3);
        for row in 0..rows {
            for col in 0..cols {
                data.extend_from_slice(&f(row, col));
            }
        }
        Self::from_rgb8(rows, cols, &data)
    }

    /// Uniform image of one color
    pub fn filled(rows: usize, cols: usize, rgb: [u8; 3]) -> Result<Self> {
        Self::from_fn(rows, cols, |_, _| rgb)
    }

    fn from_shape_vec(rows: usize, cols: usize, samples: Vec<f32>) -> Result<Self> {
        let data = Array3::from_shape_vec((rows, cols, 3), samples)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self { data })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Always false: constructors reject empty grids
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// RGB samples at (row, col). Panics when out of bounds.
    #[inline]
    pub fn rgb(&self, row: usize, col: usize) -> [f32; 3] {
        [
            self.data[(row, col, 0)],
            self.data[(row, col, 1)],
            self.data[(row, col, 2)],
        ]
    }

    /// RGB samples at (row, col), bounds-checked
    pub fn get(&self, row: usize, col: usize) -> Result<[f32; 3]> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        Ok(self.rgb(row, col))
    }

    /// View of the (row, col, channel) samples
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Keep the color of foreground pixels and black out the rest
    pub fn masked(&self, mask: &Mask) -> Result<PixelGrid> {
        let (rows, cols) = self.shape();
        let (mr, mc) = mask.shape();
        if rows != mr || cols != mc {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: mr,
                ac: mc,
            });
        }

        let mut data = self.data.clone();
        for ((row, col, _), v) in data.indexed_iter_mut() {
            if !mask.is_foreground(row, col) {
                *v = 0.0;
            }
        }
        Ok(Self { data })
    }

    /// Interleaved 8-bit RGB, rounding each sample
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }
}

fn check_buffer(rows: usize, cols: usize, len: usize) -> Result<()> {
    if rows == 0 || cols == 0 || len != rows * cols * 3 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }
    Ok(())
}

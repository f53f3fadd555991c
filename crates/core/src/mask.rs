//! Binary masks
//!
//! Foreground cells hold [`Mask::FOREGROUND`] (255) and background cells
//! hold [`Mask::BACKGROUND`] (0), the convention expected by image writers.

use crate::error::{Error, Result};
use crate::raster::Raster;
use ndarray::{Array2, Zip};

/// H×W binary grid backed by a `Raster<u8>`
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    raster: Raster<u8>,
}

impl Mask {
    pub const FOREGROUND: u8 = 255;
    pub const BACKGROUND: u8 = 0;

    /// All-background mask
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            raster: Raster::new(rows, cols),
        }
    }

    /// Build from a predicate over (row, col)
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> bool,
    {
        let data = Array2::from_shape_fn((rows, cols), |(row, col)| {
            if f(row, col) {
                Self::FOREGROUND
            } else {
                Self::BACKGROUND
            }
        });
        Self {
            raster: Raster::from_array(data),
        }
    }

    /// Build from row-major cells, treating any non-zero cell as foreground
    pub fn from_vec(mut data: Vec<u8>, rows: usize, cols: usize) -> Result<Self> {
        for v in &mut data {
            if *v != 0 {
                *v = Self::FOREGROUND;
            }
        }
        Ok(Self {
            raster: Raster::from_vec(data, rows, cols)?,
        })
    }

    /// Wrap a raster, treating any non-zero cell as foreground
    pub fn from_raster(raster: &Raster<u8>) -> Self {
        let mut out = raster.clone();
        out.data_mut().mapv_inplace(|v| {
            if v != 0 {
                Self::FOREGROUND
            } else {
                Self::BACKGROUND
            }
        });
        Self { raster: out }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.raster.rows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.raster.cols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.raster.len()
    }

    /// Whether the mask has zero cells
    pub fn is_empty(&self) -> bool {
        self.raster.is_empty()
    }

    /// Whether (row, col) is foreground. Out-of-bounds cells are background.
    #[inline]
    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.raster
            .data()
            .get((row, col))
            .is_some_and(|&v| v == Self::FOREGROUND)
    }

    /// Set (row, col) to foreground or background
    pub fn set(&mut self, row: usize, col: usize, foreground: bool) -> Result<()> {
        let value = if foreground {
            Self::FOREGROUND
        } else {
            Self::BACKGROUND
        };
        self.raster.set(row, col, value)
    }

    /// Number of foreground cells
    pub fn count(&self) -> usize {
        self.raster
            .iter()
            .filter(|&&v| v == Self::FOREGROUND)
            .count()
    }

    /// Whether no cell is foreground
    pub fn is_blank(&self) -> bool {
        self.raster.iter().all(|&v| v != Self::FOREGROUND)
    }

    /// Foreground fraction of all cells (0 for an empty mask)
    pub fn coverage(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.count() as f64 / self.len() as f64
        }
    }

    /// Cells foreground in `self` and background in `other`
    pub fn and_not(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a && !b)
    }

    /// Cells foreground in both masks
    pub fn intersection(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a && b)
    }

    /// Cells foreground in either mask
    pub fn union(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a || b)
    }

    /// Intersection-over-union; two blank masks count as identical
    pub fn iou(&self, other: &Mask) -> Result<f64> {
        let inter = self.intersection(other)?.count();
        let union = self.union(other)?.count();
        if union == 0 {
            return Ok(1.0);
        }
        Ok(inter as f64 / union as f64)
    }

    /// Whether every foreground cell of `self` is foreground in `other`
    pub fn is_subset_of(&self, other: &Mask) -> Result<bool> {
        Ok(self.and_not(other)?.is_blank())
    }

    fn combine<F>(&self, other: &Mask, op: F) -> Result<Mask>
    where
        F: Fn(bool, bool) -> bool,
    {
        if self.shape() != other.shape() {
            let (er, ec) = self.shape();
            let (ar, ac) = other.shape();
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }

        let mut out = self.raster.clone();
        Zip::from(out.data_mut())
            .and(other.raster.data())
            .for_each(|a, &b| {
                *a = if op(*a == Self::FOREGROUND, b == Self::FOREGROUND) {
                    Self::FOREGROUND
                } else {
                    Self::BACKGROUND
                };
            });
        Ok(Mask { raster: out })
    }

    /// Borrow the underlying 255/0 raster
    pub fn as_raster(&self) -> &Raster<u8> {
        &self.raster
    }

    /// Consume the mask and return the underlying 255/0 raster
    pub fn into_raster(self) -> Raster<u8> {
        self.raster
    }

    /// Row-major 255/0 bytes, ready for an 8-bit grayscale encoder
    pub fn to_bytes(&self) -> Vec<u8> {
        self.raster.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: usize, lo: usize, hi: usize) -> Mask {
        Mask::from_fn(size, size, |r, c| (lo..hi).contains(&r) && (lo..hi).contains(&c))
    }

    #[test]
    fn test_new_mask_is_blank() {
        let mask = Mask::new(4, 6);
        assert_eq!(mask.shape(), (4, 6));
        assert!(mask.is_blank());
        assert_eq!(mask.coverage(), 0.0);
    }

    #[test]
    fn test_from_raster_normalizes_values() {
        let raster = Raster::from_vec(vec![0, 1, 7, 255], 2, 2).unwrap();
        let mask = Mask::from_raster(&raster);
        assert_eq!(mask.to_bytes(), vec![0, 255, 255, 255]);
    }

    #[test]
    fn test_and_not_removes_overlap() {
        let a = square(6, 0, 4);
        let b = square(6, 2, 6);
        let diff = a.and_not(&b).unwrap();
        assert_eq!(diff.count(), 16 - 4);
        assert!(!diff.is_foreground(3, 3));
        assert!(diff.is_foreground(0, 0));
        assert!(diff.is_subset_of(&a).unwrap());
    }

    #[test]
    fn test_and_not_is_idempotent() {
        let a = square(8, 1, 7);
        let b = square(8, 3, 5);
        let once = a.and_not(&b).unwrap();
        let twice = once.and_not(&b).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_iou() {
        let a = square(4, 0, 2);
        assert!((a.iou(&a).unwrap() - 1.0).abs() < 1e-12);
        let b = square(4, 1, 3);
        // 1 shared cell, 7 cells in the union
        assert!((a.iou(&b).unwrap() - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(Mask::new(3, 3).iou(&Mask::new(3, 3)).unwrap(), 1.0);
    }

    #[test]
    fn test_size_mismatch() {
        assert!(Mask::new(2, 2).and_not(&Mask::new(2, 3)).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_background() {
        let mask = Mask::from_fn(2, 2, |_, _| true);
        assert!(mask.is_foreground(1, 1));
        assert!(!mask.is_foreground(2, 0));
    }
}

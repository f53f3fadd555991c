//! Second-derivative edge response
//!
//! Laplacian filters used as the texture-energy operator. Borders replicate
//! the nearest edge cell, so every output cell is defined.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use crate::maybe_rayon::*;
use lakeseg_core::raster::Raster;
use lakeseg_core::{Error, Result};

/// Laplacian kernel variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaplacianKernel {
    /// 4-neighbor kernel:
    /// ```text
    ///  0  1  0
    ///  1 -4  1
    ///  0  1  0
    /// ```
    #[default]
    Aperture1,
    /// Aperture-3 kernel (second-order Sobel sum):
    /// ```text
    ///  2  0  2
    ///  0 -8  0
    ///  2  0  2
    /// ```
    Aperture3,
}

/// Laplacian filter (second-derivative edge detection).
///
/// High absolute values indicate edges or fine texture; flat regions give 0.
///
/// # Arguments
/// * `raster` - Input raster
/// * `kernel` - Kernel variant
pub fn laplacian(raster: &Raster<f64>, kernel: LaplacianKernel) -> Result<Raster<f64>> {
    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0; cols];

            let up = row.saturating_sub(1);
            let down = (row + 1).min(rows - 1);

            for (col, out) in row_data.iter_mut().enumerate() {
                let left = col.saturating_sub(1);
                let right = (col + 1).min(cols - 1);

                let z = |r: usize, c: usize| -> f64 { unsafe { raster.get_unchecked(r, c) } };
                let center = z(row, col);

                *out = match kernel {
                    LaplacianKernel::Aperture1 => {
                        z(up, col) + z(down, col) + z(row, left) + z(row, right) - 4.0 * center
                    }
                    LaplacianKernel::Aperture3 => {
                        2.0 * (z(up, left) + z(up, right) + z(down, left) + z(down, right))
                            - 8.0 * center
                    }
                };
            }

            row_data
        })
        .collect();

    let mut output = raster.with_same_shape::<f64>();
    *output.data_mut() = Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_raster(rows: usize, cols: usize) -> Raster<f64> {
        let mut r = Raster::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                r.set(row, col, col as f64).unwrap(); // Horizontal gradient
            }
        }
        r
    }

    #[test]
    fn test_laplacian_flat() {
        let r = Raster::filled(10, 10, 5.0);
        for kernel in [LaplacianKernel::Aperture1, LaplacianKernel::Aperture3] {
            let result = laplacian(&r, kernel).unwrap();
            for &v in result.iter() {
                assert!(v.abs() < 1e-10, "Flat surface should have zero Laplacian, got {}", v);
            }
        }
    }

    #[test]
    fn test_laplacian_linear_interior_is_zero() {
        let r = gradient_raster(10, 10);
        let result = laplacian(&r, LaplacianKernel::Aperture1).unwrap();
        let val = result.get(5, 5).unwrap();
        assert!(val.abs() < 1e-10, "Linear surface should have zero Laplacian, got {}", val);
    }

    #[test]
    fn test_laplacian_spike() {
        let mut r = Raster::filled(5, 5, 0.0);
        r.set(2, 2, 1.0).unwrap();

        let result = laplacian(&r, LaplacianKernel::Aperture1).unwrap();
        assert!((result.get(2, 2).unwrap() + 4.0).abs() < 1e-10);
        assert!((result.get(1, 2).unwrap() - 1.0).abs() < 1e-10);
        // Diagonal neighbors are outside the 4-neighbor kernel
        assert!(result.get(1, 1).unwrap().abs() < 1e-10);

        let result = laplacian(&r, LaplacianKernel::Aperture3).unwrap();
        assert!((result.get(2, 2).unwrap() + 8.0).abs() < 1e-10);
        assert!((result.get(1, 1).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_laplacian_defined_at_borders() {
        let r = gradient_raster(4, 4);
        let result = laplacian(&r, LaplacianKernel::Aperture1).unwrap();
        assert!(result.iter().all(|v| v.is_finite()));
        // Left border replicates col 0: 0 + 0 + 0 + 1 - 0 = 1
        assert!((result.get(2, 0).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_laplacian_single_pixel() {
        let r = Raster::filled(1, 1, 3.0);
        let result = laplacian(&r, LaplacianKernel::Aperture3).unwrap();
        assert_eq!(result.get(0, 0).unwrap(), 0.0);
    }
}

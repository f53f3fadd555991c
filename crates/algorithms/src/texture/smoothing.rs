//! Gaussian smoothing
//!
//! Separable Gaussian blur used to denoise the grayscale input before the
//! Laplacian and to spread the absolute edge response afterwards.

use ndarray::Array2;
use crate::maybe_rayon::*;
use lakeseg_core::raster::Raster;
use lakeseg_core::{Error, Result};

/// Blur a raster with a Gaussian of standard deviation `sigma` (in cells).
///
/// Kernel truncated at 3σ. Near the borders the kernel is renormalized over
/// the cells that exist, so a flat raster stays flat. `sigma <= 0` returns an
/// unchanged copy.
pub fn gaussian_blur(raster: &Raster<f64>, sigma: f64) -> Result<Raster<f64>> {
    if !sigma.is_finite() {
        return Err(Error::InvalidParameter {
            name: "sigma",
            value: sigma.to_string(),
            reason: "sigma must be finite".to_string(),
        });
    }
    if sigma <= 0.0 {
        return Ok(raster.clone());
    }

    let (rows, cols) = raster.shape();
    let kernel = make_gaussian_kernel(sigma);
    let half = kernel.len() / 2;
    let data = raster.data();

    // Row pass
    let row_smoothed: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut out = vec![0.0; cols];
            for (col, dst) in out.iter_mut().enumerate() {
                let mut sum = 0.0;
                let mut wsum = 0.0;
                for (ki, &kw) in kernel.iter().enumerate() {
                    let c = col as isize + ki as isize - half as isize;
                    if c >= 0 && c < cols as isize {
                        sum += kw * data[[row, c as usize]];
                        wsum += kw;
                    }
                }
                *dst = sum / wsum;
            }
            out
        })
        .collect();

    let row_arr = Array2::from_shape_vec((rows, cols), row_smoothed)
        .map_err(|e| Error::Other(e.to_string()))?;

    // Column pass
    let col_smoothed: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut out = vec![0.0; cols];
            for (col, dst) in out.iter_mut().enumerate() {
                let mut sum = 0.0;
                let mut wsum = 0.0;
                for (ki, &kw) in kernel.iter().enumerate() {
                    let r = row as isize + ki as isize - half as isize;
                    if r >= 0 && r < rows as isize {
                        sum += kw * row_arr[[r as usize, col]];
                        wsum += kw;
                    }
                }
                *dst = sum / wsum;
            }
            out
        })
        .collect();

    Raster::from_vec(col_smoothed, rows, cols)
}

/// Create a 1D Gaussian kernel truncated at 3σ.
fn make_gaussian_kernel(sigma: f64) -> Vec<f64> {
    let half = (3.0 * sigma).ceil() as usize;
    let size = 2 * half + 1;
    let mut kernel = Vec::with_capacity(size);
    let denom = 2.0 * sigma * sigma;

    for i in 0..size {
        let x = i as f64 - half as f64;
        kernel.push((-x * x / denom).exp());
    }

    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

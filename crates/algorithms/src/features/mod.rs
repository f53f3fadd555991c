//! Per-pixel feature map construction
//!
//! Turns a [`PixelGrid`] into an 11-channel [`FeatureMap`]. Every channel is
//! mapped into [0, 1] so no raw unit dominates the Euclidean distance used
//! by clustering:
//!
//! | index | channel | normalization |
//! |---|---|---|
//! | 0-2 | Lab L, a, b | `L/100`, `(a+128)/255`, `(b+128)/255` |
//! | 3-5 | HSV hue, saturation, value | `hue/360`, as is, as is |
//! | 6-7 | excess green, excess blue | `(x+2)/4` |
//! | 8 | texture energy | min-max over the image |
//! | 9 | vertical position | `row/(rows-1)` |
//! | 10 | blue chromaticity | `B/(R+G+B)` |

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color;
use crate::maybe_rayon::*;
use crate::texture::{gaussian_blur, laplacian, LaplacianKernel};
use lakeseg_core::raster::Raster;
use lakeseg_core::{Algorithm, Error, FeatureMap, PixelGrid, Result};

/// Added to the texture range so a flat image normalizes to zeros
pub const TEXTURE_EPSILON: f64 = 1e-6;

/// Channels of the feature map, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureChannel {
    Lightness,
    ChromaA,
    ChromaB,
    Hue,
    Saturation,
    Value,
    ExcessGreen,
    ExcessBlue,
    Texture,
    VerticalPosition,
    BlueChromaticity,
}

impl FeatureChannel {
    /// Number of channels
    pub const COUNT: usize = 11;

    pub const ALL: [FeatureChannel; Self::COUNT] = [
        FeatureChannel::Lightness,
        FeatureChannel::ChromaA,
        FeatureChannel::ChromaB,
        FeatureChannel::Hue,
        FeatureChannel::Saturation,
        FeatureChannel::Value,
        FeatureChannel::ExcessGreen,
        FeatureChannel::ExcessBlue,
        FeatureChannel::Texture,
        FeatureChannel::VerticalPosition,
        FeatureChannel::BlueChromaticity,
    ];

    /// Column of this channel in the sample matrix
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FeatureChannel::Lightness => "lab_l",
            FeatureChannel::ChromaA => "lab_a",
            FeatureChannel::ChromaB => "lab_b",
            FeatureChannel::Hue => "hue",
            FeatureChannel::Saturation => "saturation",
            FeatureChannel::Value => "value",
            FeatureChannel::ExcessGreen => "excess_green",
            FeatureChannel::ExcessBlue => "excess_blue",
            FeatureChannel::Texture => "texture",
            FeatureChannel::VerticalPosition => "vertical_position",
            FeatureChannel::BlueChromaticity => "blue_chromaticity",
        }
    }
}

/// Undo the `(x+2)/4` scaling of the vegetation indices
pub fn decode_vegetation_index(normalized: f64) -> f64 {
    normalized * 4.0 - 2.0
}

/// Undo the `(b+128)/255` scaling and express Lab b in units of 128
pub fn decode_chroma(normalized: f64) -> f64 {
    (normalized * 255.0 - 128.0) / 128.0
}

/// Parameters for feature map construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// Gaussian sigma applied to the grayscale image before the Laplacian (0 disables)
    pub pre_smoothing_sigma: f64,
    /// Laplacian kernel used as the edge operator
    pub laplacian: LaplacianKernel,
    /// Gaussian sigma applied to the absolute Laplacian response (0 disables)
    pub texture_blur_sigma: f64,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            pre_smoothing_sigma: 1.0,
            laplacian: LaplacianKernel::Aperture1,
            texture_blur_sigma: 1.0,
        }
    }
}

impl FeatureParams {
    pub fn validate(&self) -> Result<()> {
        for (name, sigma) in [
            ("pre_smoothing_sigma", self.pre_smoothing_sigma),
            ("texture_blur_sigma", self.texture_blur_sigma),
        ] {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(Error::InvalidParameter {
                    name,
                    value: sigma.to_string(),
                    reason: "sigma must be finite and non-negative".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Feature map builder algorithm
#[derive(Debug, Clone, Default)]
pub struct FeatureMapBuilder;

impl Algorithm for FeatureMapBuilder {
    type Input = PixelGrid;
    type Output = FeatureMap;
    type Params = FeatureParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "FeatureMapBuilder"
    }

    fn description(&self) -> &'static str {
        "Per-pixel color, vegetation-index, texture and position features"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        build_feature_map(&input, params)
    }
}

/// Build the 11-channel feature map of an image.
///
/// # Arguments
/// * `grid` - Input RGB image
/// * `params` - Smoothing and edge-operator configuration
pub fn build_feature_map(grid: &PixelGrid, params: FeatureParams) -> Result<FeatureMap> {
    params.validate()?;

    let (rows, cols) = grid.shape();
    let texture = texture_energy(grid, &params)?;
    let row_scale = if rows > 1 { (rows - 1) as f64 } else { 1.0 };

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = Vec::with_capacity(cols * FeatureChannel::COUNT);
            let vertical = row as f64 / row_scale;

            for col in 0..cols {
                let rgb = grid.rgb(row, col);
                let [l, a, b] = color::lab(rgb);
                let [h, s, v] = color::hsv(rgb);

                row_data.extend_from_slice(&[
                    (l / 100.0).clamp(0.0, 1.0),
                    ((a + 128.0) / 255.0).clamp(0.0, 1.0),
                    ((b + 128.0) / 255.0).clamp(0.0, 1.0),
                    (h / 360.0).clamp(0.0, 1.0),
                    s.clamp(0.0, 1.0),
                    v.clamp(0.0, 1.0),
                    ((color::excess_green(rgb) + 2.0) / 4.0).clamp(0.0, 1.0),
                    ((color::excess_blue(rgb) + 2.0) / 4.0).clamp(0.0, 1.0),
                    unsafe { texture.get_unchecked(row, col) },
                    vertical,
                    color::blue_chromaticity(rgb).clamp(0.0, 1.0),
                ]);
            }

            row_data
        })
        .collect();

    let samples = Array2::from_shape_vec((rows * cols, FeatureChannel::COUNT), data)
        .map_err(|e| Error::Other(e.to_string()))?;

    debug!(rows, cols, channels = FeatureChannel::COUNT, "built feature map");
    FeatureMap::from_samples(rows, cols, samples)
}

/// Normalized texture energy in [0, 1).
///
/// Grayscale, optional pre-smoothing, Laplacian, absolute value, blur, then
/// `(x - min) / (max - min + ε)`. A range no wider than ε (a flat image up to
/// rounding noise) yields all zeros.
pub fn texture_energy(grid: &PixelGrid, params: &FeatureParams) -> Result<Raster<f64>> {
    let (rows, cols) = grid.shape();

    let mut gray = Raster::new(rows, cols);
    for ((row, col), v) in gray.data_mut().indexed_iter_mut() {
        *v = color::luma(grid.rgb(row, col));
    }

    let smoothed = gaussian_blur(&gray, params.pre_smoothing_sigma)?;
    let mut response = laplacian(&smoothed, params.laplacian)?;
    response.data_mut().mapv_inplace(f64::abs);
    let mut energy = gaussian_blur(&response, params.texture_blur_sigma)?;

    let stats = energy.statistics();
    let (min, max) = match (stats.min, stats.max) {
        (Some(min), Some(max)) => (min, max),
        _ => return Ok(energy.like(0.0)),
    };
    if max - min <= TEXTURE_EPSILON {
        return Ok(energy.like(0.0));
    }
    let denom = max - min + TEXTURE_EPSILON;
    energy
        .data_mut()
        .mapv_inplace(|v| ((v - min) / denom).clamp(0.0, 1.0));

    Ok(energy)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random byte for synthetic textures
    fn hash(row: usize, col: usize, salt: usize) -> u8 {
        let mut x = (row as u64).wrapping_mul(73_856_093)
            ^ (col as u64).wrapping_mul(19_349_663)
            ^ (salt as u64).wrapping_mul(83_492_791);
        x ^= x >> 13;
        x = x.wrapping_mul(0x5bd1_e995);
        x ^= x >> 15;
        (x & 0xff) as u8
    }

    fn noisy_grid(rows: usize, cols: usize) -> PixelGrid {
        PixelGrid::from_fn(rows, cols, |r, c| [hash(r, c, 1), hash(r, c, 2), hash(r, c, 3)]).unwrap()
    }

    #[test]
    fn test_all_channels_in_unit_range() {
        let grids = [
            noisy_grid(17, 23),
            PixelGrid::filled(5, 5, [0, 0, 0]).unwrap(),
            PixelGrid::filled(5, 5, [255, 255, 255]).unwrap(),
            PixelGrid::from_fn(8, 8, |r, _| if r < 4 { [255, 0, 0] } else { [0, 0, 255] }).unwrap(),
        ];

        for grid in &grids {
            let map = build_feature_map(grid, FeatureParams::default()).unwrap();
            assert_eq!(map.channels(), FeatureChannel::COUNT);
            assert_eq!(map.len(), grid.len());
            for (i, &v) in map.samples().iter().enumerate() {
                assert!(
                    (0.0..=1.0).contains(&v),
                    "channel {} out of range: {}",
                    FeatureChannel::ALL[i % FeatureChannel::COUNT].name(),
                    v
                );
            }
        }
    }

    #[test]
    fn test_flat_image_has_zero_texture() {
        for rgb in [[90, 120, 170], [37, 200, 3]] {
            let grid = PixelGrid::filled(64, 64, rgb).unwrap();
            let map = build_feature_map(&grid, FeatureParams::default()).unwrap();
            let texture = map.channel(FeatureChannel::Texture.index()).unwrap();
            let nonzero = texture.iter().filter(|&&v| v != 0.0).count();
            assert_eq!(nonzero, 0, "flat {:?} image left {} textured cells", rgb, nonzero);
        }
    }

    #[test]
    fn test_vertical_position_channel() {
        let grid = PixelGrid::filled(5, 3, [10, 10, 10]).unwrap();
        let map = build_feature_map(&grid, FeatureParams::default()).unwrap();
        let idx = FeatureChannel::VerticalPosition.index();
        assert_eq!(map.pixel(0, 2)[idx], 0.0);
        assert!((map.pixel(2, 1)[idx] - 0.5).abs() < 1e-12);
        assert_eq!(map.pixel(4, 0)[idx], 1.0);

        let single = PixelGrid::filled(1, 4, [10, 10, 10]).unwrap();
        let map = build_feature_map(&single, FeatureParams::default()).unwrap();
        assert_eq!(map.pixel(0, 3)[idx], 0.0);
    }

    #[test]
    fn test_texture_peaks_on_noise() {
        let grid = PixelGrid::from_fn(20, 20, |r, c| {
            if c < 10 {
                [128, 128, 128]
            } else {
                let v = hash(r, c, 7);
                [v, v, v]
            }
        })
        .unwrap();
        let texture = texture_energy(&grid, &FeatureParams::default()).unwrap();
        let smooth = texture.get(10, 2).unwrap();
        let rough = texture.get(10, 16).unwrap();
        assert!(rough > smooth, "noise should carry more texture: {} vs {}", rough, smooth);
    }

    #[test]
    fn test_color_channels_for_blue_water() {
        let grid = PixelGrid::filled(3, 3, [40, 80, 160]).unwrap();
        let map = build_feature_map(&grid, FeatureParams::default()).unwrap();
        let px = map.pixel(1, 1);
        assert!(decode_chroma(px[FeatureChannel::ChromaB.index()]) < -0.15);
        assert!(decode_vegetation_index(px[FeatureChannel::ExcessBlue.index()]) > 0.7);
        assert!(decode_vegetation_index(px[FeatureChannel::ExcessGreen.index()]) < 0.0);
    }

    #[test]
    fn test_negative_sigma_rejected() {
        let grid = PixelGrid::filled(3, 3, [0, 0, 0]).unwrap();
        let params = FeatureParams {
            texture_blur_sigma: -1.0,
            ..Default::default()
        };
        assert!(build_feature_map(&grid, params).is_err());
    }

    #[test]
    fn test_algorithm_trait() {
        let grid = PixelGrid::filled(4, 4, [1, 2, 3]).unwrap();
        let map = FeatureMapBuilder.execute_default(grid).unwrap();
        assert_eq!(map.shape(), (4, 4));
    }
}

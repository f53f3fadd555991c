//! Whole-image descriptor
//!
//! A compact 11-value summary of an image: mean and standard deviation of
//! the HSV channels plus five direction-averaged GLCM texture properties.
//! HSV statistics use 8-bit units (hue 0-179, saturation and value 0-255) so
//! the values are comparable with descriptors computed by common imaging
//! libraries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color;
use crate::texture::{glcm_properties, GlcmParams, GlcmProperty};
use lakeseg_core::raster::Raster;
use lakeseg_core::{Algorithm, Error, PixelGrid, Result, Stage};

/// HSV statistics and GLCM texture of one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub h_mean: f64,
    pub h_std: f64,
    pub s_mean: f64,
    pub s_std: f64,
    pub v_mean: f64,
    pub v_std: f64,
    pub contrast: f64,
    pub dissimilarity: f64,
    pub homogeneity: f64,
    pub energy: f64,
    pub correlation: f64,
}

impl ImageDescriptor {
    /// Labels of [`ImageDescriptor::to_array`], in order
    pub const LABELS: [&'static str; 11] = [
        "H_Mean",
        "H_Std",
        "S_Mean",
        "S_Std",
        "V_Mean",
        "V_Std",
        "Contrast",
        "Dissimilarity",
        "Homogeneity",
        "Energy",
        "Correlation",
    ];

    /// Flat feature vector: six color values, then five texture values
    pub fn to_array(&self) -> [f64; 11] {
        [
            self.h_mean,
            self.h_std,
            self.s_mean,
            self.s_std,
            self.v_mean,
            self.v_std,
            self.contrast,
            self.dissimilarity,
            self.homogeneity,
            self.energy,
            self.correlation,
        ]
    }

    /// `(label, value)` pairs in vector order
    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::LABELS.into_iter().zip(self.to_array())
    }
}

/// Image descriptor algorithm
#[derive(Debug, Clone, Default)]
pub struct Describe;

impl Algorithm for Describe {
    type Input = PixelGrid;
    type Output = ImageDescriptor;
    type Params = GlcmParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Describe"
    }

    fn description(&self) -> &'static str {
        "HSV mean/std and GLCM texture properties of a whole image"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        describe_image(&input, params)
    }
}

/// Compute the 11-value descriptor of an image.
///
/// The GLCM is built on the 8-bit BT.601 grayscale image, so `params.levels`
/// must be 256 unless the image is known to be darker.
pub fn describe_image(grid: &PixelGrid, params: GlcmParams) -> Result<ImageDescriptor> {
    let (rows, cols) = grid.shape();
    if grid.is_empty() {
        return Err(Error::Input {
            stage: Stage::Description,
            reason: "image has no pixels".to_string(),
        });
    }

    let mut h = Welford::default();
    let mut s = Welford::default();
    let mut v = Welford::default();
    let mut gray: Raster<u8> = Raster::new(rows, cols);

    for row in 0..rows {
        for col in 0..cols {
            let rgb = grid.rgb(row, col);
            let [hue, sat, val] = color::hsv(rgb);
            h.push(((hue / 2.0).round() as u32 % 180) as f64);
            s.push((sat * 255.0).round());
            v.push((val * 255.0).round());
            gray.set(row, col, to_u8(color::luma(rgb)))?;
        }
    }

    let texture = glcm_properties(&gray, params, &GlcmProperty::ALL)?;
    let &[contrast, dissimilarity, homogeneity, energy, correlation] = texture.as_slice() else {
        return Err(Error::Other("unexpected GLCM property count".into()));
    };

    let descriptor = ImageDescriptor {
        h_mean: h.mean,
        h_std: h.std(),
        s_mean: s.mean,
        s_std: s.std(),
        v_mean: v.mean,
        v_std: v.std(),
        contrast,
        dissimilarity,
        homogeneity,
        energy,
        correlation,
    };
    debug!(?descriptor, "described image");
    Ok(descriptor)
}

fn to_u8(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Running mean and population variance
#[derive(Default)]
struct Welford {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Welford {
    fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn std(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.m2 / self.count as f64).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_image() {
        let grid = PixelGrid::filled(16, 16, [0, 0, 255]).unwrap();
        let d = describe_image(&grid, GlcmParams::default()).unwrap();
        // Pure blue: hue 240° is 120 in 8-bit units
        assert!((d.h_mean - 120.0).abs() < 1e-9, "h_mean = {}", d.h_mean);
        assert_eq!(d.h_std, 0.0);
        assert!((d.s_mean - 255.0).abs() < 1e-9);
        assert!((d.v_mean - 255.0).abs() < 1e-9);
        assert_eq!(d.contrast, 0.0);
        assert!((d.energy - 1.0).abs() < 1e-12);
        assert_eq!(d.correlation, 1.0);
    }

    #[test]
    fn test_checkerboard_texture() {
        let grid = PixelGrid::from_fn(8, 8, |r, c| {
            if (r + c) % 2 == 0 { [0, 0, 0] } else { [255, 255, 255] }
        })
        .unwrap();
        let d = describe_image(&grid, GlcmParams::default()).unwrap();
        // Half black, half white: V mean 127.5, population std 127.5
        assert!((d.v_mean - 127.5).abs() < 1e-9);
        assert!((d.v_std - 127.5).abs() < 1e-9);
        assert!(d.contrast > 1000.0);
        assert!(d.homogeneity < 0.6);
    }

    #[test]
    fn test_labels_match_vector() {
        let grid = PixelGrid::filled(4, 4, [10, 200, 30]).unwrap();
        let d = describe_image(&grid, GlcmParams::default()).unwrap();
        let pairs: Vec<_> = d.labeled().collect();
        assert_eq!(pairs.len(), 11);
        assert_eq!(pairs[0].0, "H_Mean");
        assert_eq!(pairs[10], ("Correlation", d.correlation));
    }
}

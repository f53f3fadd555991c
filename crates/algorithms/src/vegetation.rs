//! Vegetation suppression
//!
//! Flags pixels that are simultaneously greener, more saturated and more
//! textured than most of the image. Thresholds are image-relative
//! percentiles, so the mask adapts to overall exposure and color cast.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::FeatureChannel;
use crate::statistics::percentile;
use lakeseg_core::{Algorithm, Error, FeatureMap, Mask, Result, Stage};

/// Percentile thresholds for the vegetation mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationParams {
    /// Excess-green percentile (default: 85)
    pub excess_green_percentile: f64,
    /// Saturation percentile (default: 70)
    pub saturation_percentile: f64,
    /// Texture percentile (default: 65)
    pub texture_percentile: f64,
}

impl Default for VegetationParams {
    fn default() -> Self {
        Self {
            excess_green_percentile: 85.0,
            saturation_percentile: 70.0,
            texture_percentile: 65.0,
        }
    }
}

/// Vegetation mask builder
#[derive(Debug, Clone, Default)]
pub struct VegetationSuppressor;

impl Algorithm for VegetationSuppressor {
    type Input = FeatureMap;
    type Output = Mask;
    type Params = VegetationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "VegetationSuppressor"
    }

    fn description(&self) -> &'static str {
        "Mask pixels above image-relative excess-green, saturation and texture percentiles"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        vegetation_mask(&input, params)
    }
}

/// Build the vegetation mask of a feature map.
///
/// A pixel is foreground when its excess green, saturation and texture all
/// exceed their percentile thresholds. Comparisons are strict, so a uniform
/// image yields an empty mask.
pub fn vegetation_mask(features: &FeatureMap, params: VegetationParams) -> Result<Mask> {
    if features.channels() != FeatureChannel::COUNT {
        return Err(Error::Input {
            stage: Stage::VegetationSuppression,
            reason: format!(
                "expected {} feature channels, got {}",
                FeatureChannel::COUNT,
                features.channels()
            ),
        });
    }

    let (rows, cols) = features.shape();
    if features.is_empty() {
        return Ok(Mask::new(rows, cols));
    }

    let exg = features.channel(FeatureChannel::ExcessGreen.index())?;
    let sat = features.channel(FeatureChannel::Saturation.index())?;
    let tex = features.channel(FeatureChannel::Texture.index())?;

    let threshold = |values: &ndarray::ArrayView1<'_, f64>, p: f64| -> Result<f64> {
        let mut scratch = values.to_vec();
        Ok(percentile(&mut scratch, p)?.unwrap_or(f64::INFINITY))
    };
    let t_exg = threshold(&exg, params.excess_green_percentile)?;
    let t_sat = threshold(&sat, params.saturation_percentile)?;
    let t_tex = threshold(&tex, params.texture_percentile)?;

    let mask = Mask::from_fn(rows, cols, |r, c| {
        let i = r * cols + c;
        exg[i] > t_exg && sat[i] > t_sat && tex[i] > t_tex
    });

    debug!(
        t_exg,
        t_sat,
        t_tex,
        coverage = mask.coverage(),
        "vegetation mask"
    );

    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build_feature_map, FeatureParams};
    use lakeseg_core::PixelGrid;

    fn hash(row: usize, col: usize) -> u8 {
        let x = (row * 131 + col * 71 + row * col * 17) % 97;
        (x * 255 / 96) as u8
    }

    #[test]
    fn test_uniform_image_is_blank() {
        let grid = PixelGrid::filled(12, 12, [60, 140, 50]).unwrap();
        let features = build_feature_map(&grid, FeatureParams::default()).unwrap();
        let mask = vegetation_mask(&features, VegetationParams::default()).unwrap();
        assert!(mask.is_blank());
    }

    #[test]
    fn test_flags_textured_green_not_smooth_blue() {
        // Left half smooth blue, right half noisy green
        let grid = PixelGrid::from_fn(32, 32, |r, c| {
            if c < 16 {
                [40, 80, 160]
            } else {
                let g = 100 + hash(r, c) / 2;
                let rb = hash(c, r + 5) / 4;
                [rb, g, rb]
            }
        })
        .unwrap();
        let features = build_feature_map(&grid, FeatureParams::default()).unwrap();
        let mask = vegetation_mask(&features, VegetationParams::default()).unwrap();

        assert!(mask.count() > 0, "some green pixels should be flagged");
        for r in 0..32 {
            for c in 0..16 {
                assert!(!mask.is_foreground(r, c), "blue pixel ({}, {}) flagged", r, c);
            }
        }
    }

    #[test]
    fn test_invalid_percentile() {
        let grid = PixelGrid::filled(4, 4, [0, 0, 0]).unwrap();
        let features = build_feature_map(&grid, FeatureParams::default()).unwrap();
        let params = VegetationParams {
            saturation_percentile: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            vegetation_mask(&features, params),
            Err(Error::InvalidParameter { .. })
        ));
    }
}

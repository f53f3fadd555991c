//! Per-cluster statistics
//!
//! Medians are used instead of means so a few mislabelled pixels at cluster
//! borders do not move the summary.

use serde::Serialize;

use crate::classification::ClusterAssignment;
use crate::features::{decode_chroma, decode_vegetation_index, FeatureChannel};
use crate::maybe_rayon::*;
use crate::statistics::median;
use lakeseg_core::{Error, FeatureMap, Result, Stage};

/// Robust summary of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStats {
    /// Cluster label
    pub id: u8,
    pub pixel_count: usize,
    /// Share of all image pixels
    pub area_fraction: f64,
    /// Median normalized texture energy
    pub texture: f64,
    /// Median HSV saturation
    pub saturation: f64,
    /// Median HSV value
    pub brightness: f64,
    /// Median `2G-R-B` in raw [-2, 2] units
    pub excess_green: f64,
    /// Median `2B-R-G` in raw [-2, 2] units
    pub excess_blue: f64,
    /// Median Lab b divided by 128
    pub chroma_b: f64,
    /// Share of the cluster's pixels inside the bottom band
    pub bottom_fraction: f64,
    /// Share of the cluster's pixels inside the left band
    pub left_fraction: f64,
}

/// Summarize every cluster of an assignment.
///
/// Bottom band: rows `r >= floor(rows * (1 - bottom_band_fraction))`.
/// Left band: columns `c < floor(cols * left_band_fraction)`.
pub fn cluster_statistics(
    assignment: &ClusterAssignment,
    features: &FeatureMap,
    bottom_band_fraction: f64,
    left_band_fraction: f64,
) -> Result<Vec<ClusterStats>> {
    let (rows, cols) = assignment.labels.shape();
    if features.shape() != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: features.rows(),
            ac: features.cols(),
        });
    }
    if features.channels() != FeatureChannel::COUNT {
        return Err(Error::Input {
            stage: Stage::ClusterScoring,
            reason: format!(
                "expected {} feature channels, got {}",
                FeatureChannel::COUNT,
                features.channels()
            ),
        });
    }

    assignment.check_labels(Stage::ClusterScoring)?;

    let total = rows * cols;
    let bottom_start = (rows as f64 * (1.0 - bottom_band_fraction)).floor() as usize;
    let left_end = (cols as f64 * left_band_fraction).floor() as usize;

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); assignment.k()];
    for (idx, &label) in assignment.labels.iter().enumerate() {
        members[label as usize].push(idx);
    }

    let samples = features.samples();
    let channel_median = |pixels: &[usize], channel: FeatureChannel| -> f64 {
        let mut values: Vec<f64> = pixels
            .iter()
            .map(|&i| samples[[i, channel.index()]])
            .collect();
        median(&mut values).unwrap_or(0.0)
    };

    let stats = members
        .par_iter()
        .enumerate()
        .map(|(id, pixels)| {
            let count = pixels.len();
            let share = |n: usize| if count > 0 { n as f64 / count as f64 } else { 0.0 };
            let in_bottom = pixels.iter().filter(|&&i| i / cols >= bottom_start).count();
            let in_left = pixels.iter().filter(|&&i| i % cols < left_end).count();

            ClusterStats {
                id: id as u8,
                pixel_count: count,
                area_fraction: if total > 0 { count as f64 / total as f64 } else { 0.0 },
                texture: channel_median(pixels, FeatureChannel::Texture),
                saturation: channel_median(pixels, FeatureChannel::Saturation),
                brightness: channel_median(pixels, FeatureChannel::Value),
                excess_green: decode_vegetation_index(channel_median(
                    pixels,
                    FeatureChannel::ExcessGreen,
                )),
                excess_blue: decode_vegetation_index(channel_median(
                    pixels,
                    FeatureChannel::ExcessBlue,
                )),
                chroma_b: decode_chroma(channel_median(pixels, FeatureChannel::ChromaB)),
                bottom_fraction: share(in_bottom),
                left_fraction: share(in_left),
            }
        })
        .collect();

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build_feature_map, FeatureParams};
    use lakeseg_core::raster::Raster;
    use lakeseg_core::PixelGrid;
    use ndarray::Array2;

    #[test]
    fn test_band_fractions() {
        let grid = PixelGrid::filled(10, 10, [100, 100, 100]).unwrap();
        let features = build_feature_map(&grid, FeatureParams::default()).unwrap();
        // Cluster 1 is the bottom-left 4×3 block
        let mut labels = Raster::<u8>::new(10, 10);
        for r in 6..10 {
            for c in 0..3 {
                labels.set(r, c, 1).unwrap();
            }
        }
        let assignment = ClusterAssignment {
            labels,
            centroids: Array2::zeros((2, FeatureChannel::COUNT)),
            inertia: 0.0,
            iterations: 1,
        };

        let stats = cluster_statistics(&assignment, &features, 0.4, 0.3).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].pixel_count, 12);
        assert!((stats[1].area_fraction - 0.12).abs() < 1e-12);
        assert_eq!(stats[1].bottom_fraction, 1.0);
        assert_eq!(stats[1].left_fraction, 1.0);
        // 88 background pixels, 28 of them in the bottom band
        assert!((stats[0].bottom_fraction - 28.0 / 88.0).abs() < 1e-12);
        // Gray has no saturation and no excess color
        assert!(stats[0].saturation.abs() < 1e-9);
        assert!(stats[0].excess_blue.abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch() {
        let grid = PixelGrid::filled(4, 4, [0, 0, 0]).unwrap();
        let features = build_feature_map(&grid, FeatureParams::default()).unwrap();
        let assignment = ClusterAssignment {
            labels: Raster::new(3, 4),
            centroids: Array2::zeros((2, FeatureChannel::COUNT)),
            inertia: 0.0,
            iterations: 1,
        };
        assert!(cluster_statistics(&assignment, &features, 0.4, 0.3).is_err());
    }
}

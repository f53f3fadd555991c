//! Water cluster selection
//!
//! Each cluster large enough to matter gets a weighted score rewarding a
//! position near the bottom or left edge, smoothness, low saturation and a
//! blue cast, and penalizing green and very bright (sky/glare) clusters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::{cluster_statistics, ClusterStats};
use crate::classification::ClusterAssignment;
use lakeseg_core::{Algorithm, Error, FeatureMap, Result, Stage};

/// Weights of the cluster score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Reward for the larger of the bottom and left band fractions
    pub spatial: f64,
    pub texture: f64,
    pub saturation: f64,
    pub excess_blue: f64,
    pub chroma_b: f64,
    pub excess_green: f64,
    /// Penalty per unit of brightness above `brightness_threshold`
    pub brightness: f64,
    pub brightness_threshold: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            spatial: 1.5,
            texture: 2.0,
            saturation: 1.0,
            excess_blue: 1.0,
            chroma_b: 1.0,
            excess_green: 1.5,
            brightness: 2.0,
            brightness_threshold: 0.8,
        }
    }
}

/// Parameters for cluster scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Height of the bottom band as a fraction of the rows (default: 0.4)
    pub bottom_band_fraction: f64,
    /// Width of the left band as a fraction of the columns (default: 0.3)
    pub left_band_fraction: f64,
    /// Clusters covering less of the image than this are ignored (default: 0.02)
    pub min_cluster_area_fraction: f64,
    pub weights: ScoreWeights,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            bottom_band_fraction: 0.4,
            left_band_fraction: 0.3,
            min_cluster_area_fraction: 0.02,
            weights: ScoreWeights::default(),
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("bottom_band_fraction", self.bottom_band_fraction),
            ("left_band_fraction", self.left_band_fraction),
            ("min_cluster_area_fraction", self.min_cluster_area_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "fraction must be between 0 and 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A cluster that passed the area filter, with its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCluster {
    pub stats: ClusterStats,
    pub score: f64,
}

/// Outcome of water cluster selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSelection {
    /// Label of the winning cluster
    pub cluster: u8,
    pub score: f64,
    /// Every cluster that passed the area filter, in label order
    pub candidates: Vec<ScoredCluster>,
}

/// Weighted water-likeness of one cluster
pub fn score_cluster(stats: &ClusterStats, weights: &ScoreWeights) -> f64 {
    let spatial = stats.bottom_fraction.max(stats.left_fraction);
    let glare = (stats.brightness - weights.brightness_threshold).max(0.0);

    weights.spatial * spatial - weights.texture * stats.texture
        - weights.saturation * stats.saturation
        + weights.excess_blue * stats.excess_blue
        - weights.chroma_b * stats.chroma_b
        - weights.excess_green * stats.excess_green
        - weights.brightness * glare
}

/// Cluster scorer algorithm
#[derive(Debug, Clone, Default)]
pub struct ClusterScorer;

impl Algorithm for ClusterScorer {
    type Input = (ClusterAssignment, FeatureMap);
    type Output = ClusterSelection;
    type Params = ScoringParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ClusterScorer"
    }

    fn description(&self) -> &'static str {
        "Select the most water-like cluster by position, smoothness and color"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (assignment, features) = input;
        select_water_cluster(&assignment, &features, params)
    }
}

/// Pick the cluster most likely to be water.
///
/// # Errors
/// `NotFound` when no cluster reaches `min_cluster_area_fraction`.
pub fn select_water_cluster(
    assignment: &ClusterAssignment,
    features: &FeatureMap,
    params: ScoringParams,
) -> Result<ClusterSelection> {
    params.validate()?;

    let stats = cluster_statistics(
        assignment,
        features,
        params.bottom_band_fraction,
        params.left_band_fraction,
    )?;

    let candidates: Vec<ScoredCluster> = stats
        .into_iter()
        .filter(|s| s.pixel_count > 0 && s.area_fraction >= params.min_cluster_area_fraction)
        .map(|stats| {
            let score = score_cluster(&stats, &params.weights);
            debug!(
                cluster = stats.id,
                area = stats.area_fraction,
                score,
                "scored cluster"
            );
            ScoredCluster { stats, score }
        })
        .collect();

    let mut best: Option<(u8, f64)> = None;
    for candidate in &candidates {
        if best.is_none_or(|(_, score)| candidate.score > score) {
            best = Some((candidate.stats.id, candidate.score));
        }
    }

    let Some((cluster, score)) = best else {
        return Err(Error::NotFound {
            stage: Stage::ClusterScoring,
            reason: format!(
                "no cluster covers at least {:.1}% of the image",
                params.min_cluster_area_fraction * 100.0
            ),
        });
    };

    Ok(ClusterSelection {
        cluster,
        score,
        candidates,
    })
}

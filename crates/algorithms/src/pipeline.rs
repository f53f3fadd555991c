//! End-to-end lake segmentation
//!
//! Runs the stages in order:
//!
//! ```text
//! PixelGrid -> FeatureMap -> ClusterAssignment -> candidate Mask
//!           -> candidate minus vegetation -> refined single-component Mask
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classification::{kmeans_features, ClusterAssignment, KmeansParams};
use crate::features::{build_feature_map, FeatureParams};
use crate::refine::{refine_mask, RefineParams, Refinement};
use crate::scoring::{select_water_cluster, ClusterSelection, ScoringParams};
use crate::vegetation::{vegetation_mask, VegetationParams};
use lakeseg_core::{Mask, PixelGrid, Result};

/// Every tunable of the pipeline, grouped by stage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    pub features: FeatureParams,
    pub clustering: KmeansParams,
    pub scoring: ScoringParams,
    pub vegetation: VegetationParams,
    pub refine: RefineParams,
}

/// Output of one segmentation run
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub assignment: ClusterAssignment,
    pub selection: ClusterSelection,
    /// Pixels of the selected cluster
    pub candidate: Mask,
    /// Pixels flagged as vegetation
    pub vegetation: Mask,
    /// Candidate with vegetation removed
    pub vegetation_cleaned: Mask,
    pub refinement: Refinement,
}

impl Segmentation {
    /// Final lake mask
    pub fn mask(&self) -> &Mask {
        &self.refinement.mask
    }

    /// Input image with everything outside the lake mask blacked out
    pub fn composite(&self, grid: &PixelGrid) -> Result<PixelGrid> {
        grid.masked(self.mask())
    }
}

/// Lake segmentation pipeline
#[derive(Debug, Clone, Default)]
pub struct LakeSegmenter {
    params: SegmentationParams,
}

impl LakeSegmenter {
    pub fn new(params: SegmentationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }

    /// Segment the lake in one image
    pub fn segment(&self, grid: &PixelGrid) -> Result<Segmentation> {
        let (rows, cols) = grid.shape();
        debug!(rows, cols, "segmenting image");

        let features = build_feature_map(grid, self.params.features.clone())?;

        let assignment = kmeans_features(&features, self.params.clustering.clone())?;
        debug!(
            inertia = assignment.inertia,
            iterations = assignment.iterations,
            sizes = ?assignment.cluster_sizes(),
            "clustered pixels"
        );

        let selection = select_water_cluster(&assignment, &features, self.params.scoring.clone())?;
        let candidate = assignment.mask_for(selection.cluster);
        debug!(
            cluster = selection.cluster,
            score = selection.score,
            coverage = candidate.coverage(),
            "selected water cluster"
        );

        let vegetation = vegetation_mask(&features, self.params.vegetation.clone())?;
        let vegetation_cleaned = candidate.and_not(&vegetation)?;

        let refinement = refine_mask(&vegetation_cleaned, self.params.refine.clone())?;

        info!(
            cluster = selection.cluster,
            score = selection.score,
            coverage = refinement.mask.coverage(),
            "lake segmentation complete"
        );

        Ok(Segmentation {
            assignment,
            selection,
            candidate,
            vegetation,
            vegetation_cleaned,
            refinement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakeseg_core::{Error, Stage};

    #[test]
    fn test_uniform_image_never_panics() {
        let grid = PixelGrid::filled(8, 8, [120, 130, 140]).unwrap();
        // Vertical position gives 8 distinct vectors, fewer than k = 10
        let params = SegmentationParams {
            clustering: KmeansParams { k: 10, ..Default::default() },
            ..Default::default()
        };
        let err = LakeSegmenter::new(params).segment(&grid).unwrap_err();
        assert!(matches!(err, Error::Input { stage: Stage::Clustering, .. }));
        assert_eq!(err.stage(), Some(Stage::Clustering));

        // Default k succeeds or fails cleanly
        match LakeSegmenter::default().segment(&grid) {
            Ok(result) => assert_eq!(result.mask().shape(), (8, 8)),
            Err(e) => assert!(matches!(e, Error::Input { .. } | Error::NotFound { .. })),
        }
    }

    #[test]
    fn test_masks_are_nested() {
        let grid = PixelGrid::from_fn(40, 40, |r, c| {
            if r >= 24 {
                [40, 80, 160]
            } else if c < 20 {
                [200, 200, 205]
            } else {
                [90, 90, 80]
            }
        })
        .unwrap();
        let result = LakeSegmenter::default().segment(&grid).unwrap();
        assert!(result.vegetation_cleaned.is_subset_of(&result.candidate).unwrap());
        assert!(result.mask().is_subset_of(&result.refinement.cleaned).unwrap());
        assert_eq!(result.assignment.labels.shape(), (40, 40));

        let composite = result.composite(&grid).unwrap();
        assert_eq!(composite.shape(), (40, 40));
    }

    #[test]
    fn test_params_json_round_trip_defaults() {
        let params: SegmentationParams = serde_json::from_str(r#"{"clustering": {"k": 3}}"#).unwrap();
        assert_eq!(params.clustering.k, 3);
        assert_eq!(params.clustering.restarts, 10);
        assert_eq!(params.refine, RefineParams::default());
    }
}

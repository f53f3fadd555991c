//! # LakeSeg Algorithms
//!
//! Unsupervised lake segmentation for landscape photographs.
//!
//! ## Pipeline stages
//!
//! - **features**: per-pixel color, vegetation-index, texture and position features
//! - **classification**: k-means clustering of the feature vectors
//! - **scoring**: water-likeness score per cluster and candidate selection
//! - **vegetation**: percentile-based vegetation suppression
//! - **refine**: morphological cleanup and dominant component selection
//! - **pipeline**: all of the above behind [`pipeline::LakeSegmenter`]
//!
//! ## Building blocks
//!
//! - **color**: Lab, HSV and vegetation-index conversions
//! - **texture**: Laplacian, Gaussian blur, GLCM
//! - **morphology**: binary erosion, dilation, opening, closing
//! - **components**: 8-connected labeling and component scoring
//! - **statistics**: percentiles by selection
//! - **descriptor**: 11-value HSV + GLCM image descriptor

pub(crate) mod maybe_rayon;

pub mod classification;
pub mod color;
pub mod components;
pub mod descriptor;
pub mod features;
pub mod morphology;
pub mod pipeline;
pub mod refine;
pub mod scoring;
pub mod statistics;
pub mod texture;
pub mod vegetation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::{kmeans_features, ClusterAssignment, KmeansParams, RegionClusterer};
    pub use crate::components::{
        label_components, score_component, select_dominant, ComponentWeights, ConnectedComponent,
    };
    pub use crate::descriptor::{describe_image, Describe, ImageDescriptor};
    pub use crate::features::{build_feature_map, FeatureChannel, FeatureMapBuilder, FeatureParams};
    pub use crate::morphology::{closing, dilate, erode, opening, StructuringElement};
    pub use crate::pipeline::{LakeSegmenter, Segmentation, SegmentationParams};
    pub use crate::refine::{refine_mask, MaskRefiner, RefineParams, Refinement};
    pub use crate::scoring::{
        score_cluster, select_water_cluster, ClusterScorer, ClusterSelection, ClusterStats,
        ScoreWeights, ScoringParams,
    };
    pub use crate::texture::{GlcmParams, LaplacianKernel};
    pub use crate::vegetation::{vegetation_mask, VegetationParams, VegetationSuppressor};
    pub use lakeseg_core::prelude::*;
}

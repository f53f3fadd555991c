//! Water-likeness scoring of clusters
//!
//! - **stats**: robust per-cluster summaries (medians and band fractions)
//! - **select**: weighted score and selection of the water cluster

mod select;
mod stats;

pub use select::{
    score_cluster, select_water_cluster, ClusterScorer, ClusterSelection, ScoreWeights,
    ScoredCluster, ScoringParams,
};
pub use stats::{cluster_statistics, ClusterStats};

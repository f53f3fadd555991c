//! Unsupervised clustering of per-pixel features
//!
//! - **K-means**: k-means++ seeding, Lloyd iterations, seeded restarts

mod kmeans;

pub use kmeans::{kmeans_features, ClusterAssignment, KmeansParams, RegionClusterer};

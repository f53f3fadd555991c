//! K-means clustering of per-pixel feature vectors
//!
//! Unsupervised partition of every pixel into K clusters by iterative
//! centroid refinement in the normalized feature space. Seeding is k-means++,
//! and several seeded restarts are run with the lowest-inertia one kept.

use std::collections::HashSet;

use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::maybe_rayon::*;
use lakeseg_core::raster::Raster;
use lakeseg_core::{Algorithm, Error, FeatureMap, Mask, Result, Stage};

/// Parameters for K-means clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmeansParams {
    /// Number of clusters, 2..=255 (default: 4)
    pub k: usize,
    /// Maximum Lloyd iterations per restart (default: 20)
    pub max_iterations: usize,
    /// Stop when inertia decreases by less than this (default: 0.001)
    pub convergence: f64,
    /// Independent seeded runs; the lowest inertia wins (default: 10)
    pub restarts: usize,
    /// Seed for the k-means++ sampling
    pub seed: u64,
}

impl Default for KmeansParams {
    fn default() -> Self {
        Self {
            k: 4,
            max_iterations: 20,
            convergence: 1e-3,
            restarts: 10,
            seed: 42,
        }
    }
}

impl KmeansParams {
    pub fn validate(&self) -> Result<()> {
        if self.k < 2 || self.k > u8::MAX as usize {
            return Err(Error::InvalidParameter {
                name: "k",
                value: self.k.to_string(),
                reason: "cluster count must be between 2 and 255".to_string(),
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                value: "0".to_string(),
                reason: "at least one iteration is required".to_string(),
            });
        }
        if self.restarts == 0 {
            return Err(Error::InvalidParameter {
                name: "restarts",
                value: "0".to_string(),
                reason: "at least one run is required".to_string(),
            });
        }
        if !self.convergence.is_finite() || self.convergence < 0.0 {
            return Err(Error::InvalidParameter {
                name: "convergence",
                value: self.convergence.to_string(),
                reason: "must be finite and non-negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Result of clustering a feature map
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    /// Cluster label per pixel, in `[0, k)`
    pub labels: Raster<u8>,
    /// One centroid per row (k × F), in the normalized feature space
    pub centroids: Array2<f64>,
    /// Total squared distance of every pixel to its centroid
    pub inertia: f64,
    /// Iterations run by the winning restart
    pub iterations: usize,
}

impl ClusterAssignment {
    /// Number of clusters
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    /// Pixel count per cluster. Labels outside `[0, k)` are not counted.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k()];
        for &label in self.labels.iter() {
            if let Some(size) = sizes.get_mut(label as usize) {
                *size += 1;
            }
        }
        sizes
    }

    /// Check that there is at least one centroid and every label is in `[0, k)`
    pub fn check_labels(&self, stage: Stage) -> Result<()> {
        let k = self.k();
        if k == 0 {
            return Err(Error::Input {
                stage,
                reason: "assignment has no centroids".to_string(),
            });
        }
        if let Some(bad) = self.labels.iter().find(|&&label| label as usize >= k) {
            return Err(Error::Input {
                stage,
                reason: format!("label {} outside [0, {})", bad, k),
            });
        }
        Ok(())
    }

    /// Foreground where the pixel belongs to `cluster`
    pub fn mask_for(&self, cluster: u8) -> Mask {
        let labels = self.labels.data();
        Mask::from_fn(self.labels.rows(), self.labels.cols(), |r, c| {
            labels[[r, c]] == cluster
        })
    }
}

/// K-means region clusterer
#[derive(Debug, Clone, Default)]
pub struct RegionClusterer;

impl Algorithm for RegionClusterer {
    type Input = FeatureMap;
    type Output = ClusterAssignment;
    type Params = KmeansParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "RegionClusterer"
    }

    fn description(&self) -> &'static str {
        "K-means++ clustering of per-pixel feature vectors with seeded restarts"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        kmeans_features(&input, params)
    }
}

/// Cluster every pixel of a feature map into `k` groups.
///
/// # Arguments
/// * `features` - Per-pixel feature map
/// * `params` - Cluster count, iteration limits, restarts and seed
///
/// # Errors
/// `Input` when the map is empty or holds fewer than `k` distinct vectors.
pub fn kmeans_features(features: &FeatureMap, params: KmeansParams) -> Result<ClusterAssignment> {
    params.validate()?;

    if features.is_empty() {
        return Err(Error::Input {
            stage: Stage::Clustering,
            reason: "feature map is empty".to_string(),
        });
    }

    let samples = features.samples();
    if !has_distinct_vectors(samples, params.k) {
        return Err(Error::Input {
            stage: Stage::Clustering,
            reason: format!("fewer than {} distinct feature vectors", params.k),
        });
    }

    let samples = samples.as_standard_layout();
    let data = samples
        .as_slice()
        .ok_or_else(|| Error::Other("feature samples are not contiguous".into()))?;
    let dim = features.channels();

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<Run> = None;

    for restart in 0..params.restarts {
        let seeds = seed_centroids(data, dim, params.k, &mut rng);
        let run = lloyd(data, dim, params.k, seeds, &params);
        debug!(restart, inertia = run.inertia, iterations = run.iterations, "k-means run");

        // Strict comparison keeps the first of equal runs
        if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }

    let best = best.ok_or_else(|| Error::Other("no k-means run completed".into()))?;
    let labels = Raster::from_vec(best.labels, features.rows(), features.cols())?;
    let centroids = Array2::from_shape_vec((params.k, dim), best.centroids)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(ClusterAssignment {
        labels,
        centroids,
        inertia: best.inertia,
        iterations: best.iterations,
    })
}

struct Run {
    labels: Vec<u8>,
    centroids: Vec<f64>,
    inertia: f64,
    iterations: usize,
}

/// True when the samples contain at least `k` distinct vectors
fn has_distinct_vectors(samples: ArrayView2<'_, f64>, k: usize) -> bool {
    let mut seen: HashSet<Vec<u64>> = HashSet::new();
    for row in samples.rows() {
        seen.insert(row.iter().map(|v| v.to_bits()).collect());
        if seen.len() >= k {
            return true;
        }
    }
    false
}

#[inline]
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// k-means++ seeding: first centroid uniform, the rest drawn with
/// probability proportional to the squared distance to the nearest chosen
/// centroid.
fn seed_centroids(data: &[f64], dim: usize, k: usize, rng: &mut StdRng) -> Vec<f64> {
    let n = data.len() / dim;
    let point = move |i: usize| &data[i * dim..(i + 1) * dim];

    let mut centroids = Vec::with_capacity(k * dim);
    let first = rng.gen_range(0..n);
    centroids.extend_from_slice(point(first));

    let mut nearest: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| squared_distance(point(i), point(first)))
        .collect();

    for _ in 1..k {
        let total: f64 = nearest.iter().sum();
        let chosen = if total > 0.0 {
            let target = rng.r#gen::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = None;
            let mut last_positive = 0;
            for (i, &d) in nearest.iter().enumerate() {
                if d > 0.0 {
                    last_positive = i;
                    acc += d;
                    if acc > target {
                        chosen = Some(i);
                        break;
                    }
                }
            }
            // Rounding can leave the target just above the running sum
            chosen.unwrap_or(last_positive)
        } else {
            rng.gen_range(0..n)
        };

        let centroid = point(chosen).to_vec();
        nearest
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, d)| *d = d.min(squared_distance(point(i), &centroid)));
        centroids.extend_from_slice(&centroid);
    }

    centroids
}

/// Lloyd iterations from the given seeds.
///
/// Returned labels are the nearest-centroid assignment under the returned
/// centroids, and `inertia` is measured for that pair.
fn lloyd(data: &[f64], dim: usize, k: usize, mut centroids: Vec<f64>, params: &KmeansParams) -> Run {
    let n = data.len() / dim;
    let mut previous = f64::INFINITY;
    let mut iterations = 0;

    loop {
        let assigned: Vec<(u8, f64)> = (0..n)
            .into_par_iter()
            .map(|i| nearest_centroid(&data[i * dim..(i + 1) * dim], &centroids, dim))
            .collect();
        iterations += 1;

        // Pixel-order reduction keeps the result independent of thread count
        let inertia: f64 = assigned.iter().map(|&(_, d)| d).sum();
        let converged = previous - inertia < params.convergence;

        if converged || iterations >= params.max_iterations {
            return Run {
                labels: assigned.into_iter().map(|(label, _)| label).collect(),
                centroids,
                inertia,
                iterations,
            };
        }

        let mut sums = vec![0.0; k * dim];
        let mut counts = vec![0usize; k];
        for (i, &(label, _)) in assigned.iter().enumerate() {
            let label = label as usize;
            counts[label] += 1;
            for (s, &v) in sums[label * dim..(label + 1) * dim]
                .iter_mut()
                .zip(&data[i * dim..(i + 1) * dim])
            {
                *s += v;
            }
        }

        for (cluster, &count) in counts.iter().enumerate() {
            // An emptied cluster keeps its previous centroid
            if count > 0 {
                let range = cluster * dim..(cluster + 1) * dim;
                for (c, &s) in centroids[range.clone()].iter_mut().zip(&sums[range]) {
                    *c = s / count as f64;
                }
            }
        }

        previous = inertia;
    }
}

#[inline]
fn nearest_centroid(point: &[f64], centroids: &[f64], dim: usize) -> (u8, f64) {
    let mut best_dist = f64::INFINITY;
    let mut best_k = 0;
    for (k, centroid) in centroids.chunks_exact(dim).enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_k = k;
        }
    }
    (best_k as u8, best_dist)
}

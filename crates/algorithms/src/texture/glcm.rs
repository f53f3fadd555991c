//! Gray-Level Co-occurrence Matrix (GLCM) texture properties
//!
//! Whole-image Haralick measures: one symmetric, normalized GLCM per
//! direction (0°, 45°, 90°, 135°), each property averaged over the four
//! directions so the result does not depend on image rotation by 45° steps.

use lakeseg_core::raster::Raster;
use lakeseg_core::{Error, Result};

/// Available GLCM texture properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlcmProperty {
    /// Local intensity variation, `Σ p(i,j)(i-j)²`
    Contrast,
    /// Weighted absolute difference, `Σ p(i,j)|i-j|`
    Dissimilarity,
    /// Inverse difference moment, `Σ p(i,j) / (1 + (i-j)²)`
    Homogeneity,
    /// Square root of the angular second moment
    Energy,
    /// Linear dependency of gray levels between neighbors
    Correlation,
}

impl GlcmProperty {
    pub const ALL: [GlcmProperty; 5] = [
        GlcmProperty::Contrast,
        GlcmProperty::Dissimilarity,
        GlcmProperty::Homogeneity,
        GlcmProperty::Energy,
        GlcmProperty::Correlation,
    ];
}

/// Parameters for GLCM computation
#[derive(Debug, Clone)]
pub struct GlcmParams {
    /// Number of gray levels; input values must be below this (default: 256)
    pub levels: usize,
    /// Pixel distance for co-occurrence (default: 1)
    pub distance: usize,
}

impl Default for GlcmParams {
    fn default() -> Self {
        Self {
            levels: 256,
            distance: 1,
        }
    }
}

/// Symmetric, normalized co-occurrence matrix for one direction
#[derive(Debug, Clone)]
pub struct Glcm {
    levels: usize,
    probabilities: Vec<f64>,
}

impl Glcm {
    /// Build the matrix for pixel pairs `(r, c)` and `(r + dr, c + dc)`.
    pub fn build(gray: &Raster<u8>, levels: usize, offset: (isize, isize)) -> Result<Self> {
        let (rows, cols) = gray.shape();
        let mut counts = vec![0.0; levels * levels];
        let mut total = 0.0;

        for r in 0..rows {
            for c in 0..cols {
                let r2 = r as isize + offset.0;
                let c2 = c as isize + offset.1;
                if r2 < 0 || c2 < 0 || r2 >= rows as isize || c2 >= cols as isize {
                    continue;
                }
                let i = unsafe { gray.get_unchecked(r, c) } as usize;
                let j = unsafe { gray.get_unchecked(r2 as usize, c2 as usize) } as usize;
                if i >= levels || j >= levels {
                    return Err(Error::InvalidParameter {
                        name: "levels",
                        value: levels.to_string(),
                        reason: format!("gray value {} does not fit", i.max(j)),
                    });
                }
                counts[i * levels + j] += 1.0;
                counts[j * levels + i] += 1.0; // Symmetric
                total += 2.0;
            }
        }

        if total > 0.0 {
            for v in &mut counts {
                *v /= total;
            }
        }

        Ok(Self {
            levels,
            probabilities: counts,
        })
    }

    /// Probability of the (i, j) gray-level pair
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.probabilities[i * self.levels + j]
    }

    /// Evaluate one texture property
    pub fn property(&self, property: GlcmProperty) -> f64 {
        let n = self.levels;
        let p = &self.probabilities;

        match property {
            GlcmProperty::Contrast => {
                let mut val = 0.0;
                for i in 0..n {
                    for j in 0..n {
                        val += p[i * n + j] * (i as f64 - j as f64).powi(2);
                    }
                }
                val
            }
            GlcmProperty::Dissimilarity => {
                let mut val = 0.0;
                for i in 0..n {
                    for j in 0..n {
                        val += p[i * n + j] * (i as f64 - j as f64).abs();
                    }
                }
                val
            }
            GlcmProperty::Homogeneity => {
                let mut val = 0.0;
                for i in 0..n {
                    for j in 0..n {
                        val += p[i * n + j] / (1.0 + (i as f64 - j as f64).powi(2));
                    }
                }
                val
            }
            GlcmProperty::Energy => p.iter().map(|v| v * v).sum::<f64>().sqrt(),
            GlcmProperty::Correlation => {
                let mut mu_i = 0.0;
                let mut mu_j = 0.0;
                for i in 0..n {
                    for j in 0..n {
                        let v = p[i * n + j];
                        mu_i += i as f64 * v;
                        mu_j += j as f64 * v;
                    }
                }
                let mut sig_i = 0.0;
                let mut sig_j = 0.0;
                let mut cov = 0.0;
                for i in 0..n {
                    for j in 0..n {
                        let v = p[i * n + j];
                        sig_i += (i as f64 - mu_i).powi(2) * v;
                        sig_j += (j as f64 - mu_j).powi(2) * v;
                        cov += v * (i as f64 - mu_i) * (j as f64 - mu_j);
                    }
                }
                let sig_i = sig_i.sqrt();
                let sig_j = sig_j.sqrt();

                // Constant images are perfectly correlated
                if sig_i < 1e-15 || sig_j < 1e-15 {
                    return 1.0;
                }
                cov / (sig_i * sig_j)
            }
        }
    }
}

/// Direction-averaged GLCM properties of an 8-bit grayscale raster.
///
/// Returns one value per entry of `properties`, in the same order.
pub fn glcm_properties(
    gray: &Raster<u8>,
    params: GlcmParams,
    properties: &[GlcmProperty],
) -> Result<Vec<f64>> {
    if params.levels < 2 {
        return Err(Error::InvalidParameter {
            name: "levels",
            value: params.levels.to_string(),
            reason: "GLCM needs at least 2 gray levels".to_string(),
        });
    }
    if params.distance == 0 {
        return Err(Error::InvalidParameter {
            name: "distance",
            value: "0".to_string(),
            reason: "co-occurrence distance must be at least 1".to_string(),
        });
    }

    let d = params.distance as isize;
    // 0°, 45°, 90°, 135°
    let directions: [(isize, isize); 4] = [(0, d), (d, d), (d, 0), (d, -d)];

    let matrices = directions
        .iter()
        .map(|&offset| Glcm::build(gray, params.levels, offset))
        .collect::<Result<Vec<_>>>()?;

    Ok(properties
        .iter()
        .map(|&prop| {
            matrices.iter().map(|m| m.property(prop)).sum::<f64>() / matrices.len() as f64
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripes(size: usize) -> Raster<u8> {
        let mut r = Raster::new(size, size);
        for row in 0..size {
            for col in 0..size {
                r.set(row, col, if col % 2 == 0 { 0 } else { 3 }).unwrap();
            }
        }
        r
    }

    #[test]
    fn test_uniform_image() {
        let r = Raster::filled(8, 8, 5u8);
        let props = glcm_properties(
            &r,
            GlcmParams { levels: 8, distance: 1 },
            &GlcmProperty::ALL,
        )
        .unwrap();
        assert_eq!(props[0], 0.0, "contrast");
        assert_eq!(props[1], 0.0, "dissimilarity");
        assert!((props[2] - 1.0).abs() < 1e-12, "homogeneity");
        assert!((props[3] - 1.0).abs() < 1e-12, "energy");
        assert_eq!(props[4], 1.0, "correlation");
    }

    #[test]
    fn test_matrix_is_symmetric_and_normalized() {
        let m = Glcm::build(&stripes(6), 4, (0, 1)).unwrap();
        let total: f64 = (0..4).flat_map(|i| (0..4).map(move |j| (i, j))).map(|(i, j)| m.get(i, j)).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(m.get(0, 3), m.get(3, 0));
    }

    #[test]
    fn test_horizontal_stripes_contrast() {
        let m = Glcm::build(&stripes(6), 4, (0, 1)).unwrap();
        // Every horizontal pair differs by 3 levels
        assert!((m.property(GlcmProperty::Contrast) - 9.0).abs() < 1e-12);
        assert!((m.property(GlcmProperty::Correlation) + 1.0).abs() < 1e-12);

        let vertical = Glcm::build(&stripes(6), 4, (1, 0)).unwrap();
        assert_eq!(vertical.property(GlcmProperty::Contrast), 0.0);
    }

    #[test]
    fn test_value_above_levels_is_rejected() {
        let r = Raster::filled(3, 3, 200u8);
        assert!(glcm_properties(&r, GlcmParams { levels: 16, distance: 1 }, &GlcmProperty::ALL).is_err());
    }

    #[test]
    fn test_invalid_params() {
        let r = Raster::filled(3, 3, 1u8);
        assert!(glcm_properties(&r, GlcmParams { levels: 1, distance: 1 }, &[]).is_err());
        assert!(glcm_properties(&r, GlcmParams { levels: 4, distance: 0 }, &[]).is_err());
    }
}

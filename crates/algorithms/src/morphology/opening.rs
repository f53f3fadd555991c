//! Morphological opening (erosion followed by dilation)
//!
//! Removes specks and thin protrusions while preserving the overall shape
//! of larger regions.

use serde::{Deserialize, Serialize};
use lakeseg_core::{Algorithm, Error, Mask, Result};

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Parameters for morphological opening
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Erosion passes, followed by the same number of dilation passes
    pub iterations: usize,
}

/// Opening algorithm
#[derive(Debug, Clone, Default)]
pub struct Opening;

impl Algorithm for Opening {
    type Input = Mask;
    type Output = Mask;
    type Params = OpeningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Opening"
    }

    fn description(&self) -> &'static str {
        "Morphological opening (erosion then dilation) to remove small foreground features"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        opening(&input, &params.element, params.iterations)
    }
}

/// Open a mask: erode `iterations` times, then dilate `iterations` times.
pub fn opening(mask: &Mask, element: &StructuringElement, iterations: usize) -> Result<Mask> {
    let eroded = erode(mask, element, iterations)?;
    dilate(&eroded, element, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_removes_noise_keeps_block() {
        let mut mask = Mask::from_fn(20, 20, |r, c| (4..16).contains(&r) && (4..16).contains(&c));
        mask.set(0, 19, true).unwrap();
        mask.set(1, 0, true).unwrap();

        let result = opening(&mask, &StructuringElement::Square(1), 1).unwrap();
        assert!(!result.is_foreground(0, 19));
        assert!(!result.is_foreground(1, 0));
        // A square survives opening with a smaller square element unchanged
        for r in 4..16 {
            for c in 4..16 {
                assert!(result.is_foreground(r, c), "block pixel ({}, {}) lost", r, c);
            }
        }
        assert!(result.is_subset_of(&mask).unwrap());
    }

    #[test]
    fn test_opening_is_anti_extensive() {
        let mask = Mask::from_fn(16, 16, |r, c| (r * 7 + c * 3) % 5 != 0);
        let result = opening(&mask, &StructuringElement::Cross(1), 2).unwrap();
        assert!(result.is_subset_of(&mask).unwrap());
    }
}

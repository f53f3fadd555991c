//! Morphological closing (dilation followed by erosion)
//!
//! Fills small holes and gaps while preserving the overall shape of
//! larger regions.

use serde::{Deserialize, Serialize};
use lakeseg_core::{Algorithm, Error, Mask, Result};

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Parameters for morphological closing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosingParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Dilation passes, followed by the same number of erosion passes
    pub iterations: usize,
}

/// Closing algorithm
#[derive(Debug, Clone, Default)]
pub struct Closing;

impl Algorithm for Closing {
    type Input = Mask;
    type Output = Mask;
    type Params = ClosingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Closing"
    }

    fn description(&self) -> &'static str {
        "Morphological closing (dilation then erosion) to fill small holes"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        closing(&input, &params.element, params.iterations)
    }
}

/// Close a mask: dilate `iterations` times, then erode `iterations` times.
pub fn closing(mask: &Mask, element: &StructuringElement, iterations: usize) -> Result<Mask> {
    let dilated = dilate(mask, element, iterations)?;
    erode(&dilated, element, iterations)
}

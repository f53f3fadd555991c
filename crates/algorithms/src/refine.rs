//! Mask refinement
//!
//! Morphological cleanup of the candidate mask followed by selection of the
//! single dominant connected component.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{label_components, select_dominant, ComponentWeights, ConnectedComponent};
use crate::morphology::{closing, opening, StructuringElement};
use lakeseg_core::{Algorithm, Error, Mask, Result};

/// Parameters for mask refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Element for both opening and closing (default: 9×9 ellipse)
    pub element: StructuringElement,
    /// Opening passes (default: 2)
    pub open_iterations: usize,
    /// Closing passes (default: 3)
    pub close_iterations: usize,
    pub weights: ComponentWeights,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            open_iterations: 2,
            close_iterations: 3,
            weights: ComponentWeights::default(),
        }
    }
}

/// Result of mask refinement
#[derive(Debug, Clone)]
pub struct Refinement {
    /// Mask after opening and closing
    pub cleaned: Mask,
    /// Every connected component of the cleaned mask
    pub components: Vec<ConnectedComponent>,
    /// The kept component, `None` when the cleaned mask is blank
    pub chosen: Option<ConnectedComponent>,
    /// Final single-component mask
    pub mask: Mask,
}

/// Mask refiner algorithm
#[derive(Debug, Clone, Default)]
pub struct MaskRefiner;

impl Algorithm for MaskRefiner {
    type Input = Mask;
    type Output = Refinement;
    type Params = RefineParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "MaskRefiner"
    }

    fn description(&self) -> &'static str {
        "Opening, closing and dominant connected component selection"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        refine_mask(&input, params)
    }
}

/// Clean a candidate mask and keep its dominant component.
///
/// A blank result is not an error: the returned mask is simply empty.
pub fn refine_mask(candidate: &Mask, params: RefineParams) -> Result<Refinement> {
    let opened = opening(candidate, &params.element, params.open_iterations)?;
    let cleaned = closing(&opened, &params.element, params.close_iterations)?;

    let labeled = label_components(&cleaned)?;
    let (rows, cols) = cleaned.shape();
    let chosen = select_dominant(&labeled.components, rows, cols, &params.weights).cloned();

    let mask = match &chosen {
        Some(component) => labeled.mask_for(component.id),
        None => Mask::new(rows, cols),
    };

    debug!(
        components = labeled.components.len(),
        chosen = chosen.as_ref().map(|c| c.id),
        area = chosen.as_ref().map_or(0, |c| c.area),
        "refined mask"
    );

    Ok(Refinement {
        cleaned,
        components: labeled.components,
        chosen,
        mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full-width band of rows 20..40 in a 64×64 image
    fn band() -> Mask {
        Mask::from_fn(64, 64, |r, _| (20..40).contains(&r))
    }

    #[test]
    fn test_band_is_fixed_point() {
        let once = refine_mask(&band(), RefineParams::default()).unwrap();
        assert_eq!(once.mask, band());
        let twice = refine_mask(&once.mask, RefineParams::default()).unwrap();
        assert_eq!(twice.mask, once.mask, "refinement should be idempotent");
    }

    #[test]
    fn test_irregular_blob_is_idempotent() {
        // Ellipse with an arm and a notch, well clear of the image border
        let blob = Mask::from_fn(96, 96, |r, c| {
            let dr = (r as f64 - 48.0) / 16.0;
            let dc = (c as f64 - 40.0) / 20.0;
            let ellipse = dr * dr + dc * dc <= 1.0;
            let arm = (42..54).contains(&r) && (55..74).contains(&c);
            let notch = (30..38).contains(&r) && (36..44).contains(&c);
            (ellipse || arm) && !notch
        });
        let once = refine_mask(&blob, RefineParams::default()).unwrap();
        assert!(!once.mask.is_blank());
        assert!(once.mask.is_foreground(48, 40));
        let twice = refine_mask(&once.mask, RefineParams::default()).unwrap();
        assert_eq!(twice.mask, once.mask, "refinement should be idempotent");
    }

    #[test]
    fn test_keeps_single_component() {
        // Large block at the lower left, smaller block at the upper right, plus a speck
        let mask = Mask::from_fn(96, 96, |r, c| {
            ((50..90).contains(&r) && (2..40).contains(&c))
                || ((5..30).contains(&r) && (60..90).contains(&c))
                || (r == 2 && c == 2)
        });
        let result = refine_mask(&mask, RefineParams::default()).unwrap();

        assert_eq!(result.components.len(), 2, "speck should be opened away");
        let chosen = result.chosen.unwrap();
        assert!(chosen.left <= 2);
        assert!(result.mask.is_foreground(70, 20));
        assert!(!result.mask.is_foreground(15, 75));
        assert!(!result.mask.is_foreground(2, 2));
        assert_eq!(result.mask.count(), chosen.area);
    }

    #[test]
    fn test_empty_candidate() {
        let result = refine_mask(&Mask::new(32, 32), RefineParams::default()).unwrap();
        assert!(result.mask.is_blank());
        assert!(result.chosen.is_none());
        assert!(result.components.is_empty());

        let again = refine_mask(&result.mask, RefineParams::default()).unwrap();
        assert!(again.mask.is_blank());
    }

    #[test]
    fn test_small_blob_vanishes() {
        let mask = Mask::from_fn(32, 32, |r, c| (10..14).contains(&r) && (10..14).contains(&c));
        let result = refine_mask(&mask, RefineParams::default()).unwrap();
        assert!(result.mask.is_blank());
    }

    #[test]
    fn test_invalid_element() {
        let params = RefineParams {
            element: StructuringElement::Square(0),
            ..Default::default()
        };
        assert!(refine_mask(&band(), params).is_err());
    }
}

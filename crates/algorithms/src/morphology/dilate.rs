//! Binary dilation
//!
//! A pixel becomes foreground if any in-image cell under the structuring
//! element is foreground. Grows regions and fills small holes.

use serde::{Deserialize, Serialize};
use crate::maybe_rayon::*;
use lakeseg_core::{Algorithm, Error, Mask, Result};

use super::element::StructuringElement;

/// Parameters for binary dilation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DilateParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Number of successive passes
    pub iterations: usize,
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = Mask;
    type Output = Mask;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Binary dilation (foreground wherever the element touches foreground)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate(&input, &params.element, params.iterations)
    }
}

/// Dilate a mask `iterations` times.
///
/// Cells outside the image count as background. Zero iterations returns a
/// copy.
///
/// # Arguments
/// * `mask` - Input mask
/// * `element` - Structuring element defining the neighborhood shape
/// * `iterations` - Number of passes
pub fn dilate(mask: &Mask, element: &StructuringElement, iterations: usize) -> Result<Mask> {
    element.validate()?;
    let offsets = element.offsets();

    let mut current = mask.clone();
    for _ in 0..iterations {
        current = dilate_once(&current, &offsets)?;
    }
    Ok(current)
}

fn dilate_once(mask: &Mask, offsets: &[(isize, isize)]) -> Result<Mask> {
    let (rows, cols) = mask.shape();
    let cells = mask.as_raster();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![Mask::BACKGROUND; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let touches = offsets.iter().any(|&(dr, dc)| {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    nr >= 0
                        && nc >= 0
                        && nr < rows as isize
                        && nc < cols as isize
                        && unsafe { cells.get_unchecked(nr as usize, nc as usize) } == Mask::FOREGROUND
                });

                if touches {
                    *out = Mask::FOREGROUND;
                }
            }

            row_data
        })
        .collect();

    Mask::from_vec(data, rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dilate_single_pixel_to_element() {
        let mut mask = Mask::new(11, 11);
        mask.set(5, 5, true).unwrap();
        let element = StructuringElement::default();
        let result = dilate(&mask, &element, 1).unwrap();
        assert_eq!(result.count(), element.offsets().len());
        assert!(result.is_foreground(1, 5));
        assert!(!result.is_foreground(1, 6));
    }

    #[test]
    fn test_dilate_fills_hole() {
        let mut mask = Mask::from_fn(7, 7, |r, c| (1..6).contains(&r) && (1..6).contains(&c));
        mask.set(3, 3, false).unwrap();
        let result = dilate(&mask, &StructuringElement::Cross(1), 1).unwrap();
        assert!(result.is_foreground(3, 3));
        assert!(result.is_foreground(0, 3));
        assert!(!result.is_foreground(0, 0));
    }

    #[test]
    fn test_blank_stays_blank() {
        let mask = Mask::new(6, 6);
        assert!(dilate(&mask, &StructuringElement::default(), 4).unwrap().is_blank());
    }
}

//! Binary erosion
//!
//! A pixel stays foreground only if every in-image cell under the
//! structuring element is foreground. Shrinks regions and removes specks.

use serde::{Deserialize, Serialize};
use crate::maybe_rayon::*;
use lakeseg_core::{Algorithm, Error, Mask, Result};

use super::element::StructuringElement;

/// Parameters for binary erosion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErodeParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Number of successive passes
    pub iterations: usize,
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = Mask;
    type Output = Mask;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Binary erosion (foreground only where the whole element fits)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        erode(&input, &params.element, params.iterations)
    }
}

/// Erode a mask `iterations` times.
///
/// Cells outside the image are ignored, so foreground touching the border
/// is not eaten away from that side. Zero iterations returns a copy.
///
/// # Arguments
/// * `mask` - Input mask
/// * `element` - Structuring element defining the neighborhood shape
/// * `iterations` - Number of passes
pub fn erode(mask: &Mask, element: &StructuringElement, iterations: usize) -> Result<Mask> {
    element.validate()?;
    let offsets = element.offsets();

    let mut current = mask.clone();
    for _ in 0..iterations {
        current = erode_once(&current, &offsets)?;
    }
    Ok(current)
}

fn erode_once(mask: &Mask, offsets: &[(isize, isize)]) -> Result<Mask> {
    let (rows, cols) = mask.shape();
    let cells = mask.as_raster();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![Mask::BACKGROUND; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                if unsafe { cells.get_unchecked(row, col) } != Mask::FOREGROUND {
                    continue;
                }

                let fits = offsets.iter().all(|&(dr, dc)| {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        return true;
                    }
                    (unsafe { cells.get_unchecked(nr as usize, nc as usize) }) == Mask::FOREGROUND
                });

                if fits {
                    *out = Mask::FOREGROUND;
                }
            }

            row_data
        })
        .collect();

    Mask::from_vec(data, rows, cols)
}

//! Structuring element definitions for morphological operations
//!
//! A structuring element defines the neighborhood shape used in
//! erosion, dilation, and derived transforms.

use serde::{Deserialize, Serialize};
use lakeseg_core::raster::Neighborhood;
use lakeseg_core::{Error, Result};

/// Shape of a structuring element for morphological operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuringElement {
    /// Ellipse inscribed in a `width × height` box, anchored at
    /// `(height / 2, width / 2)`
    Ellipse { width: usize, height: usize },
    /// Square element of given radius (side = 2*radius + 1)
    Square(usize),
    /// Cross (plus-shaped) element of given radius
    Cross(usize),
    /// Disk element of given radius
    Disk(usize),
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Ellipse {
            width: 9,
            height: 9,
        }
    }
}

impl StructuringElement {
    /// Validate the structuring element, returning an error for invalid configurations
    pub fn validate(&self) -> Result<()> {
        match self {
            StructuringElement::Ellipse { width, height } => {
                if *width == 0 || *height == 0 {
                    return Err(Error::InvalidParameter {
                        name: "ellipse",
                        value: format!("{}x{}", width, height),
                        reason: "ellipse width and height must be at least 1".to_string(),
                    });
                }
                Ok(())
            }
            StructuringElement::Square(r) | StructuringElement::Cross(r) | StructuringElement::Disk(r) => {
                if *r == 0 {
                    return Err(Error::InvalidParameter {
                        name: "radius",
                        value: "0".to_string(),
                        reason: "structuring element radius must be at least 1".to_string(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Compute (dr, dc) offsets relative to the anchor for all active cells
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        match self {
            StructuringElement::Ellipse { width, height } => ellipse_offsets(*width, *height),
            StructuringElement::Square(r) => Neighborhood::Square(*r).offsets(),
            StructuringElement::Disk(r) => Neighborhood::Circle(*r).offsets(),
            StructuringElement::Cross(r) => {
                let r = *r as isize;
                let mut offsets = Vec::new();
                for d in -r..=r {
                    offsets.push((d, 0)); // vertical arm
                    if d != 0 {
                        offsets.push((0, d)); // horizontal arm (skip center duplicate)
                    }
                }
                offsets
            }
        }
    }
}

/// Row spans of the digital ellipse: for row offset `dy` from the anchor the
/// half-width is `round(c * sqrt(1 - dy²/r²))`, with `r = height/2` and
/// `c = width/2`.
fn ellipse_offsets(width: usize, height: usize) -> Vec<(isize, isize)> {
    let r = (height / 2) as isize;
    let c = (width / 2) as isize;
    let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

    let mut offsets = Vec::new();
    for i in 0..height as isize {
        let dy = i - r;
        if dy.abs() > r {
            continue;
        }
        let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as isize;
        let first = (c - dx).max(0);
        let last = (c + dx).min(width as isize - 1);
        for j in first..=last {
            offsets.push((dy, j - c));
        }
    }
    offsets
}

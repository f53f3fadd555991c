//! 8-connected component labeling
//!
//! Components are numbered from 1 in raster-scan order of their first
//! pixel; label 0 is background.

use serde::Serialize;
use lakeseg_core::raster::{Neighborhood, Raster};
use lakeseg_core::{Mask, Result};

/// One 8-connected foreground region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedComponent {
    /// Label in the label raster, starting at 1
    pub id: u32,
    /// Pixel count
    pub area: usize,
    /// Leftmost column
    pub left: usize,
    /// Topmost row
    pub top: usize,
    pub width: usize,
    pub height: usize,
}

/// Label raster plus the component table
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    pub labels: Raster<u32>,
    /// Components ordered by id
    pub components: Vec<ConnectedComponent>,
}

impl ComponentLabels {
    /// Foreground exactly where the label equals `id`
    pub fn mask_for(&self, id: u32) -> Mask {
        let labels = self.labels.data();
        Mask::from_fn(self.labels.rows(), self.labels.cols(), |r, c| {
            id != 0 && labels[[r, c]] == id
        })
    }
}

/// Label the 8-connected foreground regions of a mask
pub fn label_components(mask: &Mask) -> Result<ComponentLabels> {
    let (rows, cols) = mask.shape();
    let mut labels: Raster<u32> = Raster::new(rows, cols);
    let mut components = Vec::new();
    let offsets = Neighborhood::Queen3x3.offsets_no_center();

    for r in 0..rows {
        for c in 0..cols {
            if !mask.is_foreground(r, c) || labels.get(r, c)? != 0 {
                continue;
            }

            let id = components.len() as u32 + 1;
            let (mut min_r, mut max_r, mut min_c, mut max_c) = (r, r, c, c);
            let mut area = 0;

            let mut queue = vec![(r, c)];
            labels.set(r, c, id)?;

            while let Some((cr, cc)) = queue.pop() {
                area += 1;
                min_r = min_r.min(cr);
                max_r = max_r.max(cr);
                min_c = min_c.min(cc);
                max_c = max_c.max(cc);

                for &(dr, dc) in &offsets {
                    let nr = cr as isize + dr;
                    let nc = cc as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if mask.is_foreground(nr, nc) && unsafe { labels.get_unchecked(nr, nc) } == 0 {
                        labels.set(nr, nc, id)?;
                        queue.push((nr, nc));
                    }
                }
            }

            components.push(ConnectedComponent {
                id,
                area,
                left: min_c,
                top: min_r,
                width: max_c - min_c + 1,
                height: max_r - min_r + 1,
            });
        }
    }

    Ok(ComponentLabels { labels, components })
}

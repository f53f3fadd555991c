//! Dominant component selection
//!
//! Large components near the left edge are preferred; the lake in a
//! typical shoreline photo fills the lower left of the frame.

use serde::{Deserialize, Serialize};

use super::labeling::ConnectedComponent;

/// Weights of the component score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    /// Weight of the image area share (default: 1.3)
    pub area: f64,
    /// Weight of the closeness of the left edge to column 0 (default: 0.9)
    pub left_edge: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            area: 1.3,
            left_edge: 0.9,
        }
    }
}

/// `area * area/total + left_edge * (1 - left/width)` for an image of
/// `rows × cols` pixels
pub fn score_component(
    component: &ConnectedComponent,
    rows: usize,
    cols: usize,
    weights: &ComponentWeights,
) -> f64 {
    let total = (rows * cols).max(1) as f64;
    let width = cols.max(1) as f64;
    weights.area * component.area as f64 / total
        + weights.left_edge * (1.0 - component.left as f64 / width)
}

/// Highest-scoring component; ties keep the lowest id
pub fn select_dominant<'a>(
    components: &'a [ConnectedComponent],
    rows: usize,
    cols: usize,
    weights: &ComponentWeights,
) -> Option<&'a ConnectedComponent> {
    let mut best: Option<(&ConnectedComponent, f64)> = None;
    for component in components {
        let score = score_component(component, rows, cols, weights);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((component, score));
        }
    }
    best.map(|(component, _)| component)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: u32, area: usize, left: usize) -> ConnectedComponent {
        ConnectedComponent {
            id,
            area,
            left,
            top: 0,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_score_formula() {
        let w = ComponentWeights::default();
        // 100 of 400 pixels, left edge at column 5 of 20
        let s = score_component(&component(1, 100, 5), 20, 20, &w);
        assert!((s - (1.3 * 0.25 + 0.9 * 0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_left_edge_can_beat_area() {
        let w = ComponentWeights::default();
        let comps = [component(1, 60, 18), component(2, 40, 0)];
        assert_eq!(select_dominant(&comps, 20, 20, &w).unwrap().id, 2);
    }

    #[test]
    fn test_tie_keeps_first() {
        let w = ComponentWeights::default();
        let comps = [component(1, 10, 2), component(2, 10, 2)];
        assert_eq!(select_dominant(&comps, 10, 10, &w).unwrap().id, 1);
        assert!(select_dominant(&[], 10, 10, &w).is_none());
    }
}

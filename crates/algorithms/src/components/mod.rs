//! Connected components of binary masks
//!
//! - **labeling**: 8-connected labeling with per-component bounding boxes
//! - **dominant**: component scoring and selection of the dominant region

mod dominant;
mod labeling;

pub use dominant::{score_component, select_dominant, ComponentWeights};
pub use labeling::{label_components, ComponentLabels, ConnectedComponent};

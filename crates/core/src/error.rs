//! Error types for LakeSeg

use std::fmt;
use thiserror::Error;

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FeatureExtraction,
    Clustering,
    ClusterScoring,
    VegetationSuppression,
    MaskRefinement,
    Description,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FeatureExtraction => "feature extraction",
            Stage::Clustering => "clustering",
            Stage::ClusterScoring => "cluster scoring",
            Stage::VegetationSuppression => "vegetation suppression",
            Stage::MaskRefinement => "mask refinement",
            Stage::Description => "image description",
        };
        f.write_str(name)
    }
}

/// Main error type for LakeSeg operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Grid size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Malformed or insufficient input for a stage
    #[error("Invalid input in {stage}: {reason}")]
    Input { stage: Stage, reason: String },

    /// A stage could not find what it was looking for
    #[error("Nothing found in {stage}: {reason}")]
    NotFound { stage: Stage, reason: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stage that failed, when the error is tied to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Input { stage, .. } | Error::NotFound { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias for LakeSeg operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_stage() {
        let err = Error::NotFound {
            stage: Stage::ClusterScoring,
            reason: "no cluster above 2% of the image".into(),
        };
        assert_eq!(
            err.to_string(),
            "Nothing found in cluster scoring: no cluster above 2% of the image"
        );
        assert_eq!(err.stage(), Some(Stage::ClusterScoring));
    }

    #[test]
    fn test_shape_errors_have_no_stage() {
        let err = Error::InvalidDimensions { width: 0, height: 3 };
        assert!(err.stage().is_none());
    }
}

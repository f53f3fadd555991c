//! # LakeSeg Core
//!
//! Core types and traits for the LakeSeg segmentation library.
//!
//! This crate provides:
//! - `PixelGrid`: decoded RGB image borrowed by the pipeline
//! - `Raster<T>`: generic single-channel grid
//! - `FeatureMap`: per-pixel feature vectors
//! - `Mask`: binary 255/0 masks
//! - Error taxonomy tagged with the failing pipeline stage
//! - Algorithm trait for a consistent API

pub mod error;
pub mod feature_map;
pub mod image;
pub mod mask;
pub mod raster;

pub use error::{Error, Result, Stage};
pub use feature_map::FeatureMap;
pub use image::{ChannelOrder, PixelGrid};
pub use mask::Mask;
pub use raster::{Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, Stage};
    pub use crate::feature_map::FeatureMap;
    pub use crate::image::PixelGrid;
    pub use crate::mask::Mask;
    pub use crate::raster::{Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in LakeSeg.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

//! Texture and smoothing filters
//!
//! - **Laplacian**: second-derivative edge response (texture energy)
//! - **Gaussian**: separable blur for denoising and spreading responses
//! - **GLCM**: whole-image Haralick properties for the image descriptor

mod edge;
mod glcm;
mod smoothing;

pub use edge::{laplacian, LaplacianKernel};
pub use glcm::{glcm_properties, Glcm, GlcmParams, GlcmProperty};
pub use smoothing::gaussian_blur;

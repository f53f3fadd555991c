//! Binary mathematical morphology on masks
//!
//! - **Erosion**: shrinks foreground regions
//! - **Dilation**: expands foreground regions
//! - **Opening**: erosion then dilation (removes small foreground features)
//! - **Closing**: dilation then erosion (fills small background gaps)

mod closing;
mod dilate;
mod element;
mod erode;
mod opening;

pub use closing::{closing, Closing, ClosingParams};
pub use dilate::{dilate, Dilate, DilateParams};
pub use element::StructuringElement;
pub use erode::{erode, Erode, ErodeParams};
pub use opening::{opening, Opening, OpeningParams};

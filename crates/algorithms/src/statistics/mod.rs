//! Order statistics over feature samples
//!
//! - **percentile**: linear-interpolation percentiles via O(n) selection

mod percentile;

pub use percentile::{median, percentile};

//! Numerical helpers shared by the conditioning pipeline.
//!
//! - [`rolling`]: trailing moving averages

pub mod rolling;

pub use rolling::{rolling_mean, rolling_mean_columns};

//! Mathematical utilities: goodness-of-fit statistics.

pub mod stats;

pub use stats::*;

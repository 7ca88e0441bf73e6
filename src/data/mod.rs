//! Measured data handling (BEES sweeps).

pub mod sweep;

pub use sweep::*;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model parameters (`Barrier`, `ModelParameters`)
//! - measured spectra (`BeesSweep`, `SweepMeta`, `BiasWindow`)
//! - fit outputs and run configuration (`FitQuality`, `ParamsFile`, `RunConfig`)

pub mod types;

pub use types::*;

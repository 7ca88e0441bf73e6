//! `beem-curves` library crate.
//!
//! Bell–Kaiser (V correction) model evaluation for Ballistic Electron Emission
//! Microscopy: predicted BEEM current against bias, and residuals for an
//! external least-squares routine.
//!
//! The binary (`beem`) is a thin wrapper around this library so that:
//!
//! - the model core is testable without spawning processes
//! - fitting scripts can call the evaluator directly (`models`)
//! - the flat-buffer call shapes live in one adapter module (`models::legacy`)

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

//! Input/output helpers.
//!
//! - sweep CSV ingest + validation (`ingest`)
//! - sweep + estimate export (`export`)
//! - params JSON read/write (`params`)

pub mod export;
pub mod ingest;
pub mod params;

pub use export::*;
pub use ingest::*;
pub use params::*;

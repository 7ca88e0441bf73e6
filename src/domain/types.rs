//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - decoded once at the buffer boundary and handed to the evaluator
//! - exported to JSON/CSV
//! - reloaded later by an external fitting routine

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One conduction channel: its threshold energy and transmission weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    /// Barrier height (eV). The channel is open for bias values below it.
    pub height: f64,
    /// Transmission coefficient.
    pub coefficient: f64,
}

impl Barrier {
    pub fn new(height: f64, coefficient: f64) -> Self {
        Self { height, coefficient }
    }
}

/// Ordered barriers. Evaluation always walks them in this order.
pub type BarrierSet = Vec<Barrier>;

/// Bell–Kaiser (V correction) parameters.
///
/// ```text
/// I(V) = noise + Σ_j  -a_j |V - Φ_j|^n / V      for V < Φ_j
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Constant baseline added to every sample.
    pub noise: f64,
    /// Power-law exponent `n` (2.0 in the classic model).
    pub exponent: f64,
    pub barriers: BarrierSet,
}

impl ModelParameters {
    pub fn new(noise: f64, exponent: f64, barriers: BarrierSet) -> Self {
        Self {
            noise,
            exponent,
            barriers,
        }
    }

    /// Number of barriers (`K`).
    pub fn barrier_count(&self) -> usize {
        self.barriers.len()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.barriers.iter().map(|b| b.height).collect()
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.barriers.iter().map(|b| b.coefficient).collect()
    }
}

/// Sweep direction of the bias ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn display_name(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }

    /// Numeric code used in grid exports (fwd=0, bwd=1).
    pub fn code(self) -> u8 {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }
}

/// Acquisition metadata carried alongside a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepMeta {
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,
    /// Sample name.
    pub sample: Option<String>,
    /// Device on the sample (e.g. `C3`).
    pub device: Option<String>,
    pub x_index: i64,
    pub y_index: i64,
    /// Sweep number within a pass.
    pub number: i64,
    pub pass_number: i64,
    pub direction: Direction,
    pub date: Option<String>,
    pub src_file: Option<PathBuf>,
}

impl Default for SweepMeta {
    fn default() -> Self {
        Self {
            pos_x: None,
            pos_y: None,
            sample: None,
            device: None,
            x_index: -1,
            y_index: -1,
            number: 1,
            pass_number: -1,
            direction: Direction::Forward,
            date: None,
            src_file: None,
        }
    }
}

/// A single BEES spectrum: BEEM current (and friends) against bias.
#[derive(Debug, Clone, PartialEq)]
pub struct BeesSweep {
    pub bias: Vec<f64>,
    pub i_beem: Vec<f64>,
    pub i_tunnel: Option<Vec<f64>>,
    pub pos_z: Option<Vec<f64>>,
    pub meta: SweepMeta,
}

impl BeesSweep {
    pub fn new(bias: Vec<f64>, i_beem: Vec<f64>) -> Self {
        Self {
            bias,
            i_beem,
            i_tunnel: None,
            pos_z: None,
            meta: SweepMeta::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.bias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bias.is_empty()
    }
}

/// Inclusive bias range of the samples that take part in a residual.
///
/// Either bound may be open (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BiasWindow {
    pub bias_min: Option<f64>,
    pub bias_max: Option<f64>,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Model family tag stored in params files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Bell–Kaiser with V correction.
    Bkv,
}

impl ModelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Bkv => "Bell-Kaiser (V correction)",
        }
    }
}

/// A saved parameter set (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsFile {
    pub tool: String,
    pub model: ModelKind,
    pub params: ModelParameters,
}

/// A full `beem residual` run as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_paths: Vec<PathBuf>,
    pub params: ModelParameters,
    pub window: BiasWindow,
    pub parallel: bool,

    /// Number of residual rows printed (0 prints none).
    pub table_rows: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
    pub export_params: Option<PathBuf>,

    pub debug: bool,
    pub debug_dir: PathBuf,
}

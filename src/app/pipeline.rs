//! Shared "residual pipeline" logic.
//!
//! load sweeps -> validate + combine -> windowed residual -> quality -> rows
//!
//! The CLI handler only deals with presentation (printing, plotting, exports).

use log::{debug, info};

use crate::data::{combine_mean, relative_transmission};
use crate::domain::{BeesSweep, FitQuality, RunConfig};
use crate::error::AppError;
use crate::io::ingest::{RowError, load_sweep};
use crate::math::fit_quality;
use crate::models::{compute, compute_par, compute_residual_windowed, compute_residual_windowed_par};
use crate::report::{SampleResidual, residual_rows};

/// All computed outputs of a single `beem residual` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Combined sweep (all samples).
    pub sweep: BeesSweep,
    pub sweeps_combined: usize,
    /// Model estimate for every sample of `sweep`.
    pub estimated: Vec<f64>,
    /// Samples inside the bias window.
    pub rows: Vec<SampleResidual>,
    pub quality: FitQuality,
    pub relative_transmission: Option<Vec<f64>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Execute the full pipeline from files.
pub fn run_residual(config: &RunConfig) -> Result<RunOutput, AppError> {
    if config.csv_paths.is_empty() {
        return Err(AppError::new(2, "At least one sweep CSV is required."));
    }

    let mut sweeps = Vec::with_capacity(config.csv_paths.len());
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    for path in &config.csv_paths {
        let ingested = load_sweep(path)?;
        rows_read += ingested.rows_read;
        row_errors.extend(ingested.row_errors);
        sweeps.push(ingested.sweep);
    }

    let mut output = run_residual_with_sweeps(config, &sweeps)?;
    output.row_errors = row_errors;
    output.rows_read = rows_read;
    Ok(output)
}

/// Execute the pipeline on already loaded sweeps.
pub fn run_residual_with_sweeps(config: &RunConfig, sweeps: &[BeesSweep]) -> Result<RunOutput, AppError> {
    let sweep = combine_mean(sweeps)?;
    debug!("combined {} sweep(s) into {} samples", sweeps.len(), sweep.len());

    let params = &config.params;
    let n = params.exponent;

    let estimated = if config.parallel {
        compute_par(&sweep.bias, n, params)
    } else {
        compute(&sweep.bias, n, params)
    };

    let fitted = if config.parallel {
        compute_residual_windowed_par(params, &sweep.bias, &sweep.i_beem, n, &config.window)?
    } else {
        compute_residual_windowed(params, &sweep.bias, &sweep.i_beem, n, &config.window)?
    };
    if fitted.is_empty() {
        return Err(AppError::new(3, "No samples inside the bias window."));
    }

    let quality = fit_quality(&fitted.observed, &fitted.residual)?;
    info!(
        "n={} sse={:.6e} rmse={:.6e} r2={:.6}",
        quality.n, quality.sse, quality.rmse, quality.r_squared
    );

    let relative_transmission = relative_transmission(&params.coefficients(), sweep.i_tunnel.as_deref());
    let rows = residual_rows(&fitted.bias, &fitted.observed, &fitted.residual);

    Ok(RunOutput {
        sweep,
        sweeps_combined: sweeps.len(),
        estimated,
        rows,
        quality,
        relative_transmission,
        row_errors: Vec::new(),
        rows_read: 0,
    })
}

//! Residuals (predicted minus observed) for an external least-squares routine.
//!
//! The argument order mirrors what minimizers expect: parameters first, data after.

use rayon::prelude::*;

use crate::domain::{BiasWindow, ModelParameters};
use crate::error::ModelError;
use crate::models::bell_kaiser::{compute, compute_par};

fn check_lengths(bias: &[f64], observed: &[f64]) -> Result<(), ModelError> {
    if observed.len() != bias.len() {
        return Err(ModelError::ShapeMismatch {
            expected: bias.len(),
            actual: observed.len(),
        });
    }
    Ok(())
}

/// `predicted_i - observed_i` for every sample.
///
/// Lengths are validated before any arithmetic; a mismatch is never truncated
/// or padded.
pub fn compute_residual(
    params: &ModelParameters,
    bias: &[f64],
    observed: &[f64],
    exponent: f64,
) -> Result<Vec<f64>, ModelError> {
    check_lengths(bias, observed)?;

    let mut residual = compute(bias, exponent, params);
    for (r, &o) in residual.iter_mut().zip(observed) {
        *r -= o;
    }
    Ok(residual)
}

/// Parallel variant of [`compute_residual`]; identical output.
pub fn compute_residual_par(
    params: &ModelParameters,
    bias: &[f64],
    observed: &[f64],
    exponent: f64,
) -> Result<Vec<f64>, ModelError> {
    check_lengths(bias, observed)?;

    let mut residual = compute_par(bias, exponent, params);
    residual
        .par_iter_mut()
        .zip(observed.par_iter())
        .for_each(|(r, &o)| *r -= o);
    Ok(residual)
}

/// Samples inside a bias window with their residuals.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedResidual {
    pub bias: Vec<f64>,
    pub observed: Vec<f64>,
    pub residual: Vec<f64>,
}

impl WindowedResidual {
    pub fn len(&self) -> usize {
        self.bias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bias.is_empty()
    }
}

/// Residual restricted to the samples whose bias lies inside `window`.
///
/// Selected samples keep their input order.
pub fn compute_residual_windowed(
    params: &ModelParameters,
    bias: &[f64],
    observed: &[f64],
    exponent: f64,
    window: &BiasWindow,
) -> Result<WindowedResidual, ModelError> {
    let (bias, observed) = select_window(bias, observed, window)?;
    let residual = compute_residual(params, &bias, &observed, exponent)?;
    Ok(WindowedResidual { bias, observed, residual })
}

/// Parallel variant of [`compute_residual_windowed`]; identical output.
pub fn compute_residual_windowed_par(
    params: &ModelParameters,
    bias: &[f64],
    observed: &[f64],
    exponent: f64,
    window: &BiasWindow,
) -> Result<WindowedResidual, ModelError> {
    let (bias, observed) = select_window(bias, observed, window)?;
    let residual = compute_residual_par(params, &bias, &observed, exponent)?;
    Ok(WindowedResidual { bias, observed, residual })
}

fn select_window(
    bias: &[f64],
    observed: &[f64],
    window: &BiasWindow,
) -> Result<(Vec<f64>, Vec<f64>), ModelError> {
    check_lengths(bias, observed)?;
    Ok(window.indices(bias).into_iter().map(|i| (bias[i], observed[i])).unzip())
}

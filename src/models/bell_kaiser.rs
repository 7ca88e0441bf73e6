//! Bell–Kaiser (V correction) model evaluation.
//!
//! For every bias sample `V` the predicted BEEM current is
//!
//! ```text
//! I(V) = noise + Σ_j  -a_j |V - Φ_j|^n / V     (only barriers with V < Φ_j)
//! ```
//!
//! Numerical notes:
//! - Barriers are accumulated in the order they are supplied; reordering changes
//!   the result by round-off only, but reproducing reference outputs bit-for-bit
//!   needs a fixed order.
//! - `n == 2.0` takes a multiply-only path (`k * k`); the sign of `k` cancels so
//!   no `abs` is needed.
//! - Nothing is guarded: `V == 0` with an open channel gives `±Inf`/`NaN`, and a
//!   fractional exponent never sees a negative base because of the `abs`.

use rayon::prelude::*;

use crate::domain::ModelParameters;
use crate::error::ModelError;

/// Predicted current for a single bias value.
#[inline]
pub fn compute_sample(bias: f64, exponent: f64, params: &ModelParameters) -> f64 {
    let mut current = params.noise;

    if exponent == 2.0 {
        for barrier in &params.barriers {
            if bias < barrier.height {
                let k = bias - barrier.height;
                current += -barrier.coefficient * k * k / bias;
            }
        }
    } else {
        for barrier in &params.barriers {
            if bias < barrier.height {
                current += -barrier.coefficient * (bias - barrier.height).abs().powf(exponent) / bias;
            }
        }
    }

    current
}

/// Evaluate the model over a bias sequence.
///
/// The returned vector has the same length as `bias`.
pub fn compute(bias: &[f64], exponent: f64, params: &ModelParameters) -> Vec<f64> {
    bias.iter()
        .map(|&b| compute_sample(b, exponent, params))
        .collect()
}

/// Evaluate the model into a caller-owned buffer.
pub fn compute_into(
    bias: &[f64],
    exponent: f64,
    params: &ModelParameters,
    out: &mut [f64],
) -> Result<(), ModelError> {
    if out.len() != bias.len() {
        return Err(ModelError::ShapeMismatch {
            expected: bias.len(),
            actual: out.len(),
        });
    }
    for (slot, &b) in out.iter_mut().zip(bias) {
        *slot = compute_sample(b, exponent, params);
    }
    Ok(())
}

/// Parallel evaluation over samples.
///
/// Samples are independent, so this is bit-identical to [`compute`].
pub fn compute_par(bias: &[f64], exponent: f64, params: &ModelParameters) -> Vec<f64> {
    bias.par_iter()
        .map(|&b| compute_sample(b, exponent, params))
        .collect()
}

impl ModelParameters {
    /// Evaluate with the exponent stored in the parameter set.
    pub fn predict(&self, bias: &[f64]) -> Vec<f64> {
        compute(bias, self.exponent, self)
    }
}

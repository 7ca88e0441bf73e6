//! Goodness-of-fit helpers.
//!
//! Non-finite values are not filtered: a `NaN` residual makes the SSE `NaN`,
//! which is what a caller comparing fits should see.

use crate::domain::FitQuality;
use crate::error::ModelError;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of squared residuals.
pub fn sse(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

pub fn rmse(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return f64::NAN;
    }
    (sse(residuals) / residuals.len() as f64).sqrt()
}

/// Coefficient of determination `1 - SSE / SST`.
///
/// Returns `NaN` for empty input; a constant `sampled` series gives `-Inf`/`NaN`.
pub fn r_squared(sampled: &[f64], estimated: &[f64]) -> Result<f64, ModelError> {
    if sampled.len() != estimated.len() {
        return Err(ModelError::ShapeMismatch {
            expected: sampled.len(),
            actual: estimated.len(),
        });
    }
    if sampled.is_empty() {
        return Ok(f64::NAN);
    }

    let m = mean(sampled);
    let sse: f64 = sampled
        .iter()
        .zip(estimated)
        .map(|(s, e)| (s - e) * (s - e))
        .sum();
    let sst: f64 = sampled.iter().map(|s| (s - m) * (s - m)).sum();
    Ok(1.0 - sse / sst)
}

/// Bundle SSE / RMSE / R² for observed values and their residuals.
pub fn fit_quality(observed: &[f64], residuals: &[f64]) -> Result<FitQuality, ModelError> {
    if observed.len() != residuals.len() {
        return Err(ModelError::ShapeMismatch {
            expected: observed.len(),
            actual: residuals.len(),
        });
    }
    // residual = predicted - observed
    let estimated: Vec<f64> = observed.iter().zip(residuals).map(|(o, r)| o + r).collect();
    Ok(FitQuality {
        sse: sse(residuals),
        rmse: rmse(residuals),
        r_squared: r_squared(observed, &estimated)?,
        n: residuals.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_estimate_has_unit_r_squared() {
        let y = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(r_squared(&y, &y).unwrap(), 1.0);
    }

    #[test]
    fn mean_estimate_has_zero_r_squared() {
        let y = [1.0, 2.0, 3.0];
        assert!((r_squared(&y, &[2.0, 2.0, 2.0]).unwrap()).abs() < 1e-15);
    }

    #[test]
    fn r_squared_rejects_mismatch_and_handles_empty() {
        assert!(r_squared(&[1.0], &[]).is_err());
        assert!(r_squared(&[], &[]).unwrap().is_nan());
    }

    #[test]
    fn sse_and_rmse() {
        let r = [3.0, -4.0];
        assert_eq!(sse(&r), 25.0);
        assert!((rmse(&r) - (12.5_f64).sqrt()).abs() < 1e-15);
        assert!(rmse(&[]).is_nan());
    }

    #[test]
    fn quality_from_residuals() {
        let observed = [1.0, 2.0, 3.0];
        let q = fit_quality(&observed, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(q.sse, 0.0);
        assert_eq!(q.r_squared, 1.0);
        assert_eq!(q.n, 3);
    }
}

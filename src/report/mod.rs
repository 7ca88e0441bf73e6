//! Reporting utilities: per-sample residual rows and formatted terminal output.

pub mod format;

pub use format::*;

/// One evaluated sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResidual {
    pub bias: f64,
    pub observed: f64,
    pub predicted: f64,
    pub residual: f64,
}

/// Zip the evaluated arrays into rows.
///
/// All slices are expected to have the same length; extra values are ignored.
pub fn residual_rows(bias: &[f64], observed: &[f64], residual: &[f64]) -> Vec<SampleResidual> {
    bias.iter()
        .zip(observed)
        .zip(residual)
        .map(|((&bias, &observed), &residual)| SampleResidual {
            bias,
            observed,
            predicted: observed + residual,
            residual,
        })
        .collect()
}

/// Largest absolute residuals first (non-finite residuals sort to the front).
pub fn worst_residuals(rows: &[SampleResidual], top_n: usize) -> Vec<SampleResidual> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ka = if a.residual.is_finite() { a.residual.abs() } else { f64::INFINITY };
        let kb = if b.residual.is_finite() { b.residual.abs() } else { f64::INFINITY };
        kb.partial_cmp(&ka).unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_residuals_sorted_by_magnitude() {
        let rows = residual_rows(&[1.0, 2.0, 3.0, 4.0], &[0.0; 4], &[0.1, -5.0, 2.0, f64::NAN]);
        let worst = worst_residuals(&rows, 3);
        assert_eq!(worst.len(), 3);
        assert!(worst[0].residual.is_nan());
        assert_eq!(worst[1].bias, 2.0);
        assert_eq!(worst[2].bias, 3.0);
    }
}

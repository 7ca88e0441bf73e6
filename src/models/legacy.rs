//! Adapters for the flat-buffer call shapes.
//!
//! External fitters pass parameters as one flat vector:
//!
//! ```text
//! [noise, h_1, .., h_K, a_1, .., a_K]      K = (len - 1) / 2   (floor)
//! ```
//!
//! with the exponent passed separately. These adapters decode that layout once
//! into [`ModelParameters`] and hand off to the canonical evaluator; 1-D slices,
//! `nalgebra` vectors and shape-preserving matrices all go through the same path.
//!
//! An odd number of values after the noise term leaves one coefficient without a
//! height. The lenient decoder drops it (and logs a warning), which is what
//! existing fitting scripts rely on; [`decode_flat_strict`] rejects it instead.

use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::domain::{Barrier, ModelParameters};
use crate::error::ModelError;
use crate::models::bell_kaiser::compute;
use crate::models::residual::compute_residual;

/// Decode a flat parameter vector, truncating an unpaired trailing value.
pub fn decode_flat(flat: &[f64], exponent: f64) -> Result<ModelParameters, ModelError> {
    let Some((&noise, rest)) = flat.split_first() else {
        return Err(ModelError::MalformedParameters { len: 0 });
    };

    let k = rest.len() / 2;
    if rest.len() % 2 != 0 {
        warn!(
            "flat parameter vector of length {} is unbalanced; ignoring trailing value {}",
            flat.len(),
            rest[rest.len() - 1]
        );
    }

    let (heights, coefficients) = rest.split_at(k);
    let barriers = heights
        .iter()
        .zip(&coefficients[..k])
        .map(|(&height, &coefficient)| Barrier { height, coefficient })
        .collect();

    Ok(ModelParameters::new(noise, exponent, barriers))
}

/// Decode a flat parameter vector, rejecting an unbalanced layout.
pub fn decode_flat_strict(flat: &[f64], exponent: f64) -> Result<ModelParameters, ModelError> {
    if flat.is_empty() || (flat.len() - 1) % 2 != 0 {
        return Err(ModelError::MalformedParameters { len: flat.len() });
    }
    decode_flat(flat, exponent)
}

/// Inverse of [`decode_flat`]. The exponent is not part of the layout.
pub fn encode_flat(params: &ModelParameters) -> Vec<f64> {
    let mut flat = Vec::with_capacity(1 + 2 * params.barrier_count());
    flat.push(params.noise);
    flat.extend(params.barriers.iter().map(|b| b.height));
    flat.extend(params.barriers.iter().map(|b| b.coefficient));
    flat
}

/// Model evaluation with the flat call shape `(bias, n, params)`.
pub fn bell_kaiser_v(bias: &[f64], n: f64, flat: &[f64]) -> Result<Vec<f64>, ModelError> {
    let params = decode_flat(flat, n)?;
    Ok(compute(bias, n, &params))
}

/// Residual with the flat call shape `(params, bias, observed, n)`.
pub fn residu_bell_kaiser_v(
    flat: &[f64],
    bias: &[f64],
    observed: &[f64],
    n: f64,
) -> Result<Vec<f64>, ModelError> {
    let params = decode_flat(flat, n)?;
    compute_residual(&params, bias, observed, n)
}

pub fn bell_kaiser_v_vector(bias: &DVector<f64>, n: f64, flat: &[f64]) -> Result<DVector<f64>, ModelError> {
    let out = bell_kaiser_v(bias.as_slice(), n, flat)?;
    Ok(DVector::from_vec(out))
}

/// Evaluate every element of `bias`; the output has the same shape.
pub fn bell_kaiser_v_matrix(bias: &DMatrix<f64>, n: f64, flat: &[f64]) -> Result<DMatrix<f64>, ModelError> {
    // Storage is contiguous column-major and the model is elementwise, so the
    // layout carries over unchanged.
    let out = bell_kaiser_v(bias.as_slice(), n, flat)?;
    Ok(DMatrix::from_vec(bias.nrows(), bias.ncols(), out))
}

pub fn residu_bell_kaiser_v_matrix(
    flat: &[f64],
    bias: &DMatrix<f64>,
    observed: &DMatrix<f64>,
    n: f64,
) -> Result<DMatrix<f64>, ModelError> {
    if bias.shape() != observed.shape() {
        return Err(ModelError::ShapeMismatch {
            expected: bias.len(),
            actual: observed.len(),
        });
    }
    let out = residu_bell_kaiser_v(flat, bias.as_slice(), observed.as_slice(), n)?;
    Ok(DMatrix::from_vec(bias.nrows(), bias.ncols(), out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_splits_heights_and_coefficients() {
        let p = decode_flat(&[1e-9, -0.8, -1.1, 0.001, 0.002], 2.0).unwrap();
        assert_eq!(p.noise, 1e-9);
        assert_eq!(p.exponent, 2.0);
        assert_eq!(p.barriers, vec![Barrier::new(-0.8, 0.001), Barrier::new(-1.1, 0.002)]);
    }

    #[test]
    fn decode_noise_only() {
        let p = decode_flat(&[0.5], 2.0).unwrap();
        assert_eq!(p.barrier_count(), 0);
        assert_eq!(p.noise, 0.5);
    }

    #[test]
    fn decode_truncates_unpaired_value() {
        // 4 values after noise would be 2 barriers; 3 values is 1 barrier and a leftover.
        let p = decode_flat(&[0.1, 3.0, 2.0, 9.0], 2.0).unwrap();
        assert_eq!(p.barriers, vec![Barrier::new(3.0, 2.0)]);
    }

    #[test]
    fn decode_empty_is_malformed() {
        assert_eq!(
            decode_flat(&[], 2.0).unwrap_err(),
            ModelError::MalformedParameters { len: 0 }
        );
    }

    #[test]
    fn strict_decode_rejects_unbalanced() {
        assert_eq!(
            decode_flat_strict(&[0.1, 3.0, 2.0, 9.0], 2.0).unwrap_err(),
            ModelError::MalformedParameters { len: 4 }
        );
        assert!(decode_flat_strict(&[0.1, 3.0, 2.0], 2.0).is_ok());
    }

    #[test]
    fn encode_restores_layout() {
        let flat = vec![1e-9, -0.8, -1.1, 0.001, 0.002];
        assert_eq!(encode_flat(&decode_flat(&flat, 2.0).unwrap()), flat);
    }

    #[test]
    fn flat_adapter_matches_reference() {
        let out = bell_kaiser_v(&[1.0, 5.0, 10.0], 2.0, &[0.1, 3.0, 2.0]).unwrap();
        assert!((out[0] - -7.9).abs() < 1e-12);
        assert_eq!(&out[1..], &[0.1, 0.1]);
    }

    #[test]
    fn flat_residual_rejects_mismatch() {
        let err = residu_bell_kaiser_v(&[0.1, 3.0, 2.0], &[1.0, 5.0, 10.0], &[0.0, 0.0], 2.0).unwrap_err();
        assert_eq!(err, ModelError::ShapeMismatch { expected: 3, actual: 2 });
    }

    #[test]
    fn matrix_adapter_preserves_shape() {
        let bias = DMatrix::from_row_slice(2, 3, &[1.0, 5.0, 10.0, 2.0, 3.0, 0.5]);
        let out = bell_kaiser_v_matrix(&bias, 2.0, &[0.1, 3.0, 2.0]).unwrap();
        assert_eq!(out.shape(), (2, 3));
        for (i, j) in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)] {
            let expected = bell_kaiser_v(&[bias[(i, j)]], 2.0, &[0.1, 3.0, 2.0]).unwrap()[0];
            assert_eq!(out[(i, j)], expected);
        }
    }

    #[test]
    fn matrix_residual_rejects_shape_mismatch() {
        let bias = DMatrix::from_element(2, 3, 1.0);
        let observed = DMatrix::from_element(3, 2, 1.0);
        assert!(residu_bell_kaiser_v_matrix(&[0.1, 3.0, 2.0], &bias, &observed, 2.0).is_err());

        let observed = DMatrix::from_element(2, 3, -7.9);
        let r = residu_bell_kaiser_v_matrix(&[0.1, 3.0, 2.0], &bias, &observed, 2.0).unwrap();
        assert!(r.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn vector_adapter() {
        let bias = DVector::from_vec(vec![1.0, 5.0]);
        let out = bell_kaiser_v_vector(&bias, 2.0, &[0.1, 3.0, 2.0]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], 0.1);
    }
}

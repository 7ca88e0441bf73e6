//! Working with measured BEES sweeps: validation, averaging repeats, bias windows, ids.

use crate::domain::{BeesSweep, BiasWindow, SweepMeta};
use crate::error::ModelError;
use crate::math::mean;

impl BiasWindow {
    pub fn new(bias_min: Option<f64>, bias_max: Option<f64>) -> Self {
        Self { bias_min, bias_max }
    }

    /// Inclusive on both ends; an open bound accepts everything on that side.
    pub fn contains(&self, bias: f64) -> bool {
        self.bias_min.is_none_or(|lo| bias >= lo) && self.bias_max.is_none_or(|hi| bias <= hi)
    }

    /// Indices of the samples inside the window, in input order.
    pub fn indices(&self, bias: &[f64]) -> Vec<usize> {
        bias.iter()
            .enumerate()
            .filter(|(_, b)| self.contains(**b))
            .map(|(i, _)| i)
            .collect()
    }
}

impl BeesSweep {
    /// Every channel must have one value per bias sample.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.bias.len();
        let channels = [Some(&self.i_beem), self.i_tunnel.as_ref(), self.pos_z.as_ref()];
        for len in channels.into_iter().flatten().map(Vec::len) {
            if len != n {
                return Err(ModelError::ShapeMismatch { expected: n, actual: len });
            }
        }
        Ok(())
    }
}

/// Average repeated sweeps sample by sample.
///
/// The bias of the first sweep is kept. Optional channels are averaged only when
/// every sweep carries them. Metadata survives when all sweeps agree, otherwise
/// the default is used.
pub fn combine_mean(sweeps: &[BeesSweep]) -> Result<BeesSweep, ModelError> {
    let Some(first) = sweeps.first() else {
        return Err(ModelError::ShapeMismatch { expected: 1, actual: 0 });
    };
    let n = first.len();
    for s in sweeps {
        s.validate()?;
        if s.len() != n {
            return Err(ModelError::ShapeMismatch { expected: n, actual: s.len() });
        }
    }
    if sweeps.len() == 1 {
        return Ok(first.clone());
    }

    let i_beem = mean_columns(sweeps.iter().map(|s| s.i_beem.as_slice()), n)?;
    let i_tunnel = match sweeps.iter().map(|s| s.i_tunnel.as_deref()).collect::<Option<Vec<_>>>() {
        Some(cols) => Some(mean_columns(cols.into_iter(), n)?),
        None => None,
    };
    let pos_z = match sweeps.iter().map(|s| s.pos_z.as_deref()).collect::<Option<Vec<_>>>() {
        Some(cols) => Some(mean_columns(cols.into_iter(), n)?),
        None => None,
    };

    let meta = if sweeps.iter().all(|s| s.meta == first.meta) {
        first.meta.clone()
    } else {
        SweepMeta::default()
    };

    Ok(BeesSweep {
        bias: first.bias.clone(),
        i_beem,
        i_tunnel,
        pos_z,
        meta,
    })
}

fn mean_columns<'a>(columns: impl Iterator<Item = &'a [f64]>, n: usize) -> Result<Vec<f64>, ModelError> {
    let mut sum = vec![0.0; n];
    let mut count = 0usize;
    for col in columns {
        if col.len() != n {
            return Err(ModelError::ShapeMismatch {
                expected: n,
                actual: col.len(),
            });
        }
        for (acc, v) in sum.iter_mut().zip(col) {
            *acc += v;
        }
        count += 1;
    }
    Ok(sum.into_iter().map(|s| s / count as f64).collect())
}

/// Transmission coefficients normalized by the mean tunnel current.
pub fn relative_transmission(coefficients: &[f64], i_tunnel: Option<&[f64]>) -> Option<Vec<f64>> {
    let tunnel = i_tunnel?;
    if tunnel.is_empty() {
        return None;
    }
    let m = mean(tunnel);
    Some(coefficients.iter().map(|a| a / m).collect())
}

impl SweepMeta {
    /// Stable text id: `xxx_yyy_pass_sweep_dir`.
    pub fn id(&self) -> String {
        format!(
            "{:03}_{:03}_{:03}_{:03}_{:02}",
            self.x_index,
            self.y_index,
            self.pass_number,
            self.number,
            self.direction.code()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(i_beem: Vec<f64>) -> BeesSweep {
        BeesSweep::new(vec![-1.0, -0.5, 0.0], i_beem)
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = BiasWindow::new(Some(-1.0), Some(0.0));
        assert!(w.contains(-1.0));
        assert!(w.contains(0.0));
        assert!(!w.contains(0.1));
        assert!(BiasWindow::default().contains(f64::MAX));
        assert_eq!(w.indices(&[-2.0, -1.0, -0.5, 0.5]), vec![1, 2]);
    }

    #[test]
    fn combine_mean_averages_samples() {
        let mut a = sweep(vec![1.0, 2.0, 3.0]);
        let mut b = sweep(vec![3.0, 4.0, 5.0]);
        a.i_tunnel = Some(vec![10.0, 10.0, 10.0]);
        b.i_tunnel = Some(vec![20.0, 20.0, 20.0]);
        b.meta.number = 2;

        let c = combine_mean(&[a, b]).unwrap();
        assert_eq!(c.i_beem, vec![2.0, 3.0, 4.0]);
        assert_eq!(c.i_tunnel, Some(vec![15.0, 15.0, 15.0]));
        assert_eq!(c.pos_z, None);
        assert_eq!(c.meta, SweepMeta::default());
    }

    #[test]
    fn combine_mean_rejects_different_lengths() {
        let a = sweep(vec![1.0, 2.0, 3.0]);
        let b = BeesSweep::new(vec![0.0, 1.0], vec![1.0, 1.0]);
        assert_eq!(
            combine_mean(&[a, b]).unwrap_err(),
            ModelError::ShapeMismatch { expected: 3, actual: 2 }
        );
        assert!(combine_mean(&[]).is_err());
    }

    #[test]
    fn single_sweep_channels_must_match_bias() {
        let longer = BeesSweep::new(vec![1.0, 5.0, 10.0], vec![0.0, 0.0, 0.0, 99.0]);
        assert_eq!(
            combine_mean(&[longer]).unwrap_err(),
            ModelError::ShapeMismatch { expected: 3, actual: 4 }
        );

        let shorter = BeesSweep::new(vec![1.0, 5.0, 10.0], vec![0.0, 0.0]);
        assert_eq!(
            combine_mean(&[shorter]).unwrap_err(),
            ModelError::ShapeMismatch { expected: 3, actual: 2 }
        );

        let mut tunnel = sweep(vec![1.0, 2.0, 3.0]);
        tunnel.i_tunnel = Some(vec![1.0]);
        assert_eq!(
            tunnel.validate().unwrap_err(),
            ModelError::ShapeMismatch { expected: 3, actual: 1 }
        );
        assert!(combine_mean(&[tunnel]).is_err());

        let mut z = sweep(vec![1.0, 2.0, 3.0]);
        z.pos_z = Some(vec![0.0; 5]);
        assert!(z.validate().is_err());
        assert!(sweep(vec![1.0, 2.0, 3.0]).validate().is_ok());
    }

    #[test]
    fn relative_transmission_uses_mean_tunnel_current() {
        let r = relative_transmission(&[0.002, 0.004], Some(&[1.0, 3.0][..])).unwrap();
        assert_eq!(r, vec![0.001, 0.002]);
        assert!(relative_transmission(&[0.002], None).is_none());
    }

    #[test]
    fn meta_id_is_zero_padded() {
        let meta = SweepMeta {
            x_index: 3,
            y_index: 12,
            pass_number: 1,
            number: 4,
            ..SweepMeta::default()
        };
        assert_eq!(meta.id(), "003_012_001_004_00");

        let backward = SweepMeta {
            direction: crate::domain::Direction::Backward,
            ..meta
        };
        assert_eq!(backward.id(), "003_012_001_004_01");
    }
}

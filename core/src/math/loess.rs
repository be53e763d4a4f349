//! Locally weighted polynomial smoothing over sample indices.
//!
//! Wraps the `loess-rs` batch fitter: tri-cube kernel, direct local fits with
//! no robustness passes, degree ≤ 2. The nominal neighbourhood is
//! `q = round(1 / fraction)` samples and is handed to the fitter as the
//! fraction `q / n` of the sequence.
//!
//! Sequences shorter than the nominal window shrink the neighbourhood and the
//! local degree. Output for such sequences is deterministic but not otherwise
//! validated.

use crate::prelude::{CompareError, CompareResult};
use loess_rs::prelude::{Batch, Constant, Direct, Linear, Loess, NoBoundary, Quadratic, Tricube};

/// Low-pass LOESS filter used to isolate the slow component of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct LoessSmoother {
    fraction: f64,
    degree: usize,
}

impl LoessSmoother {
    pub const MAX_DEGREE: usize = 2;

    pub fn new(fraction: f64) -> CompareResult<Self> {
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(CompareError::InvalidConfig(format!(
                "smoothing fraction must lie in (0, 1], got {}",
                fraction
            )));
        }
        Ok(Self {
            fraction,
            degree: Self::MAX_DEGREE,
        })
    }

    pub fn from_window_days(window_days: f64) -> CompareResult<Self> {
        Self::new(1.0 / window_days)
    }

    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree.min(Self::MAX_DEGREE);
        self
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Nominal neighbourhood size in samples.
    pub fn span(&self) -> usize {
        ((1.0 / self.fraction).round() as usize).max(1)
    }

    pub fn smooth(&self, values: &[f64]) -> CompareResult<Vec<f64>> {
        let n = values.len();
        if n < 2 {
            return Ok(values.to_vec());
        }
        // The farthest neighbour gets zero weight, so keep one spare point.
        let q = self.span().max(self.degree + 2).min(n);
        let degree = self.degree.min(q - 2);

        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let builder = Loess::new()
            .fraction(q as f64 / n as f64)
            .iterations(0)
            .weight_function(Tricube)
            .surface_mode(Direct)
            .boundary_policy(NoBoundary);
        let builder = match degree {
            0 => builder.degree(Constant),
            1 => builder.degree(Linear),
            _ => builder.degree(Quadratic),
        };

        let fit = builder
            .adapter(Batch)
            .build()
            .and_then(|model| model.fit(&x, values))
            .map_err(|err| {
                CompareError::Alignment(format!("loess fit over {} samples failed: {}", n, err))
            })?;
        Ok(fit.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_invalid_fraction() {
        assert!(LoessSmoother::new(0.0).is_err());
        assert!(LoessSmoother::new(1.5).is_err());
        assert!(LoessSmoother::from_window_days(7.0).is_ok());
    }

    #[test]
    fn preserves_length_and_constants() {
        let smoother = LoessSmoother::from_window_days(7.0).unwrap();
        let values = vec![2.5; 20];
        let out = smoother.smooth(&values).unwrap();
        assert_eq!(out.len(), 20);
        for v in out {
            assert_relative_eq!(v, 2.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn reproduces_linear_trend() {
        let smoother = LoessSmoother::from_window_days(7.0).unwrap();
        let values: Vec<f64> = (0..15).map(|i| 0.5 * i as f64 - 3.0).collect();
        let out = smoother.smooth(&values).unwrap();
        for (a, b) in out.iter().zip(&values) {
            assert_relative_eq!(a, b, epsilon = 1e-8);
        }
    }

    #[test]
    fn damps_alternating_noise() {
        let smoother = LoessSmoother::from_window_days(7.0).unwrap();
        let values: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let out = smoother.smooth(&values).unwrap();
        let inner_peak = out[5..25].iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!(inner_peak < 1.0);
    }

    #[test]
    fn short_sequences_do_not_fail() {
        let smoother = LoessSmoother::from_window_days(7.0).unwrap();
        assert!(smoother.smooth(&[]).unwrap().is_empty());
        assert_eq!(smoother.smooth(&[4.0]).unwrap(), vec![4.0]);
        assert_eq!(smoother.smooth(&[1.0, 3.0]).unwrap().len(), 2);
        assert_eq!(smoother.smooth(&[1.0, 3.0, 2.0]).unwrap().len(), 3);
    }

    #[test]
    fn smoothing_is_deterministic() {
        let smoother = LoessSmoother::from_window_days(7.0).unwrap();
        let values: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).sin() * 3.0).collect();
        assert_eq!(smoother.smooth(&values).unwrap(), smoother.smooth(&values).unwrap());
    }

    #[test]
    fn fitter_errors_surface_as_alignment_errors() {
        let smoother = LoessSmoother::from_window_days(7.0).unwrap();
        let values = vec![1.0, f64::NAN, 2.0, 3.0, 1.5];
        assert!(matches!(smoother.smooth(&values), Err(CompareError::Alignment(_))));
    }
}

//! Gaussian density curves for node display.
//!
//! Every node box shows the probability density of its variable. The curve
//! is a fixed-size list of `(q, p)` samples spanning ±3.5 standard
//! deviations around the mean, regenerated wholesale whenever the node's
//! parameters change.

use serde::{Deserialize, Serialize};

/// Number of samples in every density curve.
pub const SAMPLE_COUNT: usize = 101;

/// Half-width of the sampled domain, in standard deviations.
pub const DOMAIN_SPAN: f64 = 3.5;

/// Standard deviation used to display an observed (pinned) variable.
pub const OBSERVED_SIGMA: f64 = 0.5;

/// Smallest standard deviation a curve is sampled with.
pub const MIN_SIGMA: f64 = 1e-6;

/// A single sample of a density curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    /// Value of the random variable.
    pub q: f64,
    /// Probability density at `q`.
    pub p: f64,
}

/// Normal probability density function.
pub fn gaussian(q: f64, mean: f64, sigma: f64) -> f64 {
    let z = (q - mean) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * std::f64::consts::PI).sqrt())
}

/// The standard deviation a node's curve is drawn with.
pub fn effective_sigma(sigma: f64, observed: bool) -> f64 {
    if observed {
        OBSERVED_SIGMA
    } else {
        sigma
    }
}

/// Samples a Gaussian density over `[mean - 3.5σ, mean + 3.5σ]`.
///
/// Returns exactly [`SAMPLE_COUNT`] points in ascending `q` order.
/// A non-finite or non-positive `sigma` is clamped to [`MIN_SIGMA`].
pub fn density_curve(mean: f64, sigma: f64) -> Vec<DensityPoint> {
    let sigma = if sigma.is_finite() && sigma > MIN_SIGMA {
        sigma
    } else {
        MIN_SIGMA
    };

    let lower = mean - DOMAIN_SPAN * sigma;
    let upper = mean + DOMAIN_SPAN * sigma;
    let step = (upper - lower) / (SAMPLE_COUNT - 1) as f64;

    let mut data: Vec<DensityPoint> = (0..SAMPLE_COUNT)
        .map(|i| {
            let q = lower + i as f64 * step;
            DensityPoint {
                q,
                p: gaussian(q, mean, sigma),
            }
        })
        .collect();

    data.sort_by(|a, b| a.q.total_cmp(&b.q));
    data
}

/// The `[first q, last q]` domain of a curve, if it has any samples.
pub fn curve_domain(data: &[DensityPoint]) -> Option<(f64, f64)> {
    Some((data.first()?.q, data.last()?.q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_gaussian_standard_normal_peak() {
        let peak = gaussian(0.0, 0.0, 1.0);
        assert!((peak - 0.398_942_280_4).abs() < 1e-9);
    }

    #[test]
    fn test_effective_sigma() {
        assert_eq!(effective_sigma(3.0, false), 3.0);
        assert_eq!(effective_sigma(3.0, true), OBSERVED_SIGMA);
    }

    #[test]
    fn test_curve_domain_and_step() {
        let data = density_curve(10.0, 2.0);
        assert_eq!(data.len(), SAMPLE_COUNT);
        assert!((data[0].q - 3.0).abs() < 1e-9);
        assert!((data[SAMPLE_COUNT - 1].q - 17.0).abs() < 1e-9);
        assert!((data[1].q - data[0].q - 0.14).abs() < 1e-9);
        // Middle sample sits on the mean
        assert!((data[50].q - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sigma_is_clamped() {
        let data = density_curve(1.0, 0.0);
        assert_eq!(data.len(), SAMPLE_COUNT);
        assert!(data.iter().all(|d| d.q.is_finite() && d.p.is_finite()));
    }

    #[test]
    fn test_curve_domain_empty() {
        assert_eq!(curve_domain(&[]), None);
        let data = density_curve(0.0, 1.0);
        let (lo, hi) = curve_domain(&data).unwrap();
        assert!((lo + 3.5).abs() < 1e-9);
        assert!((hi - 3.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn curve_is_sorted_with_fixed_cardinality(mean in -1e3f64..1e3, sigma in 1e-3f64..1e3) {
            let data = density_curve(mean, sigma);
            prop_assert_eq!(data.len(), SAMPLE_COUNT);
            prop_assert!(data.windows(2).all(|w| w[0].q <= w[1].q));
        }

        #[test]
        fn gaussian_peaks_at_mean(mean in -1e3f64..1e3, sigma in 1e-2f64..1e2, k in 0.01f64..5.0) {
            let peak = gaussian(mean, mean, sigma);
            prop_assert!(peak > gaussian(mean + k * sigma, mean, sigma));
            prop_assert!(peak > gaussian(mean - k * sigma, mean, sigma));
        }
    }
}

//! One pass over every requested model.
//!
//! A study refits the same line once per strategy: baseline OLS first, then
//! each estimate-and-reweight fit in the declared strategy order. Any
//! failure aborts the whole study; partial results are never reported.

use crate::domain::{LineFit, WeightStrategy};
use crate::error::AppError;
use crate::fit::weights::estimate_weights;
use crate::math::{fit_line, weighted_line_fit};

/// One reweighted fit and everything that went into it.
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: WeightStrategy,
    pub weights: Vec<f64>,
    pub dispersion: Option<LineFit>,
    pub fit: LineFit,
    pub zero_weight_rows: Vec<usize>,
}

/// Baseline OLS plus the reweighted fits, in strategy order.
#[derive(Debug, Clone)]
pub struct Study {
    pub ols: LineFit,
    pub outcomes: Vec<StrategyOutcome>,
}

/// Fit the baseline and every requested strategy.
pub fn run_study(
    x: &[f64],
    y: &[f64],
    strategies: &[WeightStrategy],
) -> Result<Study, AppError> {
    let ols = fit_line(x, y)?;

    let mut outcomes = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        let estimate = estimate_weights(strategy, x, &ols)?;
        let wls = weighted_line_fit(x, y, &estimate.weights)?;
        outcomes.push(StrategyOutcome {
            strategy,
            weights: estimate.weights,
            dispersion: estimate.dispersion,
            fit: wls.line,
            zero_weight_rows: wls.zero_weight_rows,
        });
    }

    Ok(Study { ols, outcomes })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic heteroscedastic series: alternating sign, two noise
    /// amplitudes, magnitude proportional to the predictor.
    fn noisy_series(
        n: usize,
        x0: f64,
        x1: f64,
        icpt: f64,
        slope: f64,
        tau: f64,
    ) -> (Vec<f64>, Vec<f64>) {
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let xi = x0 + (x1 - x0) * i as f64 / (n as f64 - 1.0);
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let amp = if i % 4 < 2 { 1.0 } else { 0.55 };
            x.push(xi);
            y.push(icpt + slope * xi + sign * amp * tau * xi);
        }
        (x, y)
    }

    fn canonical() -> (Vec<f64>, Vec<f64>) {
        noisy_series(120, 0.30, 0.75, 2.0, 15.0, 6.0)
    }

    #[test]
    fn study_runs_all_strategies_in_order() {
        let (x, y) = canonical();
        let study = run_study(&x, &y, &WeightStrategy::ALL).unwrap();

        assert_eq!(study.outcomes.len(), 3);
        assert_eq!(study.outcomes[0].strategy, WeightStrategy::InvFitted);
        assert_eq!(study.outcomes[1].strategy, WeightStrategy::AbsResidual);
        assert_eq!(study.outcomes[2].strategy, WeightStrategy::SquaredResidual);
        assert!((study.ols.intercept.value - 2.131847).abs() < 1e-5);
        assert!((study.ols.slope.value - 14.732117).abs() < 1e-5);
    }

    #[test]
    fn reweighting_improves_r_squared_at_every_step() {
        let (x, y) = canonical();
        let study = run_study(&x, &y, &WeightStrategy::ALL).unwrap();

        let mut last = study.ols.quality.r_squared;
        assert!((last - 0.353418).abs() < 1e-5);
        for outcome in &study.outcomes {
            let r2 = outcome.fit.quality.r_squared;
            assert!(
                r2 > last + 0.01,
                "strategy {} did not improve R^2: {r2} vs {last}",
                outcome.strategy.slug()
            );
            last = r2;
        }
        assert!((last - 0.402336).abs() < 1e-5);
    }

    #[test]
    fn reweighting_tightens_the_slope_standard_error() {
        let (x, y) = canonical();
        let study = run_study(&x, &y, &WeightStrategy::ALL).unwrap();

        let mut last = study.ols.slope.std_error;
        assert!((last - 1.834391).abs() < 1e-5);
        for outcome in &study.outcomes {
            let se = outcome.fit.slope.std_error;
            assert!(
                se < last,
                "strategy {} did not tighten se(slope): {se} vs {last}",
                outcome.strategy.slug()
            );
            last = se;
        }
        assert!((last - 1.648317).abs() < 1e-5);
    }

    #[test]
    fn weights_stay_positive_and_every_row_is_kept() {
        let (x, y) = canonical();
        let study = run_study(&x, &y, &WeightStrategy::ALL).unwrap();

        for outcome in &study.outcomes {
            assert_eq!(outcome.weights.len(), x.len());
            assert!(outcome.weights.iter().all(|w| w.is_finite() && *w > 0.0));
            assert!(outcome.zero_weight_rows.is_empty());
            assert_eq!(outcome.fit.quality.df, x.len() - 2);
        }
    }

    #[test]
    fn dispersion_fits_are_present_only_for_residual_strategies() {
        let (x, y) = canonical();
        let study = run_study(&x, &y, &WeightStrategy::ALL).unwrap();

        assert!(study.outcomes[0].dispersion.is_none());
        assert!(study.outcomes[1].dispersion.is_some());
        assert!(study.outcomes[2].dispersion.is_some());
    }

    #[test]
    fn linear_noise_scale_recovers_inverse_square_weights() {
        // sd(noise) grows linearly in x here, so the squared-residual
        // strategy should land near w ∝ 1/x^2 and estimate the slope
        // materially more precisely than OLS.
        let (x, y) = noisy_series(100, 1.0, 2.5, 2.0, 3.0, 0.9);
        let study = run_study(&x, &y, &[WeightStrategy::SquaredResidual]).unwrap();

        let ols = &study.ols;
        let wls = &study.outcomes[0];
        assert!((ols.slope.value - 2.951901).abs() < 1e-5);
        assert!((wls.fit.slope.value - 2.944678).abs() < 1e-5);

        let wx2: Vec<f64> = wls.weights.iter().zip(&x).map(|(w, xi)| w * xi * xi).collect();
        let lo = wx2.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = wx2.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(hi / lo < 1.8, "weights deviate from 1/x^2 by {}", hi / lo);

        assert!(wls.fit.slope.std_error < 0.95 * ols.slope.std_error);
        assert!(wls.fit.quality.r_squared > ols.quality.r_squared + 0.02);
    }
}

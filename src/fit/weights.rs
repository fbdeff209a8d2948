//! Observation weights estimated from a baseline fit.
//!
//! Every strategy follows the same two-step shape: derive a per-row scale
//! from the baseline fit (directly, or through a secondary dispersion
//! regression on the predictor), then invert it into weights. The strategies
//! differ only in which scale they compute and how it is inverted, so they
//! share one validation loop.

use crate::domain::{LineFit, WeightStrategy};
use crate::error::AppError;
use crate::math::fit_line;

/// Weights for one strategy, plus the intermediate dispersion fit when the
/// strategy uses one.
#[derive(Debug, Clone)]
pub struct WeightEstimate {
    pub strategy: WeightStrategy,
    pub weights: Vec<f64>,
    /// Secondary regression of a residual summary on the predictor.
    /// `None` for strategies that reuse the baseline fit directly.
    pub dispersion: Option<LineFit>,
}

/// Estimate per-row weights from the baseline fit.
///
/// The returned weights are guaranteed finite and strictly positive.
/// `inv-fitted` is degenerate on any non-positive fitted value. The two
/// dispersion strategies invert a magnitude, so a negative dispersion
/// prediction is usable and only an exactly zero one is degenerate.
/// Either way the error names the offending row.
pub fn estimate_weights(
    strategy: WeightStrategy,
    x: &[f64],
    base: &LineFit,
) -> Result<WeightEstimate, AppError> {
    let (scale, power, what, dispersion) = match strategy {
        WeightStrategy::InvFitted => (base.fitted.clone(), 1, "fitted value", None),
        WeightStrategy::AbsResidual => {
            let abs: Vec<f64> = base.residuals.iter().map(|r| r.abs()).collect();
            let disp = fit_line(x, &abs)?;
            let scale = disp.fitted.iter().map(|z| z.abs()).collect();
            (scale, 2, "predicted |residual|", Some(disp))
        }
        WeightStrategy::SquaredResidual => {
            let sq: Vec<f64> = base.residuals.iter().map(|r| r * r).collect();
            let disp = fit_line(x, &sq)?;
            let scale = disp.fitted.iter().map(|z| z.abs()).collect();
            (scale, 1, "predicted squared residual", Some(disp))
        }
    };

    let mut weights = Vec::with_capacity(scale.len());
    for (row, &s) in scale.iter().enumerate() {
        if !s.is_finite() || s <= 0.0 {
            return Err(AppError::numeric(format!(
                "weight strategy '{}' is degenerate: {} {:.6} at data row {} is not positive",
                strategy.slug(),
                what,
                s,
                row + 1
            )));
        }
        weights.push(1.0 / s.powi(power));
    }

    Ok(WeightEstimate { strategy, weights, dispersion })
}

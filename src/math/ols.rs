//! Weighted least squares for a straight line.
//!
//! Every fit in this crate is the same small problem:
//!
//! ```text
//! minimize Σ w_i (y_i - a - b x_i)^2
//! ```
//!
//! fitted once per model rather than inside an optimizer loop, so clarity
//! wins over raw speed.
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and the scaled system is solved as
//!   ordinary least squares, constant column included, so the unit-weight
//!   case is literally the same code path as OLS.
//! - The solve uses SVD, which stays robust when the design matrix is tall.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic
//!   for non-square matrices.)
//! - A constant predictor is rejected up front with a weighted variance
//!   check. SVD would otherwise hand back the minimum-norm solution for a
//!   rank-deficient design instead of failing.
//! - Standard errors come from the inverse of the 2x2 weighted Gram matrix;
//!   p-values use Student's t with the residual degrees of freedom, which
//!   count only rows carrying positive weight.

use std::fmt;

use nalgebra::{DMatrix, DVector, Matrix2};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::domain::{CoefEstimate, FitQuality, LineFit};
use crate::error::AppError;

/// Why a line could not be fitted.
///
/// Row indices in the variants are 0-based; the rendered messages print
/// them 1-based to match the rest of the tool.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Fewer than `needed` rows carry positive weight.
    TooFewObservations { needed: usize, got: usize },
    /// The predictor has zero weighted variance, so the slope is
    /// unidentifiable.
    SingularDesign,
    /// A NaN or infinity in one of the fitted columns.
    NonFiniteInput { column: &'static str, row: usize },
    /// A weight that is negative, NaN or infinite.
    InvalidWeight { row: usize, value: f64 },
    /// The SVD solve failed at every tolerance.
    IllConditioned,
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::TooFewObservations { needed, got } => write!(
                f,
                "need at least {needed} observations with positive weight, got {got}"
            ),
            FitError::SingularDesign => write!(
                f,
                "singular design: the predictor is constant, so no slope can be estimated"
            ),
            FitError::NonFiniteInput { column, row } => {
                write!(f, "non-finite {column} value at data row {}", row + 1)
            }
            FitError::InvalidWeight { row, value } => write!(
                f,
                "invalid weight {value} at data row {}: weights must be finite and non-negative",
                row + 1
            ),
            FitError::IllConditioned => {
                write!(f, "least-squares solve failed: the system is too ill-conditioned")
            }
        }
    }
}

impl std::error::Error for FitError {}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::TooFewObservations { .. } => AppError::no_data(err.to_string()),
            _ => AppError::numeric(err.to_string()),
        }
    }
}

/// Outcome of a weighted fit: the line plus which rows were dropped.
#[derive(Debug, Clone)]
pub struct WlsFit {
    pub line: LineFit,
    /// Indices of rows excluded for having exactly zero weight.
    pub zero_weight_rows: Vec<usize>,
}

/// Ordinary least squares: every row weighted equally.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit, FitError> {
    let w = vec![1.0; x.len()];
    weighted_line_fit(x, y, &w).map(|fit| fit.line)
}

/// Fit `y = a + b x` by weighted least squares.
///
/// Zero weights drop their rows from the normal equations and from the
/// degrees of freedom, but those rows still receive fitted values and
/// residuals. Negative or non-finite weights are rejected outright.
pub fn weighted_line_fit(x: &[f64], y: &[f64], w: &[f64]) -> Result<WlsFit, FitError> {
    assert_eq!(x.len(), y.len(), "x and y must have the same length");
    assert_eq!(x.len(), w.len(), "x and w must have the same length");

    for (row, &v) in x.iter().enumerate() {
        if !v.is_finite() {
            return Err(FitError::NonFiniteInput { column: "predictor", row });
        }
    }
    for (row, &v) in y.iter().enumerate() {
        if !v.is_finite() {
            return Err(FitError::NonFiniteInput { column: "response", row });
        }
    }

    let mut zero_weight_rows = Vec::new();
    let mut active = Vec::new();
    for (row, &wi) in w.iter().enumerate() {
        if !wi.is_finite() || wi < 0.0 {
            return Err(FitError::InvalidWeight { row, value: wi });
        }
        if wi == 0.0 {
            zero_weight_rows.push(row);
        } else {
            active.push(row);
        }
    }
    if active.len() < 2 {
        return Err(FitError::TooFewObservations { needed: 2, got: active.len() });
    }

    // Weighted sums over the active rows. The variance check is centered to
    // avoid the cancellation the raw Gram determinant suffers when the
    // predictor sits far from zero.
    let sw: f64 = active.iter().map(|&i| w[i]).sum();
    let swx: f64 = active.iter().map(|&i| w[i] * x[i]).sum();
    let swx2: f64 = active.iter().map(|&i| w[i] * x[i] * x[i]).sum();
    let mean_x = swx / sw;
    let var_x: f64 = active.iter().map(|&i| w[i] * (x[i] - mean_x).powi(2)).sum();
    if var_x <= swx2.max(sw) * 1e-12 {
        return Err(FitError::SingularDesign);
    }

    let design = DMatrix::from_fn(active.len(), 2, |r, c| {
        let i = active[r];
        let s = w[i].sqrt();
        if c == 0 { s } else { s * x[i] }
    });
    let rhs = DVector::from_fn(active.len(), |r, _| {
        let i = active[r];
        w[i].sqrt() * y[i]
    });
    let beta = solve_least_squares(&design, &rhs).ok_or(FitError::IllConditioned)?;
    let (a, b) = (beta[0], beta[1]);

    let fitted: Vec<f64> = x.iter().map(|&v| a + b * v).collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(&yi, &fi)| yi - fi).collect();

    let sse: f64 = active.iter().map(|&i| w[i] * residuals[i] * residuals[i]).sum();
    let swy: f64 = active.iter().map(|&i| w[i] * y[i]).sum();
    let mean_y = swy / sw;
    let tss: f64 = active.iter().map(|&i| w[i] * (y[i] - mean_y).powi(2)).sum();

    let n = active.len();
    let df = n - 2;
    let r_squared = if tss > 0.0 {
        ((tss - sse) / tss).clamp(0.0, 1.0)
    } else {
        f64::NAN
    };
    let rmse = (sse / n as f64).sqrt();

    let (se_a, se_b) = if df > 0 {
        let sigma2 = sse / df as f64;
        let gram = Matrix2::new(sw, swx, swx, swx2);
        match gram.try_inverse() {
            Some(inv) => ((sigma2 * inv[(0, 0)]).sqrt(), (sigma2 * inv[(1, 1)]).sqrt()),
            None => (f64::NAN, f64::NAN),
        }
    } else {
        (f64::NAN, f64::NAN)
    };

    Ok(WlsFit {
        line: LineFit {
            intercept: coef_estimate(a, se_a, df),
            slope: coef_estimate(b, se_b, df),
            fitted,
            residuals,
            quality: FitQuality { n, df, sse, rmse, r_squared },
        },
        zero_weight_rows,
    })
}

fn coef_estimate(value: f64, std_error: f64, df: usize) -> CoefEstimate {
    let t_value = value / std_error;
    CoefEstimate {
        value,
        std_error,
        t_value,
        p_value: p_value(t_value, df),
    }
}

/// Two-sided p-value for a t statistic with `df` degrees of freedom.
fn p_value(t: f64, df: usize) -> f64 {
    if df == 0 || t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df as f64) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails. Weight
    // vectors spanning several orders of magnitude can leave the scaled
    // design poorly conditioned without being truly rank deficient.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const X6: [f64; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    const Y6: [f64; 6] = [3.2, 4.7, 7.1, 9.4, 10.8, 12.8];

    #[test]
    fn ols_recovers_known_coefficients() {
        let fit = fit_line(&X6, &Y6).unwrap();
        assert!((fit.intercept.value - 1.14).abs() < 1e-8);
        assert!((fit.slope.value - 1.96).abs() < 1e-8);
        assert!((fit.quality.sse - 0.352).abs() < 1e-9);
        assert!((fit.quality.r_squared - 0.994791358390).abs() < 1e-9);
        assert!((fit.quality.rmse - 0.242212028328).abs() < 1e-9);
        assert_eq!(fit.quality.n, 6);
        assert_eq!(fit.quality.df, 4);
    }

    #[test]
    fn ols_inference_matches_textbook_values() {
        let fit = fit_line(&X6, &Y6).unwrap();
        assert!((fit.intercept.std_error - 0.276164202363).abs() < 1e-9);
        assert!((fit.slope.std_error - 0.070912420834).abs() < 1e-9);
        assert!((fit.intercept.t_value - 4.127978898954).abs() < 1e-6);
        assert!((fit.slope.t_value - 27.639727666071).abs() < 1e-6);
        assert!((fit.intercept.p_value - 0.014517766556).abs() < 1e-6);
        assert!((fit.slope.p_value - 0.000010191446).abs() < 1e-8);
    }

    #[test]
    fn residuals_are_orthogonal_to_the_design() {
        let fit = fit_line(&X6, &Y6).unwrap();
        let sum_r: f64 = fit.residuals.iter().sum();
        let sum_rx: f64 = fit.residuals.iter().zip(&X6).map(|(r, x)| r * x).sum();
        assert!(sum_r.abs() < 1e-8);
        assert!(sum_rx.abs() < 1e-8);
    }

    #[test]
    fn weighted_residuals_are_orthogonal_to_the_design() {
        let w = [4.0, 1.0, 0.25, 2.0, 1.0, 0.5];
        let fit = weighted_line_fit(&X6, &Y6, &w).unwrap();
        let sum_wr: f64 = fit.line.residuals.iter().zip(&w).map(|(r, wi)| wi * r).sum();
        let sum_wrx: f64 = fit
            .line
            .residuals
            .iter()
            .zip(&w)
            .zip(&X6)
            .map(|((r, wi), x)| wi * r * x)
            .sum();
        assert!(sum_wr.abs() < 1e-8);
        assert!(sum_wrx.abs() < 1e-8);
    }

    #[test]
    fn unit_weights_reproduce_ols_exactly() {
        let w = [1.0; 6];
        let wls = weighted_line_fit(&X6, &Y6, &w).unwrap();
        let ols = fit_line(&X6, &Y6).unwrap();
        assert!((wls.line.intercept.value - ols.intercept.value).abs() < 1e-12);
        assert!((wls.line.slope.value - ols.slope.value).abs() < 1e-12);
        assert!((wls.line.quality.sse - ols.quality.sse).abs() < 1e-12);
        assert!((wls.line.quality.r_squared - ols.quality.r_squared).abs() < 1e-12);
        assert!(wls.zero_weight_rows.is_empty());
    }

    #[test]
    fn zero_weights_drop_rows_from_the_fit() {
        let w = [1.0, 1.0, 1.0, 1.0, 1.0, 0.0];
        let wls = weighted_line_fit(&X6, &Y6, &w).unwrap();
        let sliced = fit_line(&X6[..5], &Y6[..5]).unwrap();
        assert_eq!(wls.zero_weight_rows, vec![5]);
        assert_eq!(wls.line.quality.n, 5);
        assert_eq!(wls.line.quality.df, 3);
        assert_eq!(sliced.quality.df, 3);
        assert!((wls.line.intercept.value - sliced.intercept.value).abs() < 1e-10);
        assert!((wls.line.slope.value - sliced.slope.value).abs() < 1e-10);
        assert!((wls.line.slope.std_error - sliced.slope.std_error).abs() < 1e-10);
        // Dropped rows still get fitted values and residuals.
        assert_eq!(wls.line.fitted.len(), 6);
        assert_eq!(wls.line.residuals.len(), 6);
    }

    #[test]
    fn constant_predictor_is_rejected_as_singular() {
        let x = [2.0; 5];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(matches!(fit_line(&x, &y), Err(FitError::SingularDesign)));
    }

    #[test]
    fn negative_and_non_finite_weights_are_rejected() {
        let w_neg = [1.0, 1.0, -0.5, 1.0, 1.0, 1.0];
        let err = weighted_line_fit(&X6, &Y6, &w_neg).unwrap_err();
        assert!(matches!(err, FitError::InvalidWeight { row: 2, .. }));
        // The variant index is 0-based; the message counts rows from 1.
        assert!(err.to_string().contains("data row 3"));
        let w_nan = [1.0, f64::NAN, 1.0, 1.0, 1.0, 1.0];
        assert!(matches!(
            weighted_line_fit(&X6, &Y6, &w_nan),
            Err(FitError::InvalidWeight { row: 1, .. })
        ));
    }

    #[test]
    fn non_finite_response_is_rejected() {
        let y = [3.2, 4.7, f64::INFINITY, 9.4, 10.8, 12.8];
        let err = fit_line(&X6, &y).unwrap_err();
        assert!(matches!(
            err,
            FitError::NonFiniteInput { column: "response", row: 2 }
        ));
        assert!(err.to_string().contains("data row 3"));
    }

    #[test]
    fn too_few_positive_weights_is_an_error() {
        let x = [1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0];
        let w = [1.0, 0.0, 0.0];
        assert!(matches!(
            weighted_line_fit(&x, &y, &w),
            Err(FitError::TooFewObservations { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn two_point_fit_is_exact_with_nan_inference() {
        let fit = fit_line(&[1.0, 3.0], &[2.0, 8.0]).unwrap();
        assert!((fit.intercept.value + 1.0).abs() < 1e-10);
        assert!((fit.slope.value - 3.0).abs() < 1e-10);
        assert_eq!(fit.quality.df, 0);
        assert!((fit.quality.r_squared - 1.0).abs() < 1e-10);
        assert!(fit.slope.std_error.is_nan());
        assert!(fit.slope.p_value.is_nan());
    }

    #[test]
    fn p_values_match_t_table_entries() {
        assert!((p_value(2.228, 10) - 0.050012).abs() < 1e-4);
        assert!((p_value(2.0, 10) - 0.073388).abs() < 1e-4);
        assert!((p_value(0.0, 10) - 1.0).abs() < 1e-12);
        assert!(p_value(1.5, 0).is_nan());
    }

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let no_data: AppError = FitError::TooFewObservations { needed: 2, got: 1 }.into();
        assert_eq!(no_data.exit_code(), 3);
        let numeric: AppError = FitError::SingularDesign.into();
        assert_eq!(numeric.exit_code(), 4);
    }
}

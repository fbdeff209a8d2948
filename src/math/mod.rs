//! Numerical core: the weighted least squares line fitter.

pub mod ols;

pub use ols::*;

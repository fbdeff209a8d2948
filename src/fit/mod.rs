//! Weight estimation and study orchestration.
//!
//! Responsibilities:
//!
//! - estimate observation weights from the baseline fit (one routine per strategy)
//! - refit by weighted least squares and collect each outcome
//! - keep the whole study deterministic: same input, same report

pub mod study;
pub mod weights;

pub use study::*;
pub use weights::*;

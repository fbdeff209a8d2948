//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - dataset rows (`Observation`, `Sex`) and the fixed column schema
//! - configuration enums (`WeightStrategy`, `StrategySpec`, `Delimiter`)
//! - fit outputs (`LineFit`, `CoefEstimate`, `FitQuality`)
//! - the saved study file format (`StudyFile`, `StudyModel`)

pub mod types;

pub use types::*;

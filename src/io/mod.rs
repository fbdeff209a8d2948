//! Input/output helpers.
//!
//! - data file ingest + validation (`ingest`)
//! - result CSV, sample CSV and study JSON read/write (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;

//! Shared "fit pipeline" logic used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load table -> OLS baseline -> weight estimation -> WLS refits
//!
//! The CLI can then focus on presentation (printing vs files).

use crate::domain::FitConfig;
use crate::error::AppError;
use crate::fit::Study;
use crate::io::IngestedData;

/// All computed outputs of a single `wls fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub study: Study,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Load and validate the data file.
    let ingest = crate::io::load_table(config)?;

    // 2) Fit the OLS baseline plus every configured strategy.
    let study = crate::fit::run_study(&ingest.x, &ingest.y, &config.strategies)?;

    Ok(RunOutput { ingest, study })
}

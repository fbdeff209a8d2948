//! Result exports.
//!
//! Two formats:
//! - a wide per-row CSV (observed, fitted, residual and weight columns for
//!   every model) meant for spreadsheets or downstream scripts
//! - study JSON, the portable representation of a whole run, defined by
//!   `domain::StudyFile` and reloadable for later plotting

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Observation, StudyFile, StudyModel};
use crate::error::AppError;
use crate::fit::Study;
use crate::io::ingest::IngestedData;

/// Write per-row results to a CSV file.
pub fn write_results_csv(path: &Path, ingest: &IngestedData, study: &Study) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("failed to create export CSV '{}': {e}", path.display()))
    })?;
    render_results_csv(file, ingest, study)
}

fn render_results_csv<W: Write>(
    mut out: W,
    ingest: &IngestedData,
    study: &Study,
) -> Result<(), AppError> {
    let mut header = format!(
        "row,sex,{},{},fitted_ols,residual_ols",
        ingest.x_label, ingest.y_label
    );
    for outcome in &study.outcomes {
        let slug = outcome.strategy.slug().replace('-', "_");
        header.push_str(&format!(",weight_{slug},fitted_{slug},residual_{slug}"));
    }
    writeln!(out, "{header}")
        .map_err(|e| AppError::usage(format!("failed to write export CSV header: {e}")))?;

    for (i, obs) in ingest.observations.iter().enumerate() {
        let mut line = format!(
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            i + 1,
            obs.sex.code(),
            ingest.x[i],
            ingest.y[i],
            study.ols.fitted[i],
            study.ols.residuals[i]
        );
        for outcome in &study.outcomes {
            line.push_str(&format!(
                ",{:.10},{:.6},{:.6}",
                outcome.weights[i], outcome.fit.fitted[i], outcome.fit.residuals[i]
            ));
        }
        writeln!(out, "{line}")
            .map_err(|e| AppError::usage(format!("failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Assemble the serializable representation of a run.
///
/// The baseline always comes first under the label `ols`; weighted models
/// follow in strategy order under their slugs.
pub fn build_study_file(source: &str, ingest: &IngestedData, study: &Study) -> StudyFile {
    let mut models = Vec::with_capacity(study.outcomes.len() + 1);
    models.push(StudyModel {
        label: "ols".to_string(),
        strategy: None,
        fit: study.ols.clone(),
        weights: None,
        zero_weight_rows: Vec::new(),
        dispersion: None,
    });
    for outcome in &study.outcomes {
        models.push(StudyModel {
            label: outcome.strategy.slug().to_string(),
            strategy: Some(outcome.strategy),
            fit: outcome.fit.clone(),
            weights: Some(outcome.weights.clone()),
            zero_weight_rows: outcome.zero_weight_rows.clone(),
            dispersion: outcome.dispersion.clone(),
        });
    }

    StudyFile {
        tool: "wls".to_string(),
        source: source.to_string(),
        x_label: ingest.x_label.clone(),
        y_label: ingest.y_label.clone(),
        stats: ingest.stats.clone(),
        models,
    }
}

/// Write a study JSON file.
pub fn write_study_json(path: &Path, study: &StudyFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("failed to create study JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, study)
        .map_err(|e| AppError::usage(format!("failed to write study JSON: {e}")))?;
    Ok(())
}

/// Read a study JSON file back.
pub fn read_study_json(path: &Path) -> Result<StudyFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("failed to open study JSON '{}': {e}", path.display()))
    })?;
    let study: StudyFile = serde_json::from_reader(file)
        .map_err(|e| AppError::usage(format!("invalid study JSON: {e}")))?;
    Ok(study)
}

/// Write generated observations in the nine-column headerless input format.
pub fn write_sample_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("failed to create sample CSV '{}': {e}", path.display()))
    })?;
    render_sample_csv(file, observations)
}

fn render_sample_csv<W: Write>(mut out: W, observations: &[Observation]) -> Result<(), AppError> {
    for obs in observations {
        writeln!(
            out,
            "{},{:.3},{:.3},{:.3},{:.4},{:.4},{:.4},{:.4},{:.0}",
            obs.sex.code(),
            obs.length,
            obs.diameter,
            obs.height,
            obs.whole_weight,
            obs.shucked_weight,
            obs.viscera_weight,
            obs.shell_weight,
            obs.rings
        )
        .map_err(|e| AppError::usage(format!("failed to write sample CSV row: {e}")))?;
    }
    Ok(())
}

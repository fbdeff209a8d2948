//! Debug bundle writer for inspecting a fit run end to end.
//!
//! Dumps a timestamped markdown file under `debug/` with the run config,
//! the head of the data, every fitted model and the per-strategy weight
//! diagnostics. Meant for eyeballing a surprising fit, not for machines.

use std::cmp::Ordering;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::domain::{FitConfig, LineFit};
use crate::error::AppError;
use crate::fit::Study;
use crate::io::IngestedData;
use crate::report::model_label;

pub fn write_debug_bundle(
    ingest: &IngestedData,
    study: &Study,
    config: &FitConfig,
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir)
        .map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let stem = config
        .data_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data");
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("wls_debug_{stem}_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;

    let strategies: Vec<&str> = config.strategies.iter().map(|s| s.slug()).collect();

    writeln!(file, "# wls debug bundle")
        .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339())
        .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- source: {}", config.data_path.display())
        .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- model: {} ~ {}", ingest.y_label, ingest.x_label)
        .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- delimiter: {:?}", config.delimiter)
        .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- strategies: {}", strategies.join(", "))
        .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- rows: n={}, {}=[{:.4}, {:.4}], {}=[{:.4}, {:.4}]",
        ingest.stats.n_rows,
        ingest.x_label,
        ingest.stats.x_min,
        ingest.stats.x_max,
        ingest.y_label,
        ingest.stats.y_min,
        ingest.stats.y_max
    )
    .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;

    writeln!(file, "\n## Data head")
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| row | {} | {} |", ingest.x_label, ingest.y_label)
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - | - |")
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
    for (idx, (x, y)) in ingest.x.iter().zip(&ingest.y).take(10).enumerate() {
        writeln!(file, "| {} | {:.4} | {:.4} |", idx + 1, x, y)
            .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
    }

    writeln!(file, "\n## Models")
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| model | intercept | slope | se(slope) | R^2 | rmse | sse | df |")
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - | - | - | - | - | - | - |")
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
    write_model_row(&mut file, "ols", &study.ols)?;
    for outcome in &study.outcomes {
        write_model_row(&mut file, outcome.strategy.slug(), &outcome.fit)?;
    }

    for outcome in &study.outcomes {
        writeln!(file, "\n## Strategy: {}", model_label(Some(outcome.strategy)))
            .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;

        let mut w_min = f64::INFINITY;
        let mut w_max = f64::NEG_INFINITY;
        let mut w_sum = 0.0;
        for &w in &outcome.weights {
            w_min = w_min.min(w);
            w_max = w_max.max(w);
            w_sum += w;
        }
        let w_mean = w_sum / outcome.weights.len() as f64;
        writeln!(
            file,
            "- weights: min={}, max={}, mean={}",
            fmt(w_min, 6),
            fmt(w_max, 6),
            fmt(w_mean, 6)
        )
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;

        if outcome.zero_weight_rows.is_empty() {
            writeln!(file, "- zero-weight rows: none")
                .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
        } else {
            let rows: Vec<String> = outcome
                .zero_weight_rows
                .iter()
                .map(|r| (r + 1).to_string())
                .collect();
            writeln!(file, "- zero-weight rows: {}", rows.join(", "))
                .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
        }

        if let Some(dispersion) = &outcome.dispersion {
            writeln!(
                file,
                "- dispersion fit: intercept={}, slope={}, R^2={}",
                fmt(dispersion.intercept.value, 6),
                fmt(dispersion.slope.value, 6),
                fmt(dispersion.quality.r_squared, 4)
            )
            .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
        }

        let mut ranked: Vec<(usize, f64)> = outcome.weights.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        writeln!(file, "\n### Lowest weights")
            .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
        writeln!(file, "| row | {} | {} | weight |", ingest.x_label, ingest.y_label)
            .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
        writeln!(file, "| - | - | - | - |")
            .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
        for &(idx, w) in ranked.iter().take(5) {
            writeln!(
                file,
                "| {} | {:.4} | {:.4} | {} |",
                idx + 1,
                ingest.x[idx],
                ingest.y[idx],
                fmt(w, 8)
            )
            .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;
        }
    }

    Ok(path)
}

fn write_model_row(file: &mut File, label: &str, fit: &LineFit) -> Result<(), AppError> {
    writeln!(
        file,
        "| {} | {} | {} | {} | {} | {} | {} | {} |",
        label,
        fmt(fit.intercept.value, 6),
        fmt(fit.slope.value, 6),
        fmt(fit.slope.std_error, 6),
        fmt(fit.quality.r_squared, 4),
        fmt(fit.quality.rmse, 4),
        fmt(fit.quality.sse, 4),
        fit.quality.df
    )
    .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))
}

fn fmt(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        "-".to_string()
    }
}

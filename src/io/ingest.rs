//! Data file ingest.
//!
//! Turns a headerless nine-column measurement table into clean predictor and
//! response vectors that are safe to fit.
//!
//! Design goals:
//! - **Strict rows**: the first malformed row aborts the run with its line
//!   number (exit code 2), never a silent skip
//! - **Fixed schema**: columns are positional; their names live here in the
//!   binary, not in the file
//! - **Deterministic behavior**: delimiter sniffing looks at one line and
//!   follows a fixed preference order
//! - **Separation of concerns**: no fitting logic here

use std::fs;

use crate::domain::{COLUMN_NAMES, DatasetStats, Delimiter, FitConfig, Observation, Sex};
use crate::error::AppError;

/// Ingest output: parsed rows plus the two columns picked for fitting.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
    pub stats: DatasetStats,
}

/// Read and parse the configured data file.
pub fn load_table(config: &FitConfig) -> Result<IngestedData, AppError> {
    let text = fs::read_to_string(&config.data_path).map_err(|e| {
        AppError::usage(format!(
            "failed to open data file '{}': {e}",
            config.data_path.display()
        ))
    })?;
    parse_table(&text, config.delimiter, &config.x_col, &config.y_col)
}

/// Parse an in-memory table and select the fit columns.
pub fn parse_table(
    text: &str,
    delimiter: Delimiter,
    x_col: &str,
    y_col: &str,
) -> Result<IngestedData, AppError> {
    ensure_numeric_column("--x", x_col)?;
    ensure_numeric_column("--y", y_col)?;
    if x_col == y_col {
        return Err(AppError::usage(format!(
            "--x and --y must name different columns (both are `{x_col}`)"
        )));
    }

    let sep = match delimiter {
        Delimiter::Auto => sniff_delimiter(text),
        other => other,
    };
    let observations = match sep {
        Delimiter::Comma => parse_delimited(text, b',')?,
        Delimiter::Tab => parse_delimited(text, b'\t')?,
        Delimiter::Semicolon => parse_delimited(text, b';')?,
        _ => parse_whitespace(text)?,
    };
    if observations.is_empty() {
        return Err(AppError::no_data("no data rows found in input"));
    }

    let x = column_values(&observations, x_col)?;
    let y = column_values(&observations, y_col)?;
    let stats = compute_stats(&x, &y);

    Ok(IngestedData {
        observations,
        x,
        y,
        x_label: x_col.to_string(),
        y_label: y_col.to_string(),
        stats,
    })
}

/// Detect the field separator from the first non-empty line.
///
/// Preference order: comma, tab, semicolon, whitespace.
pub fn sniff_delimiter(text: &str) -> Delimiter {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return Delimiter::Whitespace;
    };
    if line.contains(',') {
        Delimiter::Comma
    } else if line.contains('\t') {
        Delimiter::Tab
    } else if line.contains(';') {
        Delimiter::Semicolon
    } else {
        Delimiter::Whitespace
    }
}

fn ensure_numeric_column(flag: &str, name: &str) -> Result<(), AppError> {
    let known = COLUMN_NAMES.iter().any(|c| *c == name);
    if !known || name == "sex" {
        return Err(AppError::usage(format!(
            "{flag} must name a numeric column: one of {}",
            COLUMN_NAMES[1..].join(", ")
        )));
    }
    Ok(())
}

fn parse_delimited(text: &str, sep: u8) -> Result<Vec<Observation>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(sep)
        .from_reader(text.as_bytes());

    let mut observations = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| AppError::usage(format!("malformed row near line {}: {e}", idx + 1)))?;
        // The csv reader skips blank lines, so take the real line number from
        // the record position when it is available.
        let line = record.position().map_or(idx + 1, |p| p.line() as usize);
        let fields: Vec<&str> = record.iter().collect();
        observations.push(parse_fields(&fields, line)?);
    }
    Ok(observations)
}

fn parse_whitespace(text: &str) -> Result<Vec<Observation>, AppError> {
    let mut observations = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = raw.split_whitespace().collect();
        observations.push(parse_fields(&fields, idx + 1)?);
    }
    Ok(observations)
}

fn parse_fields(fields: &[&str], line: usize) -> Result<Observation, AppError> {
    if fields.len() != COLUMN_NAMES.len() {
        return Err(AppError::usage(format!(
            "expected {} columns, found {} at line {line}",
            COLUMN_NAMES.len(),
            fields.len()
        )));
    }
    let sex = Sex::parse(fields[0])
        .ok_or_else(|| AppError::usage(format!("unknown sex code '{}' at line {line}", fields[0])))?;
    Ok(Observation {
        sex,
        length: parse_field(fields[1], "length", line)?,
        diameter: parse_field(fields[2], "diameter", line)?,
        height: parse_field(fields[3], "height", line)?,
        whole_weight: parse_field(fields[4], "whole_weight", line)?,
        shucked_weight: parse_field(fields[5], "shucked_weight", line)?,
        viscera_weight: parse_field(fields[6], "viscera_weight", line)?,
        shell_weight: parse_field(fields[7], "shell_weight", line)?,
        rings: parse_field(fields[8], "rings", line)?,
    })
}

fn parse_field(s: &str, column: &str, line: usize) -> Result<f64, AppError> {
    let v: f64 = s.parse().map_err(|_| {
        AppError::usage(format!(
            "invalid numeric value '{s}' for column `{column}` at line {line}"
        ))
    })?;
    if !v.is_finite() {
        return Err(AppError::usage(format!(
            "non-finite value '{s}' for column `{column}` at line {line}"
        )));
    }
    Ok(v)
}

fn column_values(observations: &[Observation], name: &str) -> Result<Vec<f64>, AppError> {
    observations
        .iter()
        .map(|o| {
            o.numeric_field(name)
                .ok_or_else(|| AppError::usage(format!("unknown numeric column `{name}`")))
        })
        .collect()
}

fn compute_stats(x: &[f64], y: &[f64]) -> DatasetStats {
    let mut stats = DatasetStats {
        n_rows: x.len(),
        x_min: f64::INFINITY,
        x_max: f64::NEG_INFINITY,
        y_min: f64::INFINITY,
        y_max: f64::NEG_INFINITY,
    };
    for (&xi, &yi) in x.iter().zip(y) {
        stats.x_min = stats.x_min.min(xi);
        stats.x_max = stats.x_max.max(xi);
        stats.y_min = stats.y_min.min(yi);
        stats.y_max = stats.y_max.max(yi);
    }
    stats
}

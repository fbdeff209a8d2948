//! Command-line parsing for the weighted least squares study tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Delimiter, ModelPick, StrategySpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wls", version, about = "Weighted Least Squares Regression Study")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit OLS plus reweighted models to a data file, print diagnostics, and optionally plot/export.
    Fit(FitArgs),
    /// Generate a synthetic data file with planted heteroscedastic noise.
    Sample(SampleArgs),
    /// Re-plot residuals from a previously exported study JSON.
    Plot(PlotArgs),
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input data file (nine-column abalone-style table).
    #[arg(short = 'd', long, value_name = "FILE")]
    pub data: PathBuf,

    /// Predictor column.
    #[arg(short = 'x', long, default_value = "length")]
    pub x: String,

    /// Response column.
    #[arg(short = 'y', long, default_value = "rings")]
    pub y: String,

    /// Field delimiter (auto sniffs from the first data line).
    #[arg(long, value_enum, default_value_t = Delimiter::Auto)]
    pub delimiter: Delimiter,

    /// Which weighting strategy to run next to the OLS baseline.
    #[arg(short = 's', long, value_enum, default_value_t = StrategySpec::All)]
    pub strategy: StrategySpec,

    /// Render ASCII residual plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,

    /// Export per-row results (fitted values, residuals, weights) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the whole study (every model plus its weights) to JSON.
    #[arg(long = "export-study")]
    pub export_study: Option<PathBuf>,

    /// Write a markdown debug bundle under debug/.
    #[arg(long)]
    pub debug_bundle: bool,
}

/// Options for sample generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output file.
    #[arg(short = 'o', long, default_value = "sample.csv")]
    pub out: PathBuf,

    /// Number of rows to generate.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// True intercept of the planted line.
    #[arg(long, default_value_t = 2.0)]
    pub intercept: f64,

    /// True slope of the planted line.
    #[arg(long, default_value_t = 15.0)]
    pub slope: f64,

    /// Noise scale at x = 1.
    #[arg(long, default_value_t = 1.8)]
    pub noise: f64,

    /// Noise growth exponent: sd(eps) = noise * x^gamma.
    #[arg(long, default_value_t = 1.0)]
    pub gamma: f64,

    /// Smallest predictor value.
    #[arg(long, default_value_t = 0.30)]
    pub x_min: f64,

    /// Largest predictor value.
    #[arg(long, default_value_t = 0.75)]
    pub x_max: f64,
}

/// Options for re-plotting a saved study.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Study JSON file produced by `wls fit --export-study`.
    #[arg(long, value_name = "JSON")]
    pub study: PathBuf,

    /// Which model's residuals to plot.
    #[arg(long, value_enum, default_value_t = ModelPick::All)]
    pub model: ModelPick,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,
}

//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Column names assigned to the headerless input file, in file order.
///
/// The file itself carries no header row; the loader attaches these names so
/// columns can be addressed by name (`--x`, `--y`).
pub const COLUMN_NAMES: [&str; 9] = [
    "sex",
    "length",
    "diameter",
    "height",
    "whole_weight",
    "shucked_weight",
    "viscera_weight",
    "shell_weight",
    "rings",
];

/// Sex code from the first column of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Infant,
}

impl Sex {
    /// Parse the single-letter code used in the data file (`M`/`F`/`I`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "M" | "m" => Some(Sex::Male),
            "F" | "f" => Some(Sex::Female),
            "I" | "i" => Some(Sex::Infant),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Infant => "I",
        }
    }
}

/// One row of the dataset.
///
/// Only one predictor and the response take part in a fit; the remaining
/// columns are retained because they are present in the file and appear in
/// exports of generated samples.
#[derive(Debug, Clone)]
pub struct Observation {
    pub sex: Sex,
    pub length: f64,
    pub diameter: f64,
    pub height: f64,
    pub whole_weight: f64,
    pub shucked_weight: f64,
    pub viscera_weight: f64,
    pub shell_weight: f64,
    pub rings: f64,
}

impl Observation {
    /// Value of a continuous column by name (`None` for `sex` or unknown names).
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match name {
            "length" => Some(self.length),
            "diameter" => Some(self.diameter),
            "height" => Some(self.height),
            "whole_weight" => Some(self.whole_weight),
            "shucked_weight" => Some(self.shucked_weight),
            "viscera_weight" => Some(self.viscera_weight),
            "shell_weight" => Some(self.shell_weight),
            "rings" => Some(self.rings),
            _ => None,
        }
    }
}

/// How observation weights are derived from the base OLS fit.
///
/// All three are the same two-stage pattern: fit unweighted, model the
/// residual dispersion as a function of the predictor, invert the dispersion
/// estimate, refit. They differ only in which dispersion response is modeled
/// and how the prediction is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WeightStrategy {
    /// `w_i = 1 / yhat_i`, the fitted value itself standing in for the
    /// dispersion.
    ///
    /// This is a deliberate single-predictor simplification of the textbook
    /// "weight by 1/x" prescription. It is degenerate whenever a fitted value
    /// is non-positive (the line is unconstrained), which is reported as an
    /// error rather than silently inverted into a negative weight.
    InvFitted,
    /// Secondary OLS of `|residual|` on the predictor; `w_i = 1 / zhat_i^2`.
    AbsResidual,
    /// Secondary OLS of `residual^2` on the predictor; `w_i = 1 / |zhat_i|`.
    SquaredResidual,
}

impl WeightStrategy {
    pub const ALL: [WeightStrategy; 3] = [
        WeightStrategy::InvFitted,
        WeightStrategy::AbsResidual,
        WeightStrategy::SquaredResidual,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            WeightStrategy::InvFitted => "inverse fitted value",
            WeightStrategy::AbsResidual => "inverse squared predicted |residual|",
            WeightStrategy::SquaredResidual => "inverse predicted squared residual",
        }
    }

    /// Short machine-friendly name (CLI values, CSV headers, study JSON).
    pub fn slug(self) -> &'static str {
        match self {
            WeightStrategy::InvFitted => "inv-fitted",
            WeightStrategy::AbsResidual => "abs-residual",
            WeightStrategy::SquaredResidual => "squared-residual",
        }
    }
}

/// Which weighting strategies to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategySpec {
    /// Run every strategy and compare side by side.
    All,
    InvFitted,
    AbsResidual,
    SquaredResidual,
}

impl StrategySpec {
    pub fn resolve(self) -> Vec<WeightStrategy> {
        match self {
            StrategySpec::All => WeightStrategy::ALL.to_vec(),
            StrategySpec::InvFitted => vec![WeightStrategy::InvFitted],
            StrategySpec::AbsResidual => vec![WeightStrategy::AbsResidual],
            StrategySpec::SquaredResidual => vec![WeightStrategy::SquaredResidual],
        }
    }
}

/// Field delimiter of the input file.
///
/// `Auto` sniffs the first data line deterministically: a comma wins, then a
/// tab, then a semicolon; otherwise runs of whitespace are assumed. The
/// canonical file is comma-separated, but whitespace-separated copies are
/// common enough to support directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Delimiter {
    Auto,
    Comma,
    Tab,
    Semicolon,
    Whitespace,
}

/// Model filter for re-plotting a saved study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelPick {
    All,
    Ols,
    InvFitted,
    AbsResidual,
    SquaredResidual,
}

impl ModelPick {
    /// Does a saved model (`None` = the OLS baseline) match this pick?
    pub fn matches(self, strategy: Option<WeightStrategy>) -> bool {
        match (self, strategy) {
            (ModelPick::All, _) => true,
            (ModelPick::Ols, None) => true,
            (ModelPick::InvFitted, Some(WeightStrategy::InvFitted)) => true,
            (ModelPick::AbsResidual, Some(WeightStrategy::AbsResidual)) => true,
            (ModelPick::SquaredResidual, Some(WeightStrategy::SquaredResidual)) => true,
            _ => false,
        }
    }
}

/// One estimated coefficient with its inference statistics.
///
/// `std_error`, `t_value` and `p_value` are NaN when the residual degrees of
/// freedom are zero (a two-point fit has no dispersion estimate). The
/// inference fields go through `nullable_stat` so a study JSON containing
/// them still reads back (serde_json writes non-finite floats as `null`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoefEstimate {
    pub value: f64,
    #[serde(with = "nullable_stat")]
    pub std_error: f64,
    #[serde(with = "nullable_stat")]
    pub t_value: f64,
    #[serde(with = "nullable_stat")]
    pub p_value: f64,
}

/// Fit quality diagnostics.
///
/// For a weighted fit, `sse` is the weighted residual sum of squares and
/// `r_squared` is computed about the weighted mean of the response, so the
/// unit-weight case reduces to the classic definitions. `df` counts only
/// rows with positive weight (a zero weight drops its row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub n: usize,
    pub df: usize,
    pub sse: f64,
    pub rmse: f64,
    /// NaN when the response is constant (zero total sum of squares).
    #[serde(with = "nullable_stat")]
    pub r_squared: f64,
}

/// A fitted straight line with its diagnostics.
///
/// Immutable once computed; refitting produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineFit {
    pub intercept: CoefEstimate,
    pub slope: CoefEstimate,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub quality: FitQuality,
}

/// Ranges of the columns actually fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data_path: PathBuf,
    pub x_col: String,
    pub y_col: String,
    pub delimiter: Delimiter,
    pub strategies: Vec<WeightStrategy>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_study: Option<PathBuf>,
    pub debug_bundle: bool,
}

/// Configuration for the synthetic sample generator.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub out: PathBuf,
    pub count: usize,
    pub seed: u64,

    /// True line: `response = intercept + slope * predictor + noise`.
    pub intercept: f64,
    pub slope: f64,

    /// Noise scale: `sd(noise) = noise * predictor^gamma`, so `gamma > 0`
    /// makes the response variance grow with the predictor.
    pub noise: f64,
    pub gamma: f64,

    pub x_min: f64,
    pub x_max: f64,
}

/// Maps non-finite diagnostics to JSON `null` and back to NaN.
///
/// serde_json already writes NaN and infinity as `null`; without the
/// matching deserializer a saved two-point study could never be reloaded.
mod nullable_stat {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            s.serialize_f64(*v)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}

/// A saved study file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyFile {
    pub tool: String,
    pub source: String,
    pub x_label: String,
    pub y_label: String,
    pub stats: DatasetStats,
    pub models: Vec<StudyModel>,
}

/// One fitted model inside a saved study.
///
/// `strategy` is `None` for the OLS baseline. The weighted entries carry
/// their weight vector and the intermediate dispersion fit so a saved study
/// is fully inspectable without refitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyModel {
    pub label: String,
    pub strategy: Option<WeightStrategy>,
    pub fit: LineFit,
    pub weights: Option<Vec<f64>>,
    pub zero_weight_rows: Vec<usize>,
    pub dispersion: Option<LineFit>,
}

//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! Diagnostics that are undefined for a fit (zero residual degrees of
//! freedom) print as `--` rather than `NaN`.

use crate::domain::{CoefEstimate, FitConfig, LineFit, WeightStrategy};
use crate::fit::Study;
use crate::io::ingest::IngestedData;

/// Format the run header: source, model formula and dataset ranges.
pub fn format_run_summary(ingest: &IngestedData, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== wls - Weighted Least Squares Study ===\n");
    out.push_str(&format!("Source: {}\n", config.data_path.display()));
    out.push_str(&format!("Model: {} ~ {}\n", ingest.y_label, ingest.x_label));
    out.push_str(&format!(
        "Rows: n={} | {}=[{:.3}, {:.3}] | {}=[{:.2}, {:.2}]\n",
        ingest.stats.n_rows,
        ingest.x_label,
        ingest.stats.x_min,
        ingest.stats.x_max,
        ingest.y_label,
        ingest.stats.y_min,
        ingest.stats.y_max
    ));
    out.push_str(&format!("Strategies: {}\n", strategy_list(&config.strategies)));

    out
}

/// Section header for one model.
pub fn model_label(strategy: Option<WeightStrategy>) -> String {
    match strategy {
        None => "ols (ordinary least squares)".to_string(),
        Some(s) => format!("{} ({})", s.slug(), s.display_name()),
    }
}

/// Format one model's coefficient table and quality line.
pub fn format_fit_summary(label: &str, fit: &LineFit, x_label: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("Model: {label}\n"));
    out.push_str(
        format!(
            "{:<14} {:>12} {:>12} {:>10} {:>10}\n",
            "term", "estimate", "std_error", "t_value", "p_value"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<14} {:-<12} {:-<12} {:-<10} {:-<10}\n", "", "", "", "", "").trim_end(),
    );
    out.push('\n');
    out.push_str(coef_row("(intercept)", &fit.intercept).trim_end());
    out.push('\n');
    out.push_str(coef_row(x_label, &fit.slope).trim_end());
    out.push('\n');
    out.push_str(&format!(
        "n={} df={} R^2={} RMSE={} SSE={}\n",
        fit.quality.n,
        fit.quality.df,
        fmt_stat(fit.quality.r_squared, 4),
        fmt_stat(fit.quality.rmse, 3),
        fmt_stat(fit.quality.sse, 3)
    ));

    out
}

/// Format the side-by-side model comparison. `*` marks the highest R^2.
pub fn format_comparison(study: &Study) -> String {
    let mut rows: Vec<(&str, &LineFit)> = vec![("ols", &study.ols)];
    for outcome in &study.outcomes {
        rows.push((outcome.strategy.slug(), &outcome.fit));
    }

    let best = rows
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.1.quality
                .r_squared
                .partial_cmp(&b.1.quality.r_squared)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i);

    let mut out = String::new();
    out.push_str("Model comparison:\n");
    out.push_str(
        format!("  {:<18} {:>8} {:>12} {:>12}\n", "model", "R^2", "slope", "se(slope)").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("  {:-<18} {:-<8} {:-<12} {:-<12}\n", "", "", "", "").trim_end());
    out.push('\n');
    for (i, (label, fit)) in rows.iter().enumerate() {
        let marker = if Some(i) == best { "*" } else { " " };
        out.push_str(
            format!(
                "{marker} {:<18} {:>8} {:>12} {:>12}\n",
                label,
                fmt_stat(fit.quality.r_squared, 4),
                fmt_stat(fit.slope.value, 4),
                fmt_stat(fit.slope.std_error, 4),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format warnings for rows a strategy excluded by assigning zero weight.
///
/// Empty when no strategy dropped anything, which is the usual case.
pub fn format_zero_weight_warnings(study: &Study) -> String {
    let mut out = String::new();
    for outcome in &study.outcomes {
        if outcome.zero_weight_rows.is_empty() {
            continue;
        }
        let rows: Vec<String> = outcome
            .zero_weight_rows
            .iter()
            .map(|r| (r + 1).to_string())
            .collect();
        out.push_str(&format!(
            "warning: strategy '{}' assigned zero weight to {} row(s) (row {}); \
             those rows were excluded from its fit\n",
            outcome.strategy.slug(),
            outcome.zero_weight_rows.len(),
            rows.join(", ")
        ));
    }
    out
}

fn coef_row(term: &str, coef: &CoefEstimate) -> String {
    format!(
        "{:<14} {:>12} {:>12} {:>10} {:>10}",
        truncate(term, 14),
        fmt_stat(coef.value, 6),
        fmt_stat(coef.std_error, 6),
        fmt_stat(coef.t_value, 3),
        fmt_stat(coef.p_value, 4),
    )
}

fn strategy_list(strategies: &[WeightStrategy]) -> String {
    let slugs: Vec<&str> = strategies.iter().map(|s| s.slug()).collect();
    slugs.join(", ")
}

/// Fixed-precision formatting that renders NaN diagnostics as `--`.
fn fmt_stat(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        "--".to_string()
    } else {
        format!("{:.1$}", v, decimals)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

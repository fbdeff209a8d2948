//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the data file (or generates one)
//! - runs the OLS baseline and the weighting strategies
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, SampleArgs};
use crate::domain::{FitConfig, LineFit, SampleConfig, WeightStrategy};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `wls` binary.
pub fn run() -> Result<(), AppError> {
    // We want `wls data.csv` to behave like `wls fit --data data.csv`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_run_summary(&run.ingest, &config));

    // OLS baseline first, then each strategy in the configured order.
    print_model(None, &run.study.ols, &run.ingest.x_label, &config);
    for outcome in &run.study.outcomes {
        print_model(Some(outcome.strategy), &outcome.fit, &run.ingest.x_label, &config);
    }

    let warnings = crate::report::format_zero_weight_warnings(&run.study);
    if !warnings.is_empty() {
        println!("{warnings}");
    }

    println!("{}", crate::report::format_comparison(&run.study));

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.ingest, &run.study)?;
        println!("Wrote results CSV: {}", path.display());
    }
    if let Some(path) = &config.export_study {
        let source = config.data_path.to_string_lossy();
        let study_file = crate::io::build_study_file(&source, &run.ingest, &run.study);
        crate::io::write_study_json(path, &study_file)?;
        println!("Wrote study JSON: {}", path.display());
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(&run.ingest, &run.study, &config)?;
        println!("Wrote debug bundle: {}", path.display());
    }

    Ok(())
}

fn print_model(strategy: Option<WeightStrategy>, fit: &LineFit, x_label: &str, config: &FitConfig) {
    let label = crate::report::model_label(strategy);
    println!("{}", crate::report::format_fit_summary(&label, fit, x_label));

    if config.plot {
        let plot = crate::plot::render_residual_plot(fit, config.plot_width, config.plot_height);
        println!("{plot}");
    }
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let observations = crate::data::generate_sample(&config)?;
    crate::io::write_sample_csv(&config.out, &observations)?;

    println!(
        "Wrote {} rows to {} (seed {}, sd(eps) = {} * x^{})",
        observations.len(),
        config.out.display(),
        config.seed,
        config.noise,
        config.gamma
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let study = crate::io::read_study_json(&args.study)?;

    let mut shown = 0;
    for model in &study.models {
        if !args.model.matches(model.strategy) {
            continue;
        }
        let label = crate::report::model_label(model.strategy);
        println!("{}", crate::report::format_fit_summary(&label, &model.fit, &study.x_label));
        println!("{}", crate::plot::render_residual_plot(&model.fit, args.width, args.height));
        shown += 1;
    }

    if shown == 0 {
        return Err(AppError::usage("no model in the study file matches --model"));
    }
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        data_path: args.data.clone(),
        x_col: args.x.clone(),
        y_col: args.y.clone(),
        delimiter: args.delimiter,
        strategies: args.strategy.resolve(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_study: args.export_study.clone(),
        debug_bundle: args.debug_bundle,
    }
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        out: args.out.clone(),
        count: args.count,
        seed: args.seed,
        intercept: args.intercept,
        slope: args.slope,
        noise: args.noise,
        gamma: args.gamma,
        x_min: args.x_min,
        x_max: args.x_max,
    }
}

/// Rewrite argv so a bare data file defaults to `wls fit --data <file>`.
///
/// Rules:
/// - `wls data.csv ...`        -> `wls fit --data data.csv ...`
/// - `wls --data data.csv ...` -> `wls fit --data data.csv ...`
/// - `wls fit/sample/plot ...` -> unchanged
/// - `wls --help/--version`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "sample" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    // Otherwise the first token is a data file.
    argv.insert(1, "--data".to_string());
    argv.insert(1, "fit".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::rewrite_args;

    fn rewrite(args: &[&str]) -> Vec<String> {
        rewrite_args(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn bare_file_becomes_fit_data() {
        assert_eq!(
            rewrite(&["wls", "data.csv", "--no-plot"]),
            vec!["wls", "fit", "--data", "data.csv", "--no-plot"]
        );
    }

    #[test]
    fn leading_flag_gets_the_fit_subcommand() {
        assert_eq!(
            rewrite(&["wls", "--data", "data.csv"]),
            vec!["wls", "fit", "--data", "data.csv"]
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite(&["wls", "sample", "-n", "50"]), vec!["wls", "sample", "-n", "50"]);
        assert_eq!(rewrite(&["wls", "--help"]), vec!["wls", "--help"]);
        assert_eq!(rewrite(&["wls"]), vec!["wls"]);
    }
}

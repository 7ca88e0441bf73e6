//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves parameters (JSON file or flat vector) and env defaults
//! - runs model evaluation / the residual pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use log::{info, warn};

use crate::cli::{Command, EvalArgs, ParamSource, ParamsArgs, ResidualArgs};
use crate::config::EnvDefaults;
use crate::domain::{BiasWindow, ModelParameters, RunConfig};
use crate::error::AppError;
use crate::io::export::{ExportContext, write_sweep_csv};
use crate::io::ingest::load_bias;
use crate::io::params::{params_to_json_string, read_params_json, write_params_json};
use crate::models::{compute, compute_par, decode_flat, decode_flat_strict};

pub mod pipeline;

/// Entry point for the `beem` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let defaults = EnvDefaults::from_env()?;

    match cli.command {
        Command::Eval(args) => handle_eval(args, &defaults),
        Command::Residual(args) => handle_residual(args, &defaults),
        Command::Params(args) => handle_params(args, &defaults),
    }
}

fn handle_eval(args: EvalArgs, defaults: &EnvDefaults) -> Result<(), AppError> {
    let params = resolve_params(&args.source, defaults)?;

    let bias = match (&args.bias, &args.csv) {
        (Some(bias), _) => bias.clone(),
        (None, Some(path)) => load_bias(path)?,
        (None, None) => return Err(AppError::new(2, "Either --bias or --csv is required.")),
    };

    let predicted = if args.parallel {
        compute_par(&bias, params.exponent, &params)
    } else {
        compute(&bias, params.exponent, &params)
    };

    print!("{}", crate::report::format_values(&predicted));
    Ok(())
}

fn handle_residual(args: ResidualArgs, defaults: &EnvDefaults) -> Result<(), AppError> {
    let config = run_config_from_args(&args, defaults)?;
    let run = pipeline::run_residual(&config)?;

    for e in &run.row_errors {
        warn!("skipped line {}: {}", e.line, e.message);
    }

    println!(
        "{}",
        crate::report::format_summary(
            &run.sweep,
            run.sweeps_combined,
            &config.params,
            &config.window,
            &run.quality,
            run.relative_transmission.as_deref(),
        )
    );

    if config.table_rows > 0 {
        let worst = crate::report::worst_residuals(&run.rows, config.table_rows);
        println!("Largest residuals:");
        println!("{}", crate::report::format_residual_table(&worst));
    }

    if config.plot {
        let bias: Vec<f64> = run.rows.iter().map(|r| r.bias).collect();
        let observed: Vec<f64> = run.rows.iter().map(|r| r.observed).collect();
        let plot = crate::plot::render_ascii_plot(
            &bias,
            &observed,
            &config.params,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export {
        let ctx = ExportContext {
            params: &config.params,
            window: &config.window,
            estimated: &run.estimated,
            quality: Some(&run.quality),
            relative_transmission: run.relative_transmission.as_deref(),
        };
        write_sweep_csv(path, &run.sweep, &ctx)?;
        info!("wrote {}", path.display());
    }
    if let Some(path) = &config.export_params {
        write_params_json(path, &config.params)?;
        info!("wrote {}", path.display());
    }
    if config.debug {
        let path = crate::debug::write_debug_bundle(&run, &config)?;
        eprintln!("Debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_params(args: ParamsArgs, defaults: &EnvDefaults) -> Result<(), AppError> {
    let exponent = args.exponent.unwrap_or(defaults.exponent);
    let params = if args.strict {
        decode_flat_strict(&args.flat, exponent)?
    } else {
        decode_flat(&args.flat, exponent)?
    };

    println!("{}", params_to_json_string(&params)?);
    if let Some(path) = &args.out {
        write_params_json(path, &params)?;
    }
    Ok(())
}

/// Resolve model parameters from the CLI source.
///
/// Exponent precedence: `--exponent`, then the params file, then `BEEM_EXPONENT`.
pub fn resolve_params(source: &ParamSource, defaults: &EnvDefaults) -> Result<ModelParameters, AppError> {
    match (&source.params, &source.flat) {
        (Some(path), _) => {
            let mut params = read_params_json(path)?.params;
            if let Some(n) = source.exponent {
                params.exponent = n;
            }
            Ok(params)
        }
        (None, Some(flat)) => Ok(decode_flat(flat, source.exponent.unwrap_or(defaults.exponent))?),
        (None, None) => Err(AppError::new(2, "Either --params or --flat is required.")),
    }
}

pub fn run_config_from_args(args: &ResidualArgs, defaults: &EnvDefaults) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        csv_paths: args.csv.clone(),
        params: resolve_params(&args.source, defaults)?,
        window: BiasWindow::new(args.bias_min, args.bias_max),
        parallel: args.parallel,
        table_rows: args.rows,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
        export_params: args.export_params.clone(),
        debug: args.debug,
        debug_dir: defaults.debug_dir.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_source_uses_env_exponent_when_unset() {
        let source = ParamSource {
            params: None,
            flat: Some(vec![0.1, 3.0, 2.0]),
            exponent: None,
        };
        let defaults = EnvDefaults {
            exponent: 2.5,
            ..EnvDefaults::default()
        };
        let params = resolve_params(&source, &defaults).unwrap();
        assert_eq!(params.exponent, 2.5);
        assert_eq!(params.barrier_count(), 1);
    }

    #[test]
    fn explicit_exponent_wins() {
        let source = ParamSource {
            params: None,
            flat: Some(vec![0.1]),
            exponent: Some(1.5),
        };
        let params = resolve_params(&source, &EnvDefaults::default()).unwrap();
        assert_eq!(params.exponent, 1.5);
    }
}

//! Command-line parsing for the BEES model evaluator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the model/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "beem", version, about = "Bell-Kaiser BEEM model evaluation and residuals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the model at the given bias values and print one value per line.
    Eval(EvalArgs),
    /// Compare a parameter set against measured sweeps: residuals, R², plot, export.
    Residual(ResidualArgs),
    /// Convert a flat legacy parameter vector into a params JSON file.
    Params(ParamsArgs),
}

/// Where the model parameters come from.
#[derive(Debug, Args, Clone)]
pub struct ParamSource {
    /// Params JSON file (as written by `beem params --out`).
    #[arg(long, value_name = "JSON", conflicts_with = "flat", required_unless_present = "flat")]
    pub params: Option<PathBuf>,

    /// Flat parameter vector: noise,heights...,coefficients...
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_name = "LIST")]
    pub flat: Option<Vec<f64>>,

    /// Model exponent n (defaults to the params file value, then BEEM_EXPONENT, then 2).
    #[arg(short = 'n', long)]
    pub exponent: Option<f64>,
}

/// Options for `beem eval`.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub source: ParamSource,

    /// Bias values (comma separated).
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        value_name = "LIST",
        conflicts_with = "csv",
        required_unless_present = "csv"
    )]
    pub bias: Option<Vec<f64>>,

    /// Take bias values from a sweep CSV.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Evaluate samples in parallel.
    #[arg(long)]
    pub parallel: bool,
}

/// Options for `beem residual`.
#[derive(Debug, Args, Clone)]
pub struct ResidualArgs {
    #[command(flatten)]
    pub source: ParamSource,

    /// Sweep CSV file(s). Several files are averaged sample by sample.
    #[arg(long = "csv", value_name = "CSV", required = true)]
    pub csv: Vec<PathBuf>,

    /// Lowest bias included in the residual.
    #[arg(long, allow_hyphen_values = true)]
    pub bias_min: Option<f64>,

    /// Highest bias included in the residual.
    #[arg(long, allow_hyphen_values = true)]
    pub bias_max: Option<f64>,

    /// Print the N largest residuals.
    #[arg(long, default_value_t = 10)]
    pub rows: usize,

    /// Evaluate samples in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the (combined) sweep with the model estimate to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the parameter set to JSON.
    #[arg(long = "export-params")]
    pub export_params: Option<PathBuf>,

    /// Write a markdown debug bundle (see BEEM_DEBUG_DIR).
    #[arg(long)]
    pub debug: bool,
}

/// Options for `beem params`.
#[derive(Debug, Args, Clone)]
pub struct ParamsArgs {
    /// Flat parameter vector: noise,heights...,coefficients...
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_name = "LIST", required = true)]
    pub flat: Vec<f64>,

    /// Model exponent n.
    #[arg(short = 'n', long)]
    pub exponent: Option<f64>,

    /// Reject a vector whose heights/coefficients do not pair up instead of dropping the extra value.
    #[arg(long)]
    pub strict: bool,

    /// Write the JSON here instead of only printing it.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_eval_with_negative_flat_values() {
        let cli = Cli::try_parse_from([
            "beem", "eval", "--flat", "1e-9,-0.8,0.001", "--bias", "-1.0,-0.5", "-n", "2.5",
        ])
        .unwrap();
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        assert_eq!(args.source.flat, Some(vec![1e-9, -0.8, 0.001]));
        assert_eq!(args.bias, Some(vec![-1.0, -0.5]));
        assert_eq!(args.source.exponent, Some(2.5));
    }

    #[test]
    fn residual_accepts_several_csv_files() {
        let cli = Cli::try_parse_from([
            "beem", "residual", "--params", "p.json", "--csv", "a.csv", "--csv", "b.csv", "--bias-max", "-0.2",
        ])
        .unwrap();
        let Command::Residual(args) = cli.command else {
            panic!("expected residual");
        };
        assert_eq!(args.csv.len(), 2);
        assert_eq!(args.bias_max, Some(-0.2));
    }

    #[test]
    fn params_and_flat_conflict() {
        assert!(Cli::try_parse_from(["beem", "eval", "--params", "p.json", "--flat", "0.1", "--bias", "1"]).is_err());
        assert!(Cli::try_parse_from(["beem", "eval", "--bias", "1"]).is_err());
    }
}

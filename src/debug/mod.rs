//! Debug bundle writer for inspecting one residual run.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::models::encode_flat;

pub fn write_debug_bundle(run: &RunOutput, config: &RunConfig) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(&config.debug_dir, run, config)
}

pub fn write_debug_bundle_in(dir: &Path, run: &RunOutput, config: &RunConfig) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("beem_debug_{}_{}.md", run.sweep.meta.id(), ts));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    write_bundle(&mut file, run, config)
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;

    Ok(path)
}

fn write_bundle<W: Write>(out: &mut W, run: &RunOutput, config: &RunConfig) -> std::io::Result<()> {
    let params = &config.params;

    writeln!(out, "# beem debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    for path in &config.csv_paths {
        writeln!(out, "- input: {}", path.display())?;
    }
    writeln!(out, "- sweeps_combined: {}", run.sweeps_combined)?;
    writeln!(out, "- rows_read: {} | rows_skipped: {}", run.rows_read, run.row_errors.len())?;
    writeln!(out, "- exponent: {}", params.exponent)?;
    writeln!(out, "- flat_params: {}", fmt_vec(&encode_flat(params)))?;
    writeln!(
        out,
        "- window: [{}, {}]",
        fmt_opt(config.window.bias_min),
        fmt_opt(config.window.bias_max)
    )?;
    writeln!(out, "- parallel: {}", config.parallel)?;

    if !run.row_errors.is_empty() {
        writeln!(out, "\n## Skipped rows")?;
        for e in &run.row_errors {
            writeln!(out, "- line {}: {}", e.line, e.message)?;
        }
    }

    writeln!(out, "\n## Quality")?;
    writeln!(out, "| n | sse | rmse | r2 |")?;
    writeln!(out, "| - | - | - | - |")?;
    writeln!(
        out,
        "| {} | {:.6e} | {:.6e} | {:.6} |",
        run.quality.n, run.quality.sse, run.quality.rmse, run.quality.r_squared
    )?;

    writeln!(out, "\n## Samples")?;
    writeln!(out, "| bias | observed | predicted | residual |")?;
    writeln!(out, "| - | - | - | - |")?;
    for r in &run.rows {
        writeln!(
            out,
            "| {:.4} | {} | {} | {} |",
            r.bias,
            fmt_opt(Some(r.observed)),
            fmt_opt(Some(r.predicted)),
            fmt_opt(Some(r.residual))
        )?;
    }

    Ok(())
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6e}"),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

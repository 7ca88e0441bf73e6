//! Export a sweep with its model estimate to CSV.
//!
//! The layout is a `key : value` preamble followed by a `;`-separated table, so
//! it can be read back by [`crate::io::ingest::load_sweep`] as well as by
//! spreadsheets (skip to the line after `[DATA]`).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{BeesSweep, BiasWindow, FitQuality, ModelKind, ModelParameters};
use crate::error::AppError;

/// Everything written next to the raw sweep.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    pub params: &'a ModelParameters,
    pub window: &'a BiasWindow,
    /// Model estimate for every sample of the sweep.
    pub estimated: &'a [f64],
    pub quality: Option<&'a FitQuality>,
    pub relative_transmission: Option<&'a [f64]>,
}

/// Write a sweep CSV to `path`.
pub fn write_sweep_csv(path: &Path, sweep: &BeesSweep, ctx: &ExportContext<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_sweep(&mut out, sweep, ctx)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

/// Write the sweep export layout to any writer.
pub fn write_sweep<W: Write>(out: &mut W, sweep: &BeesSweep, ctx: &ExportContext<'_>) -> Result<(), AppError> {
    sweep.validate()?;
    if ctx.estimated.len() != sweep.len() {
        return Err(AppError::new(
            4,
            format!(
                "Estimate has {} values for a sweep of {} samples.",
                ctx.estimated.len(),
                sweep.len()
            ),
        ));
    }

    out.write_all(format_preamble(sweep, ctx).as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(&mut *out);
    writer
        .write_record(["bias", "i_beem", "i_beem_fitted", "i_tunnel", "z"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for i in 0..sweep.len() {
        let b = sweep.bias[i];
        let fitted = if ctx.window.contains(b) {
            Some(ctx.estimated[i])
        } else {
            None
        };
        writer
            .write_record([
                fmt_value(Some(b)),
                fmt_value(Some(sweep.i_beem[i])),
                fmt_value(fitted),
                fmt_value(sweep.i_tunnel.as_ref().map(|v| v[i])),
                fmt_value(sweep.pos_z.as_ref().map(|v| v[i])),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

fn format_preamble(sweep: &BeesSweep, ctx: &ExportContext<'_>) -> String {
    let meta = &sweep.meta;
    let params = ctx.params;
    let mut s = String::new();

    s.push_str("BEES DATA\n[METADATA]\n");
    s.push_str(&format!("position x : {}\n", fmt_opt(meta.pos_x)));
    s.push_str(&format!("position y : {}\n", fmt_opt(meta.pos_y)));
    s.push_str(&format!("sample : {}\n", meta.sample.as_deref().unwrap_or("None")));
    s.push_str(&format!("device : {}\n", meta.device.as_deref().unwrap_or("None")));
    s.push_str(&format!("index x : {}\n", meta.x_index));
    s.push_str(&format!("index y : {}\n", meta.y_index));
    s.push_str(&format!("sweep : {}\n", meta.number));
    s.push_str(&format!("pass : {}\n", meta.pass_number));
    s.push_str(&format!("direction : {}\n", meta.direction.display_name()));
    s.push_str(&format!("date : {}\n", meta.date.as_deref().unwrap_or("None")));

    s.push_str("[FIT PARAMETER]\n");
    s.push_str(&format!("model : {}\n", ModelKind::Bkv.display_name()));
    s.push_str(&format!("n : {}\n", params.exponent));
    s.push_str(&format!("bias min : {}\n", fmt_opt(ctx.window.bias_min)));
    s.push_str(&format!("bias max : {}\n", fmt_opt(ctx.window.bias_max)));

    s.push_str("[FITTED RESULT]\n");
    s.push_str(&format!("offset : {}\n", params.noise));
    s.push_str(&format!("barrier height : {}\n", fmt_list(&params.heights())));
    s.push_str(&format!("Transmission a : {}\n", fmt_list(&params.coefficients())));
    s.push_str(&format!(
        "Transmission R : {}\n",
        ctx.relative_transmission.map(fmt_list).unwrap_or_else(|| "None".to_string())
    ));
    s.push_str(&format!(
        "R squared : {}\n",
        ctx.quality.map(|q| q.r_squared.to_string()).unwrap_or_else(|| "None".to_string())
    ));
    s.push_str("[DATA]\n");
    s
}

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(x) if !x.is_nan() => x.to_string(),
        _ => "nan".to_string(),
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "None".to_string())
}

fn fmt_list(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Barrier;
    use crate::io::ingest::parse_sweep;

    #[test]
    fn export_reads_back() {
        let mut sweep = BeesSweep::new(vec![-1.2, -0.9, -0.6], vec![3e-12, 1e-12, 0.0]);
        sweep.i_tunnel = Some(vec![1e-9, 1.1e-9, 0.9e-9]);
        sweep.meta.x_index = 2;
        sweep.meta.number = 5;
        sweep.meta.sample = Some("Au/Si(111)".to_string());

        let params = ModelParameters::new(1e-13, 2.0, vec![Barrier::new(-0.8, 0.001)]);
        let estimated = params.predict(&sweep.bias);
        let window = BiasWindow::new(None, Some(-0.7));
        let ctx = ExportContext {
            params: &params,
            window: &window,
            estimated: &estimated,
            quality: None,
            relative_transmission: None,
        };

        let mut buf = Vec::new();
        write_sweep(&mut buf, &sweep, &ctx).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("model : Bell-Kaiser (V correction)\n"));
        assert!(text.contains("barrier height : [-0.8]\n"));
        // The last sample is outside the window, so it has no fitted value.
        assert!(text.contains("\n-0.6;0;nan;"));

        let back = parse_sweep(&text).unwrap();
        assert_eq!(back.sweep.bias, sweep.bias);
        assert_eq!(back.sweep.i_beem, sweep.i_beem);
        assert_eq!(back.sweep.i_tunnel, sweep.i_tunnel);
        assert_eq!(back.sweep.meta.x_index, 2);
        assert_eq!(back.sweep.meta.number, 5);
        assert_eq!(back.sweep.meta.sample.as_deref(), Some("Au/Si(111)"));
        assert_eq!(back.sweep.meta.device, None);
    }

    #[test]
    fn estimate_length_must_match() {
        let sweep = BeesSweep::new(vec![1.0, 2.0], vec![0.0, 0.0]);
        let params = ModelParameters::new(0.0, 2.0, Vec::new());
        let window = BiasWindow::default();
        let ctx = ExportContext {
            params: &params,
            window: &window,
            estimated: &[0.0],
            quality: None,
            relative_transmission: None,
        };
        assert_eq!(write_sweep(&mut Vec::new(), &sweep, &ctx).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn optional_channel_length_must_match() {
        let mut sweep = BeesSweep::new(vec![1.0, 2.0], vec![0.0, 0.0]);
        sweep.i_tunnel = Some(vec![1.0]);
        let params = ModelParameters::new(0.0, 2.0, Vec::new());
        let window = BiasWindow::default();
        let ctx = ExportContext {
            params: &params,
            window: &window,
            estimated: &[0.0, 0.0],
            quality: None,
            relative_transmission: None,
        };

        let mut buf = Vec::new();
        let err = write_sweep(&mut buf, &sweep, &ctx).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(buf.is_empty());

        sweep.i_tunnel = None;
        sweep.pos_z = Some(vec![0.0, 0.0, 0.0]);
        assert_eq!(write_sweep(&mut Vec::new(), &sweep, &ctx).unwrap_err().exit_code(), 4);
    }
}

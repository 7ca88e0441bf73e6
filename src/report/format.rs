//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model code stays clean and testable
//! - output changes are localized

use crate::domain::{BeesSweep, BiasWindow, FitQuality, ModelKind, ModelParameters};
use crate::report::SampleResidual;

/// Format the run summary (sweep, parameters, fit diagnostics).
pub fn format_summary(
    sweep: &BeesSweep,
    sweeps_combined: usize,
    params: &ModelParameters,
    window: &BiasWindow,
    quality: &FitQuality,
    relative_transmission: Option<&[f64]>,
) -> String {
    let mut out = String::new();

    out.push_str("=== beem - BEES model evaluation ===\n");
    out.push_str(&format!("Model: {} (n={})\n", ModelKind::Bkv.display_name(), params.exponent));
    out.push_str(&format!(
        "Sweep: {} | direction={} | samples={} | combined={}\n",
        sweep.meta.id(),
        sweep.meta.direction.display_name(),
        sweep.len(),
        sweeps_combined
    ));
    if let Some(sample) = &sweep.meta.sample {
        out.push_str(&format!(
            "Sample: {} | device={}\n",
            sample,
            sweep.meta.device.as_deref().unwrap_or("-")
        ));
    }
    if let Some(src) = &sweep.meta.src_file {
        out.push_str(&format!("Source: {}\n", src.display()));
    }
    out.push_str(&format!(
        "Window: bias=[{}, {}] | used={}\n",
        fmt_bound(window.bias_min),
        fmt_bound(window.bias_max),
        quality.n
    ));

    out.push_str("\nParameters:\n");
    out.push_str(&format!("- noise: {:.6e}\n", params.noise));
    for (j, b) in params.barriers.iter().enumerate() {
        out.push_str(&format!(
            "- barrier {}: height={:.4} V, a={:.6e}",
            j + 1,
            b.height,
            b.coefficient
        ));
        if let Some(r) = relative_transmission.and_then(|r| r.get(j)) {
            out.push_str(&format!(", R={r:.6e}"));
        }
        out.push('\n');
    }

    out.push_str("\nFit quality:\n");
    out.push_str(&format!(
        "SSE={:.6e} RMSE={:.6e} R2={:.6}\n",
        quality.sse, quality.rmse, quality.r_squared
    ));

    out
}

/// Format a residual table.
pub fn format_residual_table(rows: &[SampleResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>10}  {:>14}  {:>14}  {:>14}\n",
        "bias", "observed", "predicted", "residual"
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>10.4}  {:>14.6e}  {:>14.6e}  {:>14.6e}\n",
            r.bias, r.observed, r.predicted, r.residual
        ));
    }
    out
}

/// One value per line, full precision; used by `beem eval`.
pub fn format_values(values: &[f64]) -> String {
    let mut out = String::with_capacity(values.len() * 24);
    for v in values {
        out.push_str(&v.to_string());
        out.push('\n');
    }
    out
}

fn fmt_bound(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.3}")).unwrap_or_else(|| "-".to_string())
}

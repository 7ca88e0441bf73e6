//! CSV ingest of BEES sweeps.
//!
//! Two layouts are accepted:
//!
//! 1. The sweep export layout written by [`crate::io::export`]: a `BEES DATA`
//!    preamble of `key : value` lines grouped in `[SECTION]`s, then `[DATA]`,
//!    then a `;`-separated table (`bias;i_beem;i_beem_fitted;i_tunnel;z`).
//! 2. A plain CSV with a header row (`,` or `;`), containing at least `bias`
//!    and `i_beem` columns.
//!
//! Rows with a missing or non-finite `bias`/`i_beem` are skipped and reported.
//! Optional columns (`i_tunnel`, `z`) are kept only when every used row has a
//! finite value.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::StringRecord;
use log::{debug, warn};

use crate::domain::{BeesSweep, Direction, SweepMeta};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the sweep + row errors.
#[derive(Debug, Clone)]
pub struct IngestedSweep {
    pub sweep: BeesSweep,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedSweep {
    pub fn rows_used(&self) -> usize {
        self.sweep.len()
    }
}

/// Load one sweep from `path`.
pub fn load_sweep(path: &Path) -> Result<IngestedSweep, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut ingested = parse_sweep(&text)?;
    ingested.sweep.meta.src_file = Some(path.to_path_buf());
    debug!(
        "loaded {} of {} rows from {}",
        ingested.rows_used(),
        ingested.rows_read,
        path.display()
    );
    Ok(ingested)
}

/// Parse sweep text in either supported layout.
pub fn parse_sweep(text: &str) -> Result<IngestedSweep, AppError> {
    let (meta, table, first_table_line) = split_preamble(text);
    let (mut reader, header_map) = open_table(table)?;

    let bias_col = bias_column(&header_map)?;
    let beem_col = find_column(&header_map, &["i_beem", "ibeem", "beem"])
        .ok_or_else(|| AppError::new(2, "Missing required column 'i_beem'."))?;
    let tunnel_col = find_column(&header_map, &["i_tunnel", "itunnel", "tunnel"]);
    let z_col = find_column(&header_map, &["z", "pos_z"]);

    let mut bias = Vec::new();
    let mut i_beem = Vec::new();
    let mut i_tunnel: Vec<Option<f64>> = Vec::new();
    let mut pos_z: Vec<Option<f64>> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +1 for the header row, +1 for 1-based numbering.
        let line = first_table_line + idx + 1;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let b = match required_value(&record, bias_col, "bias") {
            Ok(v) => v,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };
        let ib = match required_value(&record, beem_col, "i_beem") {
            Ok(v) => v,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };

        bias.push(b);
        i_beem.push(ib);
        i_tunnel.push(tunnel_col.and_then(|c| optional_value(&record, c)));
        pos_z.push(z_col.and_then(|c| optional_value(&record, c)));
    }

    if bias.is_empty() {
        return Err(AppError::new(3, "No valid rows in sweep CSV."));
    }

    Ok(IngestedSweep {
        sweep: BeesSweep {
            bias,
            i_beem,
            i_tunnel: i_tunnel.into_iter().collect(),
            pos_z: pos_z.into_iter().collect(),
            meta,
        },
        row_errors,
        rows_read,
    })
}

/// Load only the bias column of a sweep file (either layout).
pub fn load_bias(path: &Path) -> Result<Vec<f64>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    parse_bias(&text)
}

/// Bias values of every row with a finite bias; other columns are ignored.
pub fn parse_bias(text: &str) -> Result<Vec<f64>, AppError> {
    let (_, table, first_table_line) = split_preamble(text);
    let (mut reader, header_map) = open_table(table)?;
    let bias_col = bias_column(&header_map)?;

    let mut bias = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let value = result
            .map_err(|e| e.to_string())
            .and_then(|record| required_value(&record, bias_col, "bias"));
        match value {
            Ok(b) => bias.push(b),
            Err(message) => warn!("skipped line {}: {message}", first_table_line + idx + 1),
        }
    }

    if bias.is_empty() {
        return Err(AppError::new(3, "No valid bias values in CSV."));
    }
    Ok(bias)
}

fn open_table(table: &str) -> Result<(csv::Reader<&[u8]>, HashMap<String, usize>), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(table))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(table.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?;
    let header_map = build_header_map(headers);
    Ok((reader, header_map))
}

fn bias_column(header_map: &HashMap<String, usize>) -> Result<usize, AppError> {
    find_column(header_map, &["bias", "v", "voltage"])
        .ok_or_else(|| AppError::new(2, "Missing required column 'bias'."))
}

/// Split off the `BEES DATA` preamble, if any.
///
/// Returns the parsed metadata, the table text and the 1-based line number of
/// the table's header row.
fn split_preamble(text: &str) -> (SweepMeta, &str, usize) {
    let mut meta = SweepMeta::default();
    let mut offset = 0usize;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        offset += line.len();
        let trimmed = line.trim().trim_start_matches('\u{feff}');
        if trimmed.eq_ignore_ascii_case("[data]") {
            return (meta, &text[offset..], idx + 2);
        }
        if let Some((key, value)) = trimmed.split_once(" : ") {
            apply_meta(&mut meta, key.trim(), value.trim());
        }
    }

    (SweepMeta::default(), text, 1)
}

fn apply_meta(meta: &mut SweepMeta, key: &str, value: &str) {
    let as_f64 = |v: &str| v.parse::<f64>().ok().filter(|x| x.is_finite());
    let as_i64 = |v: &str| v.parse::<i64>().ok();
    let as_text = |v: &str| match v {
        "" | "None" | "none" => None,
        v => Some(v.to_string()),
    };

    match key.to_ascii_lowercase().as_str() {
        "position x" => meta.pos_x = as_f64(value),
        "position y" => meta.pos_y = as_f64(value),
        "index x" => meta.x_index = as_i64(value).unwrap_or(meta.x_index),
        "index y" => meta.y_index = as_i64(value).unwrap_or(meta.y_index),
        "sweep" => meta.number = as_i64(value).unwrap_or(meta.number),
        "pass" => meta.pass_number = as_i64(value).unwrap_or(meta.pass_number),
        "direction" => {
            meta.direction = if value.eq_ignore_ascii_case("backward") {
                Direction::Backward
            } else {
                Direction::Forward
            }
        }
        "sample" => meta.sample = as_text(value),
        "device" => meta.device = as_text(value),
        "date" => meta.date = as_text(value),
        _ => {}
    }
}

fn detect_delimiter(table: &str) -> u8 {
    let header = table.lines().next().unwrap_or("");
    if header.contains(';') { b';' } else { b',' }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace([' ', '-'], "_")
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn required_value(record: &StringRecord, col: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .ok_or_else(|| format!("Missing '{name}' value."))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid '{name}' value '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite '{name}' value '{raw}'."));
    }
    Ok(v)
}

fn optional_value(record: &StringRecord, col: usize) -> Option<f64> {
    record
        .get(col)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_csv() {
        let text = "bias,i_beem,i_tunnel\n-1.0,2e-12,1e-9\n-0.5,1e-12,1e-9\n";
        let ingested = parse_sweep(text).unwrap();
        assert_eq!(ingested.sweep.bias, vec![-1.0, -0.5]);
        assert_eq!(ingested.sweep.i_beem, vec![2e-12, 1e-12]);
        assert_eq!(ingested.sweep.i_tunnel, Some(vec![1e-9, 1e-9]));
        assert_eq!(ingested.sweep.pos_z, None);
        assert!(ingested.row_errors.is_empty());
    }

    #[test]
    fn parses_export_layout_with_metadata() {
        let text = concat!(
            "BEES DATA\n",
            "[METADATA]\n",
            "position x : 1.5\n",
            "position y : None\n",
            "sample : Au/Si(111)\n",
            "device : C3\n",
            "index x : 3\n",
            "index y : 4\n",
            "sweep : 2\n",
            "pass : 1\n",
            "direction : backward\n",
            "date : 2013-01-05 00:44:47\n",
            "[DATA]\n",
            "bias;i_beem;i_beem_fitted;i_tunnel;z\n",
            "-1.0;2e-12;nan;nan;nan\n",
            "-0.5;1e-12;nan;nan;nan\n",
        );
        let ingested = parse_sweep(text).unwrap();
        let meta = &ingested.sweep.meta;
        assert_eq!(meta.pos_x, Some(1.5));
        assert_eq!(meta.pos_y, None);
        assert_eq!(meta.sample.as_deref(), Some("Au/Si(111)"));
        assert_eq!(meta.device.as_deref(), Some("C3"));
        assert_eq!((meta.x_index, meta.y_index), (3, 4));
        assert_eq!((meta.number, meta.pass_number), (2, 1));
        assert_eq!(meta.direction, Direction::Backward);
        assert_eq!(meta.date.as_deref(), Some("2013-01-05 00:44:47"));
        assert_eq!(ingested.sweep.bias, vec![-1.0, -0.5]);
        assert_eq!(ingested.sweep.i_tunnel, None);
    }

    #[test]
    fn bad_rows_are_reported_with_line_numbers() {
        let text = "bias,i_beem\n-1.0,1.0\nabc,2.0\n-0.5,nan\n0.5,3.0\n";
        let ingested = parse_sweep(text).unwrap();
        assert_eq!(ingested.sweep.bias, vec![-1.0, 0.5]);
        assert_eq!(ingested.rows_read, 4);
        let lines: Vec<usize> = ingested.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let err = parse_sweep("bias,current\n1.0,2.0\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_rows_is_an_error() {
        let err = parse_sweep("bias,i_beem\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn bias_only_file_is_enough_for_evaluation() {
        assert_eq!(parse_bias("bias\n1.0\n5.0\n10.0\n").unwrap(), vec![1.0, 5.0, 10.0]);

        // A bad current does not cost the bias sample.
        let text = "bias;i_beem\n-1.0;nan\n-0.5;abc\nxyz;1.0\n0.5;2.0\n";
        assert_eq!(parse_bias(text).unwrap(), vec![-1.0, -0.5, 0.5]);

        assert_eq!(parse_bias("i_beem\n1.0\n").unwrap_err().exit_code(), 2);
        assert_eq!(parse_bias("bias\nnan\n").unwrap_err().exit_code(), 3);
    }
}

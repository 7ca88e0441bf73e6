//! Read/write parameter JSON files.
//!
//! A params file is the portable representation of one Bell–Kaiser parameter
//! set (noise, exponent, ordered barriers). Fitting scripts write it, `beem`
//! reads it. The schema is defined by `domain::ParamsFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{ModelKind, ModelParameters, ParamsFile};
use crate::error::AppError;

pub fn params_file(params: &ModelParameters) -> ParamsFile {
    ParamsFile {
        tool: "beem".to_string(),
        model: ModelKind::Bkv,
        params: params.clone(),
    }
}

/// Write a params JSON file.
pub fn write_params_json(path: &Path, params: &ModelParameters) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create params JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &params_file(params))
        .map_err(|e| AppError::new(2, format!("Failed to write params JSON: {e}")))?;

    Ok(())
}

/// Read a params JSON file.
pub fn read_params_json(path: &Path) -> Result<ParamsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open params JSON '{}': {e}", path.display())))?;
    let params: ParamsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid params JSON: {e}")))?;
    Ok(params)
}

pub fn params_to_json_string(params: &ModelParameters) -> Result<String, AppError> {
    serde_json::to_string_pretty(&params_file(params))
        .map_err(|e| AppError::new(2, format!("Failed to serialize params: {e}")))
}

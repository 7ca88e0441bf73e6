//! Environment-backed defaults.
//!
//! `main` loads `.env` (if present) before anything reads these; real
//! environment variables win.
//!
//! - `BEEM_EXPONENT`: default model exponent when `--exponent` is not given (2.0)
//! - `BEEM_DEBUG_DIR`: where `--debug` bundles go (`debug`)
//! - `RUST_LOG`: log filter, read by `env_logger`

use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_EXPONENT: f64 = 2.0;
pub const DEFAULT_DEBUG_DIR: &str = "debug";

#[derive(Debug, Clone, PartialEq)]
pub struct EnvDefaults {
    pub exponent: f64,
    pub debug_dir: PathBuf,
}

impl Default for EnvDefaults {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
            debug_dir: PathBuf::from(DEFAULT_DEBUG_DIR),
        }
    }
}

impl EnvDefaults {
    /// Read the `BEEM_*` variables from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve defaults through an arbitrary lookup (testable without touching the process env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut defaults = Self::default();

        if let Some(raw) = lookup("BEEM_EXPONENT").filter(|s| !s.trim().is_empty()) {
            defaults.exponent = raw
                .trim()
                .parse()
                .map_err(|_| AppError::new(2, format!("Invalid BEEM_EXPONENT '{raw}'.")))?;
        }
        if let Some(dir) = lookup("BEEM_DEBUG_DIR").filter(|s| !s.trim().is_empty()) {
            defaults.debug_dir = PathBuf::from(dir.trim());
        }

        Ok(defaults)
    }
}

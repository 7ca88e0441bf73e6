//! Error types.
//!
//! Two layers:
//! - [`ModelError`]: typed failures raised by the model core and its adapters.
//!   Only shape/length violations are hard failures; numeric singularities are
//!   returned as IEEE `Inf`/`NaN` values, never as errors.
//! - [`AppError`]: what the `beem` binary reports (message + process exit code).

use thiserror::Error;

/// Failures raised by the model core and the buffer adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Two buffers that must describe the same samples have different lengths.
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A flat parameter vector that cannot be split into noise, heights and coefficients.
    #[error("malformed parameter vector of length {len}: expected [noise, heights.., coefficients..]")]
    MalformedParameters { len: usize },
}

/// Exit-coded error surfaced by the binary.
///
/// Exit codes:
/// - 2: I/O or input format problem
/// - 3: no usable data
/// - 4: model / shape failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_maps_to_exit_code_4() {
        let err: AppError = ModelError::ShapeMismatch { expected: 3, actual: 2 }.into();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "shape mismatch: expected 3 values, got 2");
    }
}

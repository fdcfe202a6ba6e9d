//! Unified error type for the nettwin crates.
//!
//! Domain code propagates `NettwinError` at API boundaries; algorithm-level
//! helpers that compose many fallible steps use `anyhow` and convert at the
//! edge.

use thiserror::Error;

/// Unified error type for model construction, validation, and analysis.
#[derive(Error, Debug)]
pub enum NettwinError {
    /// I/O errors (scenario files, report export)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model integrity errors raised by the validator
    #[error("Validation error: {0}")]
    Validation(String),

    /// Power-flow backend errors (not divergence, which is a normal outcome)
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors (unknown backend name, bad scenario parameters)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network structure errors (dangling bus references, duplicate HVDC)
    #[error("Network error: {0}")]
    Network(String),

    /// Generic errors wrapping external failures
    #[error("{0}")]
    Other(String),
}

/// Convenience alias for Results using [`NettwinError`].
pub type NettwinResult<T> = Result<T, NettwinError>;

impl From<anyhow::Error> for NettwinError {
    fn from(err: anyhow::Error) -> Self {
        NettwinError::Other(err.to_string())
    }
}

impl From<String> for NettwinError {
    fn from(s: String) -> Self {
        NettwinError::Other(s)
    }
}

impl From<&str> for NettwinError {
    fn from(s: &str) -> Self {
        NettwinError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_category_and_message() {
        let err = NettwinError::Validation("bus voltage must be positive".into());
        assert!(err.to_string().contains("Validation error"));
        assert!(err.to_string().contains("bus voltage"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing scenario");
        let err: NettwinError = io.into();
        assert!(matches!(err, NettwinError::Io(_)));
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> NettwinResult<()> {
            Err(NettwinError::Config("unknown backend".into()))
        }
        fn outer() -> NettwinResult<()> {
            inner()?;
            Ok(())
        }
        assert!(outer().is_err());
    }
}

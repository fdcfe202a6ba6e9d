use super::backend::{GaussBackend, LinearSystemBackend, LuBackend};
use crate::{NettwinError, NettwinResult};
use std::sync::Arc;

/// Registry of available linear-system backends.
///
/// Resolving a backend by name happens once, at configuration time; an
/// unknown name is a configuration error raised before any solve is
/// attempted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverKind {
    #[default]
    Gauss,
    Faer,
}

impl SolverKind {
    pub fn from_name(input: &str) -> NettwinResult<Self> {
        match input.to_ascii_lowercase().as_str() {
            "gauss" | "default" => Ok(SolverKind::Gauss),
            "faer" | "lu" => Ok(SolverKind::Faer),
            other => Err(NettwinError::Config(format!(
                "unknown solver backend '{}'; supported values: {}",
                other,
                Self::available().join(", ")
            ))),
        }
    }

    pub fn build_backend(self) -> Arc<dyn LinearSystemBackend> {
        match self {
            SolverKind::Gauss => Arc::new(GaussBackend),
            SolverKind::Faer => Arc::new(LuBackend),
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["gauss", "faer"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Gauss => "gauss",
            SolverKind::Faer => "faer",
        }
    }
}

//! Loading classification against fixed thermal thresholds.
//!
//! The thresholds are defined once, here, and shared by the engine, the
//! report aggregator, and every presentation layer. Boundaries are exact:
//! `>` on the high side of a band, `<=` on the low side, so 100.0 % is a
//! warning and anything above it is critical.

use serde::{Deserialize, Serialize};

/// Loading above this percentage is a warning.
pub const WARNING_THRESHOLD_PERCENT: f64 = 90.0;
/// Loading above this percentage is a critical overload.
pub const CRITICAL_THRESHOLD_PERCENT: f64 = 100.0;

/// Post-contingency operating state of the grid.
///
/// Ordered by severity, least to most severe, so `Ord` comparisons express
/// "at least as severe as".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingState {
    /// Within limits, at most 90 % loading
    Secure,
    /// Above 90 % and up to 100 % loading
    Warning,
    /// Thermal limit exceeded on at least one line
    Critical,
    /// The power flow did not converge; no loading value exists
    Collapse,
}

impl OperatingState {
    /// Critical overloads and collapses both count as violations of the N-1
    /// criterion; they are reported distinctly but aggregated together.
    pub fn is_violation(&self) -> bool {
        matches!(self, OperatingState::Critical | OperatingState::Collapse)
    }
}

impl std::fmt::Display for OperatingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OperatingState::Secure => "Secure",
            OperatingState::Warning => "Warning",
            OperatingState::Critical => "Critical Overload",
            OperatingState::Collapse => "Collapse",
        };
        write!(f, "{label}")
    }
}

/// Map a maximum line loading percentage to an operating state.
pub fn classify_loading(max_loading_percent: f64) -> OperatingState {
    if max_loading_percent > CRITICAL_THRESHOLD_PERCENT {
        OperatingState::Critical
    } else if max_loading_percent > WARNING_THRESHOLD_PERCENT {
        OperatingState::Warning
    } else {
        OperatingState::Secure
    }
}

/// Classify a solve outcome: a missing loading value means the solve
/// diverged and maps to [`OperatingState::Collapse`], never to `Critical`.
pub fn classify(max_loading_percent: Option<f64>) -> OperatingState {
    match max_loading_percent {
        Some(pct) => classify_loading(pct),
        None => OperatingState::Collapse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_have_exact_boundaries() {
        assert_eq!(classify_loading(0.0), OperatingState::Secure);
        assert_eq!(classify_loading(90.0), OperatingState::Secure);
        assert_eq!(classify_loading(90.0001), OperatingState::Warning);
        assert_eq!(classify_loading(100.0), OperatingState::Warning);
        assert_eq!(classify_loading(100.0001), OperatingState::Critical);
        assert_eq!(classify_loading(145.2), OperatingState::Critical);
    }

    #[test]
    fn classification_is_monotone_in_loading() {
        let samples = [
            0.0, 10.0, 50.0, 89.9, 90.0, 90.1, 95.0, 99.9, 100.0, 100.1, 120.0, 200.0,
        ];
        for pair in samples.windows(2) {
            assert!(
                classify_loading(pair[0]) <= classify_loading(pair[1]),
                "severity decreased between {} and {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn divergence_is_collapse_not_critical() {
        assert_eq!(classify(None), OperatingState::Collapse);
        assert_ne!(classify(None), OperatingState::Critical);
        assert_eq!(classify(Some(120.0)), OperatingState::Critical);
    }

    #[test]
    fn violation_grades() {
        assert!(OperatingState::Critical.is_violation());
        assert!(OperatingState::Collapse.is_violation());
        assert!(!OperatingState::Warning.is_violation());
        assert!(!OperatingState::Secure.is_violation());
    }
}

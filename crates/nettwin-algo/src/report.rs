//! Reduction of an ordered contingency result sequence into the planning
//! summary: headline figures and a recommendation.

use crate::classify::OperatingState;
use crate::contingency::{ContingencyLabel, ContingencyResult};
use serde::Serialize;

/// Planning recommendation, selected by strict priority: violations dominate
/// warnings, warnings dominate secure. The three outcomes form a total order
/// and are evaluated in that sequence only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ActionRequired,
    Monitor,
    Secure,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Recommendation::ActionRequired => {
                "Action required: redispatch or capacity expansion needed to restore N-1 security"
            }
            Recommendation::Monitor => {
                "Monitor: system secure but operating near thermal limits"
            }
            Recommendation::Secure => "Secure: network satisfies the N-1 criterion",
        };
        write!(f, "{text}")
    }
}

/// Headline figures derived from the full result sequence.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    /// Base-case maximum loading; absent when the base case diverged.
    pub base_case_loading_percent: Option<f64>,
    /// Results classified critical or collapse.
    pub violation_count: usize,
    /// Results classified warning.
    pub warning_count: usize,
    pub recommendation: Recommendation,
}

/// Reduce the ordered result sequence into a [`ReportSummary`].
pub fn summarize(results: &[ContingencyResult]) -> ReportSummary {
    let violation_count = results.iter().filter(|r| r.state.is_violation()).count();
    let warning_count = results
        .iter()
        .filter(|r| r.state == OperatingState::Warning)
        .count();
    let base_case_loading_percent = results
        .iter()
        .find(|r| r.label == ContingencyLabel::BaseCase)
        .and_then(|r| r.max_loading_percent);

    let recommendation = if violation_count > 0 {
        Recommendation::ActionRequired
    } else if warning_count > 0 {
        Recommendation::Monitor
    } else {
        Recommendation::Secure
    };

    ReportSummary {
        base_case_loading_percent,
        violation_count,
        warning_count,
        recommendation,
    }
}

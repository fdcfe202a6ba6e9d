//! The power-flow port: the one capability the contingency engine consumes.
//!
//! Divergence is a normal, reportable outcome and therefore part of the
//! return value, not an `Err`. `Err` is reserved for backend failures and
//! malformed input; the engine must never mistake either for a low-loading
//! solution.

use crate::{BusId, LineId, Network};
use anyhow::Result;
use std::collections::HashMap;

/// A converged power-flow solution.
#[derive(Debug, Clone, Default)]
pub struct PowerFlowSolution {
    /// Loading percentage for every line that was in service in the solved
    /// state (the outaged line, if any, is absent).
    pub line_loading_percent: HashMap<LineId, f64>,
    /// Voltage magnitude per bus.
    pub bus_voltage_pu: HashMap<BusId, f64>,
}

impl PowerFlowSolution {
    /// Maximum loading over all solved lines; `None` when no line was in
    /// service.
    pub fn max_loading_percent(&self) -> Option<f64> {
        self.line_loading_percent
            .values()
            .copied()
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

/// Outcome of one solve attempt.
#[derive(Debug, Clone)]
pub enum PowerFlowOutcome {
    Converged(PowerFlowSolution),
    /// The iteration did not find a valid operating point. Distinct from an
    /// `Err`: the grid state is the problem, not the solver.
    Diverged,
}

impl PowerFlowOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, PowerFlowOutcome::Converged(_))
    }
}

/// Solve-the-network contract.
///
/// `outage` names one line to treat as out of service for this solve only;
/// the network itself is not modified. Implementations must also respect the
/// configured `in_service` flags.
pub trait PowerFlowPort: Send + Sync {
    fn solve(&self, network: &Network, outage: Option<LineId>) -> Result<PowerFlowOutcome>;
}

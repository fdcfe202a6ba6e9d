//! The N-1 contingency engine.
//!
//! One base-case solve with every configured line in service, then one trial
//! per AC line in network line order. An outage is a parameter of the solve,
//! never a mutation of the shared network, so a failed trial cannot corrupt
//! the state seen by later trials and the configured `in_service` flags are
//! untouched throughout. The HVDC link is not an AC line and is never
//! tripped; it shifts the base power balance identically in every trial.

use crate::classify::{classify, OperatingState};
use crate::report::{summarize, ReportSummary};
use nettwin_core::{LineId, Network, PowerFlowOutcome, PowerFlowPort};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which element a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContingencyLabel {
    BaseCase,
    /// The named AC line was out for this trial.
    LineTrip(String),
}

impl std::fmt::Display for ContingencyLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContingencyLabel::BaseCase => write!(f, "Base Case"),
            ContingencyLabel::LineTrip(name) => write!(f, "Trip {name}"),
        }
    }
}

impl Serialize for ContingencyLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the analysis: the canonical result schema used by the engine,
/// the aggregator, and every presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ContingencyResult {
    pub label: ContingencyLabel,
    pub state: OperatingState,
    /// Maximum loading over the lines in service during the trial; `None`
    /// exactly when the solve diverged.
    pub max_loading_percent: Option<f64>,
}

/// The ordered outcome of a full N-1 run: base case first, then one entry
/// per AC line in network line order.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    pub results: Vec<ContingencyResult>,
}

impl AnalysisResults {
    pub fn iter(&self) -> impl Iterator<Item = &ContingencyResult> {
        self.results.iter()
    }

    pub fn base_case(&self) -> Option<&ContingencyResult> {
        self.results
            .iter()
            .find(|r| r.label == ContingencyLabel::BaseCase)
    }

    pub fn summarize(&self) -> ReportSummary {
        summarize(&self.results)
    }
}

/// Drives the trip/solve loop against an injected power-flow port.
///
/// The port is supplied at construction; whether it is the bundled DC
/// approximation or a test double, the engine logic is identical. A missing
/// solve capability is therefore a configuration error surfaced before the
/// engine exists, not a runtime branch.
pub struct ContingencyEngine {
    port: Arc<dyn PowerFlowPort>,
}

impl ContingencyEngine {
    pub fn new(port: Arc<dyn PowerFlowPort>) -> Self {
        Self { port }
    }

    /// Run the base case and every single-line trial sequentially.
    pub fn run(&self, network: &Network) -> AnalysisResults {
        let mut results = Vec::with_capacity(1 + network.lines().len());
        results.push(self.trial(network, ContingencyLabel::BaseCase, None));
        for line in network.lines() {
            results.push(self.trial(
                network,
                ContingencyLabel::LineTrip(line.name.clone()),
                Some(line.id),
            ));
        }
        AnalysisResults { results }
    }

    /// Run the trials in parallel. Each trial reads the shared network and
    /// carries its outage as a solve parameter, so no per-trial copy and no
    /// locking is needed. Result order matches [`ContingencyEngine::run`].
    pub fn run_parallel(&self, network: &Network) -> AnalysisResults {
        let trials: Vec<(String, LineId)> = network
            .lines()
            .iter()
            .map(|line| (line.name.clone(), line.id))
            .collect();

        let mut results = Vec::with_capacity(1 + trials.len());
        results.push(self.trial(network, ContingencyLabel::BaseCase, None));
        results.par_extend(trials.par_iter().map(|(name, id)| {
            self.trial(network, ContingencyLabel::LineTrip(name.clone()), Some(*id))
        }));
        AnalysisResults { results }
    }

    fn trial(
        &self,
        network: &Network,
        label: ContingencyLabel,
        outage: Option<LineId>,
    ) -> ContingencyResult {
        match self.port.solve(network, outage) {
            Ok(PowerFlowOutcome::Converged(solution)) => {
                let loading = solution.max_loading_percent().unwrap_or(0.0);
                ContingencyResult {
                    state: classify(Some(loading)),
                    max_loading_percent: Some(loading),
                    label,
                }
            }
            Ok(PowerFlowOutcome::Diverged) => {
                debug!(trial = %label, "power flow diverged");
                ContingencyResult {
                    state: OperatingState::Collapse,
                    max_loading_percent: None,
                    label,
                }
            }
            // A failing trial is recorded and the loop continues; the report
            // must cover every line even when individual solves break.
            Err(err) => {
                warn!(trial = %label, error = %err, "power flow backend failed");
                ContingencyResult {
                    state: OperatingState::Collapse,
                    max_loading_percent: None,
                    label,
                }
            }
        }
    }
}

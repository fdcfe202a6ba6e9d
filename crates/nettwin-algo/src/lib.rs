//! # nettwin-algo: N-1 contingency analysis
//!
//! The contingency engine, the loading classifier, the report aggregator,
//! and the bundled DC-approximation implementation of the power-flow port.
//!
//! Pipeline: a validated [`nettwin_core::Network`] goes into
//! [`ContingencyEngine::run`], which produces an ordered
//! [`AnalysisResults`] sequence (base case first, then one result per AC
//! line); [`summarize`] reduces it to headline figures and a
//! [`Recommendation`].

pub mod classify;
pub mod contingency;
pub mod power_flow;
pub mod report;

pub use classify::{
    classify, classify_loading, OperatingState, CRITICAL_THRESHOLD_PERCENT,
    WARNING_THRESHOLD_PERCENT,
};
pub use contingency::{AnalysisResults, ContingencyEngine, ContingencyLabel, ContingencyResult};
pub use power_flow::DcLoadFlow;
pub use report::{summarize, Recommendation, ReportSummary};

//! Solver interfaces: the power-flow port consumed by the contingency engine
//! and the linear-system backends a DC-grade implementation can build on.

pub mod backend;
pub mod port;
pub mod registry;

pub use backend::{GaussBackend, LinearSystemBackend, LuBackend};
pub use port::{PowerFlowOutcome, PowerFlowPort, PowerFlowSolution};
pub use registry::SolverKind;

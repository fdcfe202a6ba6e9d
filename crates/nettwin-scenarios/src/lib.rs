//! # nettwin-scenarios: scenario surface and network builder
//!
//! What-if dispatch scenarios for the three-bus study grid: a serde-backed
//! parameter spec (wind, load, HVDC, reactive ratio) and the builder that
//! turns one spec into a [`nettwin_core::Network`].

pub mod build;
pub mod spec;

pub use build::build_network;
pub use spec::{load_spec_from_path, ScenarioSpec, MAX_DIAL_MW};

//! Scenario parameter surface.
//!
//! A scenario is the small set of dials a planner turns between analysis
//! runs: wind injection, industrial load, whether the HVDC link is in
//! operation, and the power factor used to derive the load's reactive
//! component. Specs deserialize from YAML or JSON files; defaults reproduce
//! the reference dispatch case.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Slider bound on the injection and load dials.
pub const MAX_DIAL_MW: f64 = 4000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Wind park injection at the north bus.
    #[serde(default = "default_wind_mw")]
    pub wind_mw: f64,
    /// Industrial load at the south bus.
    #[serde(default = "default_load_mw")]
    pub load_mw: f64,
    /// Whether the north-south HVDC link is in operation.
    #[serde(default = "default_hvdc_enabled")]
    pub hvdc_enabled: bool,
    /// Reactive load as a fraction of active load. Named explicitly so no
    /// ratio is hard-wired into the network builder.
    #[serde(default = "default_reactive_ratio")]
    pub reactive_ratio: f64,
}

fn default_wind_mw() -> f64 {
    2000.0
}

fn default_load_mw() -> f64 {
    2300.0
}

fn default_hvdc_enabled() -> bool {
    true
}

fn default_reactive_ratio() -> f64 {
    0.2
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self {
            wind_mw: default_wind_mw(),
            load_mw: default_load_mw(),
            hvdc_enabled: default_hvdc_enabled(),
            reactive_ratio: default_reactive_ratio(),
        }
    }
}

impl ScenarioSpec {
    /// Caller-side range checks mirroring the dashboard dial bounds. The
    /// network builder itself accepts anything; physical integrity is the
    /// validator's job.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_DIAL_MW).contains(&self.wind_mw) {
            return Err(anyhow!(
                "wind injection {} MW outside the 0-{} MW range",
                self.wind_mw,
                MAX_DIAL_MW
            ));
        }
        if !(0.0..=MAX_DIAL_MW).contains(&self.load_mw) {
            return Err(anyhow!(
                "load magnitude {} MW outside the 0-{} MW range",
                self.load_mw,
                MAX_DIAL_MW
            ));
        }
        if !(0.0..=1.0).contains(&self.reactive_ratio) {
            return Err(anyhow!(
                "reactive ratio {} outside the 0-1 range",
                self.reactive_ratio
            ));
        }
        Ok(())
    }
}

/// Load a scenario spec from a YAML or JSON file, chosen by extension.
pub fn load_spec_from_path(path: &Path) -> Result<ScenarioSpec> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario spec '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario spec yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario spec json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing scenario spec"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_reproduce_the_reference_case() {
        let spec = ScenarioSpec::default();
        assert_eq!(spec.wind_mw, 2000.0);
        assert_eq!(spec.load_mw, 2300.0);
        assert!(spec.hvdc_enabled);
        assert_eq!(spec.reactive_ratio, 0.2);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn out_of_range_dials_are_rejected() {
        let mut spec = ScenarioSpec::default();
        spec.wind_mw = 4500.0;
        assert!(spec.validate().is_err());

        let mut spec = ScenarioSpec::default();
        spec.load_mw = -1.0;
        assert!(spec.validate().is_err());

        let mut spec = ScenarioSpec::default();
        spec.reactive_ratio = 1.5;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn yaml_file_loads_with_partial_fields() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "wind_mw: 1500\nhvdc_enabled: false").unwrap();
        let spec = load_spec_from_path(file.path()).unwrap();
        assert_eq!(spec.wind_mw, 1500.0);
        assert!(!spec.hvdc_enabled);
        // Unset fields fall back to defaults.
        assert_eq!(spec.load_mw, 2300.0);
        assert_eq!(spec.reactive_ratio, 0.2);
    }

    #[test]
    fn json_file_loads_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"load_mw\": 1000, \"reactive_ratio\": 0.1}}").unwrap();
        let spec = load_spec_from_path(file.path()).unwrap();
        assert_eq!(spec.load_mw, 1000.0);
        assert_eq!(spec.reactive_ratio, 0.1);
    }

    #[test]
    fn missing_file_is_a_readable_error() {
        let err = load_spec_from_path(Path::new("/nonexistent/spec.yaml")).unwrap_err();
        assert!(err.to_string().contains("reading scenario spec"));
    }
}

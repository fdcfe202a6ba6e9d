//! DC-approximation power flow implementing the [`PowerFlowPort`] contract.
//!
//! Linearized load flow: per connected AC island, solve B'θ = P where B' is
//! the susceptance matrix built from total series reactances (each line
//! contributes +1/x on the diagonals and -1/x off-diagonal), θ the bus angle
//! vector, and P the net injections (generation minus load, plus the HVDC
//! terminal transfers). The island's angle reference is its slack bus or,
//! failing that, an HVDC terminal whose converter holds the voltage. Branch
//! flows follow as Δθ/x, and loading is the implied current against the
//! thermal limit:
//!
//! ```text
//! loading % = 100 · |P_flow| / (√3 · V_kV · vm · i_max)
//! ```
//!
//! Reactive flow is neglected, as usual for the DC approximation; the model's
//! reactive data is carried for AC-grade ports.
//!
//! Divergence is an outcome, not an error: an island that has demand but no
//! reference to balance it, or a singular reduced system, yields
//! [`PowerFlowOutcome::Diverged`].

use anyhow::{anyhow, Result};
use nettwin_core::{
    bus_components, BusId, Edge, Line, LineId, LinearSystemBackend, Network, PowerFlowOutcome,
    PowerFlowPort, PowerFlowSolution,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
/// Reactances are clamped away from zero to keep the susceptance finite.
const MIN_REACTANCE_OHM: f64 = 1e-6;
/// An unreferenced island with less net imbalance than this still solves
/// (any bus serves as angle datum); beyond it there is nothing to absorb the
/// mismatch and the island diverges.
const DEFAULT_IMBALANCE_TOLERANCE_MW: f64 = 1.0;

/// DC load flow over a pluggable linear-system backend.
pub struct DcLoadFlow {
    backend: Arc<dyn LinearSystemBackend>,
    imbalance_tolerance_mw: f64,
}

impl DcLoadFlow {
    pub fn new(backend: Arc<dyn LinearSystemBackend>) -> Self {
        Self {
            backend,
            imbalance_tolerance_mw: DEFAULT_IMBALANCE_TOLERANCE_MW,
        }
    }

    pub fn with_imbalance_tolerance(mut self, tolerance_mw: f64) -> Self {
        self.imbalance_tolerance_mw = tolerance_mw;
        self
    }

    /// Net MW injection per bus: dispatched generation minus load, plus the
    /// HVDC transfer (withdrawal at the sending end, delivery net of losses
    /// at the receiving end). Slack injections are left out; the reference
    /// absorbs the residual.
    fn injections(&self, network: &Network) -> Result<HashMap<BusId, f64>> {
        let known: HashSet<_> = network.buses().iter().map(|b| b.id).collect();
        let mut injections: HashMap<BusId, f64> = HashMap::new();

        for gen in network.generators() {
            if !known.contains(&gen.bus) {
                return Err(anyhow!("generator '{}' hosted on missing bus", gen.name));
            }
            if !gen.slack {
                *injections.entry(gen.bus).or_insert(0.0) += gen.active_power.value();
            }
        }
        for load in network.loads() {
            if !known.contains(&load.bus) {
                return Err(anyhow!("load '{}' hosted on missing bus", load.name));
            }
            *injections.entry(load.bus).or_insert(0.0) -= load.active_power.value();
        }
        if let Some(link) = network.hvdc_link() {
            *injections.entry(link.from_bus).or_insert(0.0) -= link.transfer.value();
            *injections.entry(link.to_bus).or_insert(0.0) += link.delivered_mw();
        }
        Ok(injections)
    }
}

impl PowerFlowPort for DcLoadFlow {
    fn solve(&self, network: &Network, outage: Option<LineId>) -> Result<PowerFlowOutcome> {
        let injections = self.injections(network)?;

        let active = |line: &Line| line.in_service && Some(line.id) != outage;
        let islands = bus_components(network, |edge| {
            matches!(edge, Edge::Line(line) if active(line))
        });

        let slack_buses: HashSet<_> = network
            .generators()
            .iter()
            .filter(|g| g.slack)
            .map(|g| g.bus)
            .collect();
        let hvdc = network.hvdc_link();

        let mut angles: HashMap<BusId, f64> = HashMap::new();
        let mut voltages: HashMap<BusId, f64> = HashMap::new();

        for island in &islands {
            // Angle reference: a slack bus, else an HVDC terminal, else an
            // arbitrary datum when the island is essentially balanced.
            let slack = island
                .buses
                .iter()
                .copied()
                .find(|b| slack_buses.contains(b));
            let converter = island.buses.iter().copied().find(|b| {
                hvdc.map_or(false, |link| link.from_bus == *b || link.to_bus == *b)
            });
            let reference = match slack.or(converter) {
                Some(bus) => bus,
                None => {
                    let imbalance: f64 = island
                        .buses
                        .iter()
                        .map(|b| injections.get(b).copied().unwrap_or(0.0))
                        .sum();
                    if imbalance.abs() > self.imbalance_tolerance_mw {
                        debug!(
                            imbalance_mw = imbalance,
                            "island without reference cannot absorb its mismatch"
                        );
                        return Ok(PowerFlowOutcome::Diverged);
                    }
                    island.buses[0]
                }
            };

            let vm = slack
                .and_then(|bus| {
                    network
                        .generators_at_bus(bus)
                        .iter()
                        .find_map(|g| g.voltage_setpoint)
                })
                .or_else(|| {
                    hvdc.and_then(|link| match converter {
                        Some(bus) if bus == link.from_bus => Some(link.vm_from),
                        Some(bus) if bus == link.to_bus => Some(link.vm_to),
                        _ => None,
                    })
                })
                .map_or(1.0, |pu| pu.value());

            // Reduced system over the island with the reference row/column
            // dropped, which removes the angle singularity.
            let unknowns: Vec<_> = island
                .buses
                .iter()
                .copied()
                .filter(|b| *b != reference)
                .collect();
            let index_of: HashMap<_, _> = unknowns
                .iter()
                .enumerate()
                .map(|(i, b)| (*b, i))
                .collect();
            let n = unknowns.len();

            if n > 0 {
                let mut matrix = vec![vec![0.0; n]; n];
                // The reference's own injection is absent from the rhs; the
                // datum absorbs it by definition.
                let rhs: Vec<f64> = unknowns
                    .iter()
                    .map(|b| injections.get(b).copied().unwrap_or(0.0))
                    .collect();

                let island_set: HashSet<_> = island.buses.iter().copied().collect();
                for edge in network.graph.edge_weights() {
                    let line = match edge {
                        Edge::Line(line) if active(line) => line,
                        _ => continue,
                    };
                    if !island_set.contains(&line.from_bus) {
                        continue;
                    }
                    let b = 1.0 / line.series_reactance_ohm().abs().max(MIN_REACTANCE_OHM);
                    match (index_of.get(&line.from_bus), index_of.get(&line.to_bus)) {
                        (Some(&i), Some(&j)) => {
                            matrix[i][i] += b;
                            matrix[j][j] += b;
                            matrix[i][j] -= b;
                            matrix[j][i] -= b;
                        }
                        (Some(&i), None) => matrix[i][i] += b,
                        (None, Some(&j)) => matrix[j][j] += b,
                        (None, None) => {}
                    }
                }

                let solution = match self.backend.solve(&matrix, &rhs) {
                    Ok(solution) => solution,
                    Err(err) => {
                        debug!(error = %err, "reduced susceptance system did not solve");
                        return Ok(PowerFlowOutcome::Diverged);
                    }
                };
                for (bus, theta) in unknowns.iter().zip(solution) {
                    angles.insert(*bus, theta);
                }
            }
            angles.insert(reference, 0.0);
            for bus in &island.buses {
                voltages.insert(*bus, vm);
            }
        }

        // Flows and loadings for every line in service in this trial.
        let mut line_loading_percent = HashMap::new();
        for line in network.lines() {
            if !active(line) {
                continue;
            }
            let theta_from = angles.get(&line.from_bus).copied().unwrap_or(0.0);
            let theta_to = angles.get(&line.to_bus).copied().unwrap_or(0.0);
            let x = line.series_reactance_ohm().abs().max(MIN_REACTANCE_OHM);
            let flow_mw = (theta_from - theta_to) / x;

            let bus = network
                .bus(line.from_bus)
                .ok_or_else(|| anyhow!("line '{}' references missing bus", line.name))?;
            let vm = voltages.get(&line.from_bus).copied().unwrap_or(1.0);
            let current_ka = flow_mw.abs() / (SQRT_3 * bus.voltage_kv.value() * vm);
            line_loading_percent.insert(line.id, 100.0 * current_ka / line.max_i.value());
        }

        Ok(PowerFlowOutcome::Converged(PowerFlowSolution {
            line_loading_percent,
            bus_voltage_pu: voltages,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nettwin_core::{GaussBackend, LineId, SolverKind};
    use nettwin_scenarios::{build_network, ScenarioSpec};

    fn solver() -> DcLoadFlow {
        DcLoadFlow::new(Arc::new(GaussBackend))
    }

    fn reference_spec() -> ScenarioSpec {
        ScenarioSpec {
            wind_mw: 2000.0,
            load_mw: 2300.0,
            hvdc_enabled: true,
            reactive_ratio: 0.2,
        }
    }

    fn loading(outcome: &PowerFlowOutcome, line: usize) -> f64 {
        match outcome {
            PowerFlowOutcome::Converged(sol) => sol.line_loading_percent[&LineId::new(line)],
            PowerFlowOutcome::Diverged => panic!("expected convergence"),
        }
    }

    #[test]
    fn reference_base_case_splits_the_corridor() {
        let network = build_network(&reference_spec());
        let outcome = solver().solve(&network, None).unwrap();

        // 2300 MW load minus 980 MW HVDC delivery leaves 1320 MW on the AC
        // path: 660 MW per parallel corridor line, 1320 MW on central-south.
        let nc_a = loading(&outcome, 0);
        let nc_b = loading(&outcome, 1);
        let cs = loading(&outcome, 2);
        assert!((nc_a - nc_b).abs() < 1e-9);
        assert!((nc_a - 49.2).abs() < 0.5, "corridor loading {nc_a}");
        assert!((cs - 98.3).abs() < 0.5, "south loading {cs}");

        if let PowerFlowOutcome::Converged(sol) = &outcome {
            let max = sol.max_loading_percent().unwrap();
            assert!(max > 90.0 && max < 100.0);
        }
    }

    #[test]
    fn tripping_one_parallel_line_doubles_corridor_loading() {
        let network = build_network(&reference_spec());
        let base = solver().solve(&network, None).unwrap();
        let tripped = solver().solve(&network, Some(LineId::new(0))).unwrap();

        let before = loading(&base, 1);
        let after = loading(&tripped, 1);
        assert!((after / before - 2.0).abs() < 1e-6);
        assert!(after > 90.0 && after <= 100.0);
        if let PowerFlowOutcome::Converged(sol) = &tripped {
            assert!(!sol.line_loading_percent.contains_key(&LineId::new(0)));
        }
    }

    #[test]
    fn hvdc_carries_the_south_when_its_ac_path_trips() {
        let network = build_network(&reference_spec());
        let outcome = solver().solve(&network, Some(LineId::new(2))).unwrap();

        // The south bus hangs on the DC link alone; nothing flows through
        // the AC corridor any more.
        assert!(outcome.is_converged());
        assert!(loading(&outcome, 0) < 1.0);
        assert!(loading(&outcome, 1) < 1.0);
    }

    #[test]
    fn south_island_without_hvdc_diverges() {
        let spec = ScenarioSpec {
            hvdc_enabled: false,
            ..reference_spec()
        };
        let network = build_network(&spec);
        let outcome = solver().solve(&network, Some(LineId::new(2))).unwrap();
        assert!(matches!(outcome, PowerFlowOutcome::Diverged));
    }

    #[test]
    fn idle_grid_is_unloaded() {
        let spec = ScenarioSpec {
            wind_mw: 0.0,
            load_mw: 0.0,
            hvdc_enabled: false,
            reactive_ratio: 0.2,
        };
        let network = build_network(&spec);
        let outcome = solver().solve(&network, None).unwrap();
        if let PowerFlowOutcome::Converged(sol) = outcome {
            assert!(sol.max_loading_percent().unwrap() < 1e-9);
        } else {
            panic!("idle grid must converge");
        }
    }

    #[test]
    fn voltages_follow_the_slack_setpoint() {
        let network = build_network(&reference_spec());
        let outcome = solver().solve(&network, None).unwrap();
        if let PowerFlowOutcome::Converged(sol) = outcome {
            for vm in sol.bus_voltage_pu.values() {
                assert!((vm - 1.02).abs() < 1e-9);
            }
        } else {
            panic!("expected convergence");
        }
    }

    #[test]
    fn registry_backends_agree() {
        let network = build_network(&reference_spec());
        let gauss = DcLoadFlow::new(SolverKind::Gauss.build_backend())
            .solve(&network, None)
            .unwrap();
        let faer = DcLoadFlow::new(SolverKind::Faer.build_backend())
            .solve(&network, None)
            .unwrap();
        assert!((loading(&gauss, 2) - loading(&faer, 2)).abs() < 1e-6);
    }
}

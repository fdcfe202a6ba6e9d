//! Integrity validation of a completed network model.
//!
//! Pure inspection: no side effects on the network, every issue is collected
//! into [`Diagnostics`]. A model with errors must not be handed to the
//! contingency engine; callers gate on [`ensure_valid`].

use crate::graph_utils::unreachable_from_sources;
use crate::{BusId, Diagnostics, Edge, Network, NettwinError, NettwinResult};
use std::collections::HashSet;

/// Run all integrity checks, appending findings to `diag`.
pub fn validate_into(network: &Network, diag: &mut Diagnostics) {
    let buses = network.buses();
    if buses.is_empty() {
        diag.add_error("structure", "network has no buses");
        return;
    }
    let known_buses: HashSet<BusId> = buses.iter().map(|b| b.id).collect();

    for bus in &buses {
        if bus.voltage_kv.value() <= 0.0 {
            diag.add_error_with_entity(
                "physical",
                "nominal voltage must be positive",
                &bus.name,
            );
        }
    }

    let mut hvdc_count = 0usize;
    for edge in network.graph.edge_weights() {
        match edge {
            Edge::Line(line) => {
                if line.r_per_km.value() <= 0.0 {
                    diag.add_error_with_entity(
                        "physical",
                        "per-km resistance must be positive",
                        &line.name,
                    );
                }
                if line.x_per_km.value() <= 0.0 {
                    diag.add_error_with_entity(
                        "physical",
                        "per-km reactance must be positive",
                        &line.name,
                    );
                }
                if line.c_per_km.value() < 0.0 {
                    diag.add_error_with_entity(
                        "physical",
                        "per-km shunt capacitance must not be negative",
                        &line.name,
                    );
                }
                if line.length.value() <= 0.0 {
                    diag.add_error_with_entity("physical", "length must be positive", &line.name);
                }
                if line.max_i.value() <= 0.0 {
                    diag.add_error_with_entity(
                        "physical",
                        "thermal current limit must be positive",
                        &line.name,
                    );
                }
                for terminal in [line.from_bus, line.to_bus] {
                    if !known_buses.contains(&terminal) {
                        diag.add_error_with_entity(
                            "reference",
                            "line terminal references a missing bus",
                            &line.name,
                        );
                    }
                }
            }
            Edge::Hvdc(link) => {
                hvdc_count += 1;
                for terminal in [link.from_bus, link.to_bus] {
                    if !known_buses.contains(&terminal) {
                        diag.add_error_with_entity(
                            "reference",
                            "HVDC terminal references a missing bus",
                            &link.name,
                        );
                    }
                }
            }
        }
    }
    if hvdc_count > 1 {
        diag.add_error(
            "structure",
            "more than one HVDC link configured; the model supports at most one",
        );
    }

    let gens = network.generators();
    if gens.is_empty() {
        diag.add_error("structure", "network has no generation sources");
    } else if !gens.iter().any(|g| g.slack) {
        diag.add_warning("structure", "no slack source configured");
    }
    for gen in &gens {
        if !known_buses.contains(&gen.bus) {
            diag.add_error_with_entity("reference", "generator hosted on a missing bus", &gen.name);
        }
    }

    let loads = network.loads();
    if loads.is_empty() {
        diag.add_warning("structure", "network has no loads");
    }
    for load in &loads {
        if load.active_power.value() < 0.0 {
            diag.add_error_with_entity(
                "physical",
                "load active power must not be negative",
                &load.name,
            );
        }
        if !known_buses.contains(&load.bus) {
            diag.add_error_with_entity("reference", "load hosted on a missing bus", &load.name);
        }
    }

    // Island check: every bus must be reachable from some generation source
    // over in-service lines and the HVDC link.
    if !gens.is_empty() {
        for bus_id in unreachable_from_sources(network) {
            let name = network
                .bus(bus_id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| format!("bus {}", bus_id.value()));
            diag.add_error_with_entity(
                "topology",
                "bus is islanded from every generation source",
                &name,
            );
        }
    }
}

/// Run all integrity checks on a fresh diagnostics collection.
pub fn validate(network: &Network) -> Diagnostics {
    let mut diag = Diagnostics::new();
    validate_into(network, &mut diag);
    diag
}

/// Gate used before contingency analysis: returns the diagnostics on success,
/// a validation error summarizing the findings otherwise.
pub fn ensure_valid(network: &Network) -> NettwinResult<Diagnostics> {
    let diag = validate(network);
    if diag.has_errors() {
        let details: Vec<String> = diag.errors().map(|issue| issue.to_string()).collect();
        return Err(NettwinError::Validation(details.join("; ")));
    }
    Ok(diag)
}

// Method form for callers that already hold a diagnostics collection.
impl Network {
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        validate_into(self, diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Bus, Gen, GenId, Kiloamperes, Kilometers, Kilovolts, Line, LineId, Load, LoadId,
        Megavars, Megawatts, NanofaradsPerKm, OhmsPerKm, PerUnit,
    };

    fn healthy_network() -> Network {
        let mut network = Network::new();
        network.add_bus(Bus::new(BusId::new(0), "North", Kilovolts(380.0)));
        network.add_bus(Bus::new(BusId::new(1), "South", Kilovolts(380.0)));
        network.add_gen(Gen::new(GenId::new(0), "Grid", BusId::new(0)).as_slack(PerUnit(1.02)));
        network.add_load(Load {
            id: LoadId::new(0),
            name: "Industry".into(),
            bus: BusId::new(1),
            active_power: Megawatts(100.0),
            reactive_power: Megavars(20.0),
        });
        network
            .add_line(
                Line::new(LineId::new(0), "N-S", BusId::new(0), BusId::new(1))
                    .with_length(Kilometers(150.0))
                    .with_ohl_parameters(
                        OhmsPerKm(0.03),
                        OhmsPerKm(0.32),
                        NanofaradsPerKm(11.5),
                    )
                    .with_thermal_limit(Kiloamperes(2.0)),
            )
            .unwrap();
        network
    }

    #[test]
    fn healthy_network_passes() {
        let diag = validate(&healthy_network());
        assert!(!diag.has_errors(), "unexpected: {}", diag.summary());
        assert!(ensure_valid(&healthy_network()).is_ok());
    }

    #[test]
    fn zero_voltage_bus_is_rejected() {
        let mut network = healthy_network();
        network.add_bus(Bus::new(BusId::new(2), "Broken", Kilovolts(0.0)));
        // Keep the new bus connected so only the voltage error fires.
        network.add_gen(Gen::new(GenId::new(1), "Aux", BusId::new(2)));
        let diag = validate(&network);
        assert!(diag
            .errors()
            .any(|i| i.message.contains("nominal voltage") && i.entity.as_deref() == Some("Broken")));
    }

    #[test]
    fn zero_impedance_line_is_rejected() {
        let mut network = healthy_network();
        network
            .add_line(
                Line::new(LineId::new(1), "bad", BusId::new(0), BusId::new(1))
                    .with_length(Kilometers(10.0))
                    .with_ohl_parameters(OhmsPerKm(0.0), OhmsPerKm(0.32), NanofaradsPerKm(0.0))
                    .with_thermal_limit(Kiloamperes(1.0)),
            )
            .unwrap();
        let err = ensure_valid(&network).unwrap_err();
        assert!(err.to_string().contains("resistance"));
    }

    #[test]
    fn islanded_bus_is_rejected() {
        let mut network = healthy_network();
        network.add_bus(Bus::new(BusId::new(2), "Remote", Kilovolts(380.0)));
        let diag = validate(&network);
        assert!(diag
            .errors()
            .any(|i| i.category == "topology" && i.entity.as_deref() == Some("Remote")));
    }

    #[test]
    fn negative_load_is_rejected() {
        let mut network = healthy_network();
        network.add_load(Load {
            id: LoadId::new(1),
            name: "Anti-load".into(),
            bus: BusId::new(1),
            active_power: Megawatts(-5.0),
            reactive_power: Megavars(0.0),
        });
        assert!(validate(&network)
            .errors()
            .any(|i| i.message.contains("active power")));
    }

    #[test]
    fn missing_generation_is_an_error_and_no_load_a_warning() {
        let mut network = Network::new();
        network.add_bus(Bus::new(BusId::new(0), "Solo", Kilovolts(380.0)));
        let diag = validate(&network);
        assert!(diag.errors().any(|i| i.message.contains("generation")));
        assert!(diag.warnings().any(|i| i.message.contains("no loads")));
    }
}

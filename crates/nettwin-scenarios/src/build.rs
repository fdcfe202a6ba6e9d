//! Construction of the fixed three-bus study network from scenario
//! parameters.
//!
//! Topology: a wind-dominated north substation holding the slack reference,
//! a central transit substation, and an industrial south substation. Two
//! parallel overhead lines form the north-central corridor, a single line
//! continues central-south, and an optional HVDC link bypasses the AC path
//! north to south. All lines share one 380 kV overhead-line parameter set.
//!
//! The builder accepts any inputs; range checks live on
//! [`crate::ScenarioSpec::validate`] and physical checks in the core
//! validator.

use crate::ScenarioSpec;
use nettwin_core::{
    Bus, BusId, Gen, GenId, HvdcLink, Kiloamperes, Kilometers, Kilovolts, Line, LineId, Load,
    LoadId, Megavars, Megawatts, NanofaradsPerKm, Network, OhmsPerKm, PerUnit,
};

const NOMINAL_VOLTAGE_KV: f64 = 380.0;
const SLACK_SETPOINT_PU: f64 = 1.02;

// Typical 380 kV overhead-line parameters, shared by every AC line.
const OHL_R_OHM_PER_KM: f64 = 0.03;
const OHL_X_OHM_PER_KM: f64 = 0.32;
const OHL_C_NF_PER_KM: f64 = 11.5;
const OHL_MAX_I_KA: f64 = 2.0;

const NORTH_CENTRAL_KM: f64 = 150.0;
const CENTRAL_SOUTH_KM: f64 = 200.0;

const HVDC_TRANSFER_MW: f64 = 1000.0;
const HVDC_LOSS_MW: f64 = 20.0;

/// Build the three-bus network for one scenario.
pub fn build_network(spec: &ScenarioSpec) -> Network {
    let mut network = Network::new();

    let north = BusId::new(0);
    let central = BusId::new(1);
    let south = BusId::new(2);
    network.add_bus(Bus::new(
        north,
        "Substation North (Wind)",
        Kilovolts(NOMINAL_VOLTAGE_KV),
    ));
    network.add_bus(Bus::new(
        central,
        "Substation Central",
        Kilovolts(NOMINAL_VOLTAGE_KV),
    ));
    network.add_bus(Bus::new(
        south,
        "Substation South (Industry)",
        Kilovolts(NOMINAL_VOLTAGE_KV),
    ));

    network.add_gen(
        Gen::new(GenId::new(0), "External Grid", north).as_slack(PerUnit(SLACK_SETPOINT_PU)),
    );
    network.add_gen(
        Gen::new(GenId::new(1), "Offshore Wind Park", north)
            .with_power(Megawatts(spec.wind_mw), Megavars(0.0)),
    );

    network.add_load(Load {
        id: LoadId::new(0),
        name: "Industry Cluster".into(),
        bus: south,
        active_power: Megawatts(spec.load_mw),
        reactive_power: Megavars(spec.load_mw * spec.reactive_ratio),
    });

    let ohl = |id: usize, name: &str, from: BusId, to: BusId, km: f64| {
        Line::new(LineId::new(id), name, from, to)
            .with_length(Kilometers(km))
            .with_ohl_parameters(
                OhmsPerKm(OHL_R_OHM_PER_KM),
                OhmsPerKm(OHL_X_OHM_PER_KM),
                NanofaradsPerKm(OHL_C_NF_PER_KM),
            )
            .with_thermal_limit(Kiloamperes(OHL_MAX_I_KA))
    };
    // add_line only fails on dangling bus references; the fixed topology
    // cannot produce any.
    network
        .add_line(ohl(0, "North-Central A", north, central, NORTH_CENTRAL_KM))
        .expect("fixed topology");
    network
        .add_line(ohl(1, "North-Central B", north, central, NORTH_CENTRAL_KM))
        .expect("fixed topology");
    network
        .add_line(ohl(2, "Central-South", central, south, CENTRAL_SOUTH_KM))
        .expect("fixed topology");

    if spec.hvdc_enabled {
        network
            .add_hvdc_link(HvdcLink {
                name: "North-South HVDC".into(),
                from_bus: north,
                to_bus: south,
                transfer: Megawatts(HVDC_TRANSFER_MW),
                loss: Megawatts(HVDC_LOSS_MW),
                loss_percent: 0.0,
                vm_from: PerUnit(SLACK_SETPOINT_PU),
                vm_to: PerUnit(SLACK_SETPOINT_PU),
            })
            .expect("fixed topology");
    }

    network
}

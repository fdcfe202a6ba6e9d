//! # nettwin-core: transmission-grid digital twin model
//!
//! Data structures and topology utilities for N-1 contingency analysis of a
//! small transmission grid.
//!
//! Networks are modeled as **undirected multigraphs** where:
//! - **Nodes**: buses, generators, loads
//! - **Edges**: AC lines and (at most one) HVDC link
//!
//! The graph representation keeps topology explicit for connectivity checks
//! (island detection during validation) and supports parallel edges between
//! the same pair of buses, which the reference corridor topology relies on.
//!
//! ```
//! use nettwin_core::*;
//!
//! let mut network = Network::new();
//! let north = network.add_bus(Bus::new(BusId::new(0), "North", Kilovolts(380.0)));
//! let south = network.add_bus(Bus::new(BusId::new(1), "South", Kilovolts(380.0)));
//! let _ = (north, south);
//!
//! network.add_gen(Gen::new(GenId::new(0), "Grid", BusId::new(0)).as_slack(PerUnit(1.02)));
//! network.add_load(Load {
//!     id: LoadId::new(0),
//!     name: "Industry".into(),
//!     bus: BusId::new(1),
//!     active_power: Megawatts(100.0),
//!     reactive_power: Megavars(20.0),
//! });
//!
//! network
//!     .add_line(Line::new(LineId::new(0), "North-South", BusId::new(0), BusId::new(1))
//!         .with_length(Kilometers(150.0))
//!         .with_ohl_parameters(OhmsPerKm(0.03), OhmsPerKm(0.32), NanofaradsPerKm(11.5))
//!         .with_thermal_limit(Kiloamperes(2.0)))
//!     .unwrap();
//!
//! assert_eq!(network.lines().len(), 1);
//! ```
//!
//! The contingency engine never mutates a network: a line outage is passed to
//! the power-flow port as a solve parameter, so `in_service` always reflects
//! the configured status.

use petgraph::{prelude::*, Undirected};
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod solver;
pub mod units;
pub mod validate;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{NettwinError, NettwinResult};
pub use graph_utils::{bus_components, energized_components, IslandSummary};
pub use petgraph::graph::NodeIndex;
pub use solver::{
    GaussBackend, LinearSystemBackend, LuBackend, PowerFlowOutcome, PowerFlowPort,
    PowerFlowSolution, SolverKind,
};
pub use units::{
    Kiloamperes, Kilometers, Kilovolts, Megavars, Megawatts, NanofaradsPerKm, OhmsPerKm, PerUnit,
};

// Newtype ID wrappers so bus, line, generator, and load identities cannot be
// confused with one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadId(usize);

macro_rules! impl_id {
    ($type:ty) => {
        impl $type {
            #[inline]
            pub fn new(value: usize) -> Self {
                Self(value)
            }
            #[inline]
            pub fn value(&self) -> usize {
                self.0
            }
        }
    };
}

impl_id!(BusId);
impl_id!(LineId);
impl_id!(GenId);
impl_id!(LoadId);

/// A network node at a given voltage level.
#[derive(Debug, Clone)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    /// Nominal voltage; must be positive for a physically meaningful model.
    pub voltage_kv: Kilovolts,
}

impl Bus {
    pub fn new(id: BusId, name: impl Into<String>, voltage_kv: Kilovolts) -> Self {
        Self {
            id,
            name: name.into(),
            voltage_kv,
        }
    }
}

/// An AC branch described by overhead-line per-km parameters and a thermal
/// current limit.
#[derive(Debug, Clone)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    pub length: Kilometers,
    pub r_per_km: OhmsPerKm,
    pub x_per_km: OhmsPerKm,
    pub c_per_km: NanofaradsPerKm,
    /// Thermal current limit; loading percentages are relative to this.
    pub max_i: Kiloamperes,
    /// Configured status. The contingency engine does not toggle this; an
    /// outage under study is a solve parameter instead.
    pub in_service: bool,
}

impl Line {
    pub fn new(id: LineId, name: impl Into<String>, from_bus: BusId, to_bus: BusId) -> Self {
        Self {
            id,
            name: name.into(),
            from_bus,
            to_bus,
            length: Kilometers(1.0),
            r_per_km: OhmsPerKm(0.0),
            x_per_km: OhmsPerKm(0.0),
            c_per_km: NanofaradsPerKm(0.0),
            max_i: Kiloamperes(0.0),
            in_service: true,
        }
    }

    pub fn with_length(mut self, length: Kilometers) -> Self {
        self.length = length;
        self
    }

    /// Attach a per-km overhead-line parameter set (r, x, c).
    pub fn with_ohl_parameters(
        mut self,
        r_per_km: OhmsPerKm,
        x_per_km: OhmsPerKm,
        c_per_km: NanofaradsPerKm,
    ) -> Self {
        self.r_per_km = r_per_km;
        self.x_per_km = x_per_km;
        self.c_per_km = c_per_km;
        self
    }

    pub fn with_thermal_limit(mut self, max_i: Kiloamperes) -> Self {
        self.max_i = max_i;
        self
    }

    pub fn out_of_service(mut self) -> Self {
        self.in_service = false;
        self
    }

    /// Total series reactance over the route length, in ohms.
    pub fn series_reactance_ohm(&self) -> f64 {
        self.x_per_km.value() * self.length.value()
    }

    /// Total series resistance over the route length, in ohms.
    pub fn series_resistance_ohm(&self) -> f64 {
        self.r_per_km.value() * self.length.value()
    }
}

/// A generation source: either the slack injection (external grid) that
/// balances the network and sets the angle reference, or a dispatchable
/// injection such as a wind park.
#[derive(Debug, Clone)]
pub struct Gen {
    pub id: GenId,
    pub name: String,
    pub bus: BusId,
    pub active_power: Megawatts,
    pub reactive_power: Megavars,
    /// Voltage setpoint held by the unit, set for slack-type sources.
    pub voltage_setpoint: Option<PerUnit>,
    pub slack: bool,
}

impl Gen {
    pub fn new(id: GenId, name: impl Into<String>, bus: BusId) -> Self {
        Self {
            id,
            name: name.into(),
            bus,
            active_power: Megawatts(0.0),
            reactive_power: Megavars(0.0),
            voltage_setpoint: None,
            slack: false,
        }
    }

    pub fn with_power(mut self, p: Megawatts, q: Megavars) -> Self {
        self.active_power = p;
        self.reactive_power = q;
        self
    }

    /// Mark this unit as the slack / external-grid reference at the given
    /// voltage setpoint.
    pub fn as_slack(mut self, setpoint: PerUnit) -> Self {
        self.slack = true;
        self.voltage_setpoint = Some(setpoint);
        self
    }
}

/// A demand record at a host bus.
#[derive(Debug, Clone)]
pub struct Load {
    pub id: LoadId,
    pub name: String,
    pub bus: BusId,
    pub active_power: Megawatts,
    pub reactive_power: Megavars,
}

/// A fixed-setpoint HVDC connection between two buses.
///
/// The link is a fixed power transfer, not an AC branch: it is excluded from
/// the N-1 trip loop but shifts the power balance in every solve, and its
/// converters hold the terminal voltages.
#[derive(Debug, Clone)]
pub struct HvdcLink {
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// Scheduled transfer from `from_bus` to `to_bus`.
    pub transfer: Megawatts,
    pub loss: Megawatts,
    pub loss_percent: f64,
    pub vm_from: PerUnit,
    pub vm_to: PerUnit,
}

impl HvdcLink {
    /// Power delivered at the receiving terminal after fixed and proportional
    /// losses.
    pub fn delivered_mw(&self) -> f64 {
        self.transfer.value() - self.loss.value() - self.transfer.value() * self.loss_percent / 100.0
    }
}

/// Node kinds in the network graph.
#[derive(Debug, Clone)]
pub enum Node {
    Bus(Bus),
    Gen(Gen),
    Load(Load),
}

impl Node {
    /// Human-readable label for diagnostics and reports.
    pub fn label(&self) -> &str {
        match self {
            Node::Bus(bus) => &bus.name,
            Node::Gen(gen) => &gen.name,
            Node::Load(load) => &load.name,
        }
    }
}

/// Edge kinds in the network graph.
#[derive(Debug, Clone)]
pub enum Edge {
    Line(Line),
    Hvdc(HvdcLink),
}

impl Edge {
    pub fn label(&self) -> &str {
        match self {
            Edge::Line(line) => &line.name,
            Edge::Hvdc(link) => &link.name,
        }
    }
}

/// The grid model: one scenario's topology, generation, load, and DC link.
///
/// Built once per scenario and read-only afterwards; the contingency engine
/// operates on `&Network` and expresses outages as solve parameters.
#[derive(Debug, Default)]
pub struct Network {
    pub graph: Graph<Node, Edge, Undirected>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
        }
    }

    pub fn add_bus(&mut self, bus: Bus) -> NodeIndex {
        self.graph.add_node(Node::Bus(bus))
    }

    pub fn add_gen(&mut self, gen: Gen) -> NodeIndex {
        self.graph.add_node(Node::Gen(gen))
    }

    pub fn add_load(&mut self, load: Load) -> NodeIndex {
        self.graph.add_node(Node::Load(load))
    }

    /// Insert an AC line, resolving its terminal buses by ID.
    pub fn add_line(&mut self, line: Line) -> NettwinResult<()> {
        let from = self.bus_node(line.from_bus).ok_or_else(|| {
            NettwinError::Network(format!(
                "line '{}' references missing from-bus {}",
                line.name,
                line.from_bus.value()
            ))
        })?;
        let to = self.bus_node(line.to_bus).ok_or_else(|| {
            NettwinError::Network(format!(
                "line '{}' references missing to-bus {}",
                line.name,
                line.to_bus.value()
            ))
        })?;
        self.graph.add_edge(from, to, Edge::Line(line));
        Ok(())
    }

    /// Insert the HVDC link. At most one link is supported; a second insert
    /// is a network error.
    pub fn add_hvdc_link(&mut self, link: HvdcLink) -> NettwinResult<()> {
        if self.hvdc_link().is_some() {
            return Err(NettwinError::Network(
                "network already carries an HVDC link; at most one is supported".into(),
            ));
        }
        let from = self.bus_node(link.from_bus).ok_or_else(|| {
            NettwinError::Network(format!(
                "HVDC link '{}' references missing from-bus {}",
                link.name,
                link.from_bus.value()
            ))
        })?;
        let to = self.bus_node(link.to_bus).ok_or_else(|| {
            NettwinError::Network(format!(
                "HVDC link '{}' references missing to-bus {}",
                link.name,
                link.to_bus.value()
            ))
        })?;
        self.graph.add_edge(from, to, Edge::Hvdc(link));
        Ok(())
    }

    /// Node index of the bus with the given ID, if present.
    pub fn bus_node(&self, id: BusId) -> Option<NodeIndex> {
        self.graph.node_indices().find(|&idx| {
            matches!(&self.graph[idx], Node::Bus(bus) if bus.id == id)
        })
    }

    pub fn bus(&self, id: BusId) -> Option<&Bus> {
        self.graph.node_weights().find_map(|n| match n {
            Node::Bus(bus) if bus.id == id => Some(bus),
            _ => None,
        })
    }

    /// All buses, in insertion order.
    pub fn buses(&self) -> Vec<&Bus> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Bus(bus) => Some(bus),
                _ => None,
            })
            .collect()
    }

    /// All AC lines, in insertion order. This is the network line ordering
    /// the contingency engine iterates in.
    pub fn lines(&self) -> Vec<&Line> {
        self.graph
            .edge_weights()
            .filter_map(|e| match e {
                Edge::Line(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn generators(&self) -> Vec<&Gen> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Gen(gen) => Some(gen),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<&Load> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Load(load) => Some(load),
                _ => None,
            })
            .collect()
    }

    pub fn hvdc_link(&self) -> Option<&HvdcLink> {
        self.graph.edge_weights().find_map(|e| match e {
            Edge::Hvdc(link) => Some(link),
            _ => None,
        })
    }

    pub fn generators_at_bus(&self, bus_id: BusId) -> Vec<&Gen> {
        self.generators()
            .into_iter()
            .filter(|g| g.bus == bus_id)
            .collect()
    }

    pub fn loads_at_bus(&self, bus_id: BusId) -> Vec<&Load> {
        self.loads().into_iter().filter(|l| l.bus == bus_id).collect()
    }

    /// Total active generation, slack excluded (the slack balances whatever
    /// remains).
    pub fn total_dispatched_mw(&self) -> f64 {
        self.generators()
            .iter()
            .filter(|g| !g.slack)
            .map(|g| g.active_power.value())
            .sum()
    }

    pub fn total_load_mw(&self) -> f64 {
        self.loads().iter().map(|l| l.active_power.value()).sum()
    }

    /// Snapshot of configured line statuses, used by restoration-invariant
    /// checks around the contingency engine.
    pub fn line_status_snapshot(&self) -> Vec<(LineId, bool)> {
        self.lines()
            .iter()
            .map(|line| (line.id, line.in_service))
            .collect()
    }

    /// Compute size and capacity statistics.
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();
        for node in self.graph.node_weights() {
            match node {
                Node::Bus(_) => stats.num_buses += 1,
                Node::Gen(g) => {
                    stats.num_gens += 1;
                    if !g.slack {
                        stats.total_gen_mw += g.active_power.value();
                    }
                }
                Node::Load(l) => {
                    stats.num_loads += 1;
                    stats.total_load_mw += l.active_power.value();
                    stats.total_load_mvar += l.reactive_power.value();
                }
            }
        }
        for edge in self.graph.edge_weights() {
            match edge {
                Edge::Line(_) => stats.num_lines += 1,
                Edge::Hvdc(_) => stats.num_hvdc_links += 1,
            }
        }
        stats
    }
}

/// Statistics about a network's size and capacity.
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub num_buses: usize,
    pub num_gens: usize,
    pub num_loads: usize,
    pub num_lines: usize,
    pub num_hvdc_links: usize,
    pub total_gen_mw: f64,
    pub total_load_mw: f64,
    pub total_load_mvar: f64,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} buses, {} lines, {} gens ({:.0} MW dispatched), {} loads ({:.0} MW), {} HVDC link(s)",
            self.num_buses,
            self.num_lines,
            self.num_gens,
            self.total_gen_mw,
            self.num_loads,
            self.total_load_mw,
            self.num_hvdc_links
        )
    }
}

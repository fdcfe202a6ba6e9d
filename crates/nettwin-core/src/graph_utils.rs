//! Topological analysis over the network graph.
//!
//! Connectivity is computed over bus nodes only; generator and load nodes
//! attach to buses by ID and do not carry topology. Which edges count is a
//! caller decision: the validator includes in-service lines and the HVDC
//! link, while the DC power-flow backend restricts itself to AC lines and
//! excludes the outage under study.

use crate::{BusId, Edge, Network, Node};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

/// One connected component of buses.
#[derive(Debug)]
pub struct IslandSummary {
    pub island_id: usize,
    pub buses: Vec<BusId>,
}

/// Group buses into connected components, counting only edges accepted by
/// `edge_filter`. Components are ordered by first-seen bus; bus lists follow
/// node insertion order.
pub fn bus_components<F>(network: &Network, edge_filter: F) -> Vec<IslandSummary>
where
    F: Fn(&Edge) -> bool,
{
    let mut bus_nodes = Vec::new();
    for idx in network.graph.node_indices() {
        if let Node::Bus(bus) = &network.graph[idx] {
            bus_nodes.push((idx, bus.id));
        }
    }

    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    for &(start, _) in &bus_nodes {
        if visited.contains(&start) {
            continue;
        }
        let mut members = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            if let Node::Bus(bus) = &network.graph[node] {
                members.push(bus.id);
            }
            for edge in network.graph.edges(node) {
                if !edge_filter(edge.weight()) {
                    continue;
                }
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                if !visited.contains(&other) {
                    queue.push_back(other);
                }
            }
        }
        islands.push(IslandSummary {
            island_id: islands.len(),
            buses: members,
        });
    }
    islands
}

/// Components over everything that can carry power in the configured state:
/// in-service AC lines plus the HVDC link. This is the edge set the
/// validator's island check uses.
pub fn energized_components(network: &Network) -> Vec<IslandSummary> {
    bus_components(network, |edge| match edge {
        Edge::Line(line) => line.in_service,
        Edge::Hvdc(_) => true,
    })
}

/// Buses unreachable from every generation source over energized edges.
pub fn unreachable_from_sources(network: &Network) -> Vec<BusId> {
    let source_buses: HashSet<BusId> = network.generators().iter().map(|g| g.bus).collect();
    let mut component_of: HashMap<BusId, usize> = HashMap::new();
    let islands = energized_components(network);
    for island in &islands {
        for bus in &island.buses {
            component_of.insert(*bus, island.island_id);
        }
    }
    let energized: HashSet<usize> = source_buses
        .iter()
        .filter_map(|bus| component_of.get(bus).copied())
        .collect();

    let mut dark = Vec::new();
    for island in &islands {
        if !energized.contains(&island.island_id) {
            dark.extend(island.buses.iter().copied());
        }
    }
    dark
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bus, Gen, GenId, HvdcLink, Kilovolts, Line, LineId, Megawatts, PerUnit};

    fn bus(network: &mut Network, id: usize, name: &str) {
        network.add_bus(Bus::new(BusId::new(id), name, Kilovolts(380.0)));
    }

    #[test]
    fn out_of_service_line_splits_components() {
        let mut network = Network::new();
        bus(&mut network, 0, "A");
        bus(&mut network, 1, "B");
        bus(&mut network, 2, "C");
        network
            .add_line(Line::new(LineId::new(0), "A-B", BusId::new(0), BusId::new(1)))
            .unwrap();
        network
            .add_line(
                Line::new(LineId::new(1), "B-C", BusId::new(1), BusId::new(2)).out_of_service(),
            )
            .unwrap();

        let islands = energized_components(&network);
        assert_eq!(islands.len(), 2);
        assert_eq!(islands[0].buses, vec![BusId::new(0), BusId::new(1)]);
        assert_eq!(islands[1].buses, vec![BusId::new(2)]);
    }

    #[test]
    fn hvdc_link_bridges_components() {
        let mut network = Network::new();
        bus(&mut network, 0, "A");
        bus(&mut network, 1, "B");
        network
            .add_hvdc_link(HvdcLink {
                name: "DC".into(),
                from_bus: BusId::new(0),
                to_bus: BusId::new(1),
                transfer: Megawatts(1000.0),
                loss: Megawatts(20.0),
                loss_percent: 0.0,
                vm_from: PerUnit(1.02),
                vm_to: PerUnit(1.02),
            })
            .unwrap();

        assert_eq!(energized_components(&network).len(), 1);
        // An AC-only view ignores the link.
        let ac_only = bus_components(&network, |edge| matches!(edge, Edge::Line(_)));
        assert_eq!(ac_only.len(), 2);
    }

    #[test]
    fn buses_without_a_source_are_reported() {
        let mut network = Network::new();
        bus(&mut network, 0, "A");
        bus(&mut network, 1, "B");
        bus(&mut network, 2, "C");
        network
            .add_line(Line::new(LineId::new(0), "A-B", BusId::new(0), BusId::new(1)))
            .unwrap();
        network.add_gen(Gen::new(GenId::new(0), "Grid", BusId::new(0)).as_slack(PerUnit(1.0)));

        let dark = unreachable_from_sources(&network);
        assert_eq!(dark, vec![BusId::new(2)]);
    }

    #[test]
    fn fully_connected_network_has_no_dark_buses() {
        let mut network = Network::new();
        bus(&mut network, 0, "A");
        bus(&mut network, 1, "B");
        network
            .add_line(Line::new(LineId::new(0), "A-B", BusId::new(0), BusId::new(1)))
            .unwrap();
        network.add_gen(Gen::new(GenId::new(0), "Grid", BusId::new(0)).as_slack(PerUnit(1.0)));
        assert!(unreachable_from_sources(&network).is_empty());
    }
}

//! Node classifier (`design.are`, §4.3).
//!
//! A `match` over the parsed attributes builds a different node shape per
//! case, and the parser's own error variants carry line-context for
//! diagnostics.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::StaError;
use crate::graph::{Direction, NetGraph, NodeRole, PortDirection, Symbol};
use crate::net::RawNet;

lazy_static! {
    static ref ATTR_LINE: Regex = Regex::new(
        r"^\s*(?P<name>\S+)\s*(?:\{\s*(?P<ff>ff)?\s*(?P<clk>c\d+)?\s*\})?\s*$"
    ).unwrap();
}

#[derive(Default, Clone)]
struct Attrs {
    ff: bool,
    clk: Option<Symbol>,
}

/// Result of classification: the finished [`NetGraph`] (power nodes removed)
/// plus the three indices the path enumerator walks from/to.
pub struct Classified {
    pub graph: NetGraph,
    pub ff_nodes: Vec<petgraph::stable_graph::NodeIndex>,
    pub in_ports: Vec<petgraph::stable_graph::NodeIndex>,
    pub out_ports: Vec<petgraph::stable_graph::NodeIndex>,
    /// Original `design.net` name for every surviving node, kept around
    /// purely for report text (§4.6) — the classified graph itself only
    /// needs roles and delays to run the analysis.
    pub names: HashMap<petgraph::stable_graph::NodeIndex, Symbol>,
}

/// Classify every node of `net` using `are_text`, the decision table of §3.
pub fn classify(net: RawNet, are_text: &str) -> Result<Classified, StaError> {
    let RawNet {
        graph: name_graph,
        direction,
        index_by_name,
    } = net;

    let mut attrs_by_name: HashMap<Symbol, Attrs> = HashMap::new();
    for (lineno, raw_line) in are_text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let caps = ATTR_LINE
            .captures(raw_line)
            .ok_or_else(|| StaError::MalformedAttribute {
                line: lineno + 1,
                text: line.to_string(),
            })?;
        let name = Symbol::from(&caps["name"]);
        if !index_by_name.contains_key(&name) {
            // FloatingAttribute (§7): attribute line for a node that never
            // appeared in design.net. Silently ignored.
            continue;
        }
        attrs_by_name.insert(
            name,
            Attrs {
                ff: caps.name("ff").is_some(),
                clk: caps.name("clk").map(|m| Symbol::from(m.as_str())),
            },
        );
    }

    let mut new_graph = NetGraph::with_capacity(name_graph.node_count(), name_graph.edge_count());
    let mut idx_map = HashMap::with_capacity(name_graph.node_count());
    let mut power_nodes = Vec::new();
    let mut names = HashMap::with_capacity(name_graph.node_count());

    for old_idx in name_graph.node_indices() {
        let name = &name_graph[old_idx];
        let attrs = attrs_by_name.get(name).cloned().unwrap_or_default();
        let dir = direction
            .get(&old_idx)
            .copied()
            .unwrap_or(Direction::Source);
        let has_p = name.as_ref().contains('p');

        let role = if has_p {
            if let Some(clk) = attrs.clk {
                NodeRole::ClockSource { domain: clk }
            } else {
                match dir {
                    Direction::Source => NodeRole::Port {
                        direction: PortDirection::In,
                    },
                    Direction::Sink => NodeRole::Port {
                        direction: PortDirection::Out,
                    },
                    Direction::SourceSink => {
                        eprintln!(
                            "warning: port {name} is both source and sink (PortDirectionConflict); \
                             it will produce no timing paths"
                        );
                        NodeRole::Port {
                            direction: PortDirection::Conflict,
                        }
                    }
                }
            }
        } else if attrs.ff {
            if let Some(clk) = attrs.clk {
                NodeRole::Dff { domain: clk }
            } else {
                match dir {
                    Direction::SourceSink => NodeRole::ClockCell,
                    // Power (§3): a pure driver with an `ff` marker and no
                    // clock domain. Removed from the graph entirely below.
                    // A pure-sink `ff`-marked, clock-less node is not named
                    // by the role table; treated the same as Power (it
                    // cannot be a clock-source ancestor and contributes no
                    // data-path delay), see DESIGN.md.
                    Direction::Source | Direction::Sink => {
                        power_nodes.push(old_idx);
                        NodeRole::ClockCell // placeholder, discarded on removal below
                    }
                }
            }
        } else {
            NodeRole::Cell { delay: 1.0 }
        };

        let new_idx = new_graph.add_node(role);
        idx_map.insert(old_idx, new_idx);
        names.insert(new_idx, name.clone());
    }

    for edge in name_graph.edge_indices() {
        let (s, d) = name_graph.edge_endpoints(edge).unwrap();
        new_graph.add_edge(idx_map[&s], idx_map[&d], name_graph[edge].clone());
    }

    for old_idx in power_nodes {
        let removed = idx_map[&old_idx];
        new_graph.remove_node(removed);
        names.remove(&removed);
    }

    let mut ff_nodes = Vec::new();
    let mut in_ports = Vec::new();
    let mut out_ports = Vec::new();
    for idx in new_graph.node_indices() {
        match &new_graph[idx] {
            NodeRole::Dff { .. } => ff_nodes.push(idx),
            NodeRole::Port {
                direction: PortDirection::In,
            } => in_ports.push(idx),
            NodeRole::Port {
                direction: PortDirection::Out,
            } => out_ports.push(idx),
            _ => {}
        }
    }

    Ok(Classified {
        graph: new_graph,
        ff_nodes,
        in_ports,
        out_ports,
        names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::parse_net;
    use std::collections::HashMap;

    #[test]
    fn classifies_ff_to_ff() {
        let net = parse_net("g1 s\ng2 l\ng2 s\ng3 l\n", &HashMap::new()).unwrap();
        let classified = classify(net, "g1 {ff c1}\ng2\ng3 {ff c1}\n").unwrap();
        assert_eq!(classified.ff_nodes.len(), 2);
        assert_eq!(classified.graph.node_count(), 3);
    }

    #[test]
    fn classifies_ports() {
        let net = parse_net("gp0 s\ng1 l\ng1 s\ng2 l\n", &HashMap::new()).unwrap();
        let classified = classify(net, "gp0\ng1\ng2 {ff c1}\n").unwrap();
        assert_eq!(classified.in_ports.len(), 1);
        assert_eq!(classified.ff_nodes.len(), 1);
    }

    #[test]
    fn clock_source_requires_p_and_clk_no_ff() {
        let net = parse_net("gp0 s\ng2 l 3\ng2 s\ng3 l 2\n", &HashMap::new()).unwrap();
        let classified = classify(net, "gp0 {c1}\ng2 {ff}\ng3 {ff c1}\n").unwrap();
        let gp0 = classified
            .graph
            .node_indices()
            .find(|&i| matches!(classified.graph[i], NodeRole::ClockSource { .. }))
            .unwrap();
        assert!(matches!(
            classified.graph[gp0],
            NodeRole::ClockSource { .. }
        ));
    }

    #[test]
    fn power_node_removed() {
        let net = parse_net("g0 s\ng1 l\n", &HashMap::new()).unwrap();
        let classified = classify(net, "g0 {ff}\ng1\n").unwrap();
        // g0 is a pure source ff-marked, clock-less node: Power, removed.
        assert_eq!(classified.graph.node_count(), 1);
    }

    #[test]
    fn floating_attribute_is_ignored() {
        let net = parse_net("g1 s\ng2 l\n", &HashMap::new()).unwrap();
        let result = classify(net, "g1\ng2\ng99 {ff c1}\n");
        assert!(result.is_ok());
    }

    #[test]
    fn malformed_attribute_is_fatal() {
        let net = parse_net("g1 s\ng2 l\n", &HashMap::new()).unwrap();
        let err = classify(net, "g1 {ff c1\n").unwrap_err();
        assert!(matches!(err, StaError::MalformedAttribute { .. }));
    }

    #[test]
    fn port_direction_conflict_retained_but_flagged() {
        let net = parse_net("gp0 s\ng1 l\ng1 s\ngp0 l\n", &HashMap::new()).unwrap();
        let classified = classify(net, "gp0\ng1\n").unwrap();
        assert_eq!(classified.graph.node_count(), 2);
        assert!(classified.in_ports.is_empty());
        assert!(classified.out_ports.is_empty());
    }
}

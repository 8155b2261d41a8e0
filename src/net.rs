//! Net graph builder (`design.net`, §4.2).
//!
//! Two-pass construction: collect the raw entries first (here, group
//! membership via the `s`/`l` flat-sequence rule), then resolve names to
//! graph nodes through a `Symbol -> NodeIndex` lookup table as edges are
//! added.

use std::collections::HashMap;

use lazy_static::lazy_static;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use regex::Regex;

use crate::error::StaError;
use crate::graph::{DelayKind, Direction, Symbol, TdmFn};

lazy_static! {
    static ref NET_LINE: Regex = Regex::new(
        r"^\s*(?P<name>gp?\d+)\s+(?P<dir>[sl])(?:\s+(?:(?P<cable>\d+(?:\.\d+)?)|(?P<tdm>t\d+)\s*r(?P<ratio>\d+)))?\s*$"
    ).unwrap();
}

/// The net graph before node classification: nodes are bare names, edges
/// already carry their resolved [`DelayKind`].
pub struct RawNet {
    pub graph: StableGraph<Symbol, DelayKind>,
    pub direction: HashMap<NodeIndex, Direction>,
    pub index_by_name: HashMap<Symbol, NodeIndex>,
}

impl RawNet {
    fn node(&mut self, name: &Symbol) -> NodeIndex {
        if let Some(&idx) = self.index_by_name.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.clone());
            self.index_by_name.insert(name.clone(), idx);
            idx
        }
    }

    fn note_direction(&mut self, idx: NodeIndex, dir: Direction) {
        self.direction
            .entry(idx)
            .and_modify(|existing| {
                if *existing != dir {
                    *existing = Direction::SourceSink;
                }
            })
            .or_insert(dir);
    }
}

/// Parse `design.net` into a [`RawNet`].
///
/// `tdm_formulas` must already be populated from `design.tdm` (§4.1); a net
/// edge referencing an unknown TDM id is a fatal [`StaError::UnknownTdmId`].
pub fn parse_net(
    input: &str,
    tdm_formulas: &HashMap<Symbol, TdmFn>,
) -> Result<RawNet, StaError> {
    let mut net = RawNet {
        graph: StableGraph::new(),
        direction: HashMap::new(),
        index_by_name: HashMap::new(),
    };

    let mut current_source: Option<NodeIndex> = None;

    for (lineno, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let caps = NET_LINE.captures(raw_line).ok_or_else(|| StaError::MalformedNetLine {
            line: lineno + 1,
            text: line.to_string(),
        })?;

        let name = Symbol::from(&caps["name"]);
        let idx = net.node(&name);

        match &caps["dir"] {
            "s" => {
                net.note_direction(idx, Direction::Source);
                current_source = Some(idx);
            }
            "l" => {
                let source = current_source.ok_or_else(|| StaError::MalformedNetLine {
                    line: lineno + 1,
                    text: format!("{line} (sink with no preceding source)"),
                })?;
                net.note_direction(idx, Direction::Sink);

                let delay = if let Some(cable) = caps.name("cable") {
                    DelayKind::Cable(cable.as_str().parse().unwrap())
                } else if let Some(tdm_id) = caps.name("tdm") {
                    let id = Symbol::from(tdm_id.as_str());
                    let ratio: u32 = caps["ratio"].parse().unwrap();
                    let formula = tdm_formulas.get(&id).ok_or_else(|| StaError::UnknownTdmId {
                        id: id.clone(),
                        line: lineno + 1,
                    })?;
                    let value = formula(ratio as f64);
                    DelayKind::Tdm {
                        formula: formula.clone(),
                        ratio,
                        value,
                    }
                } else {
                    DelayKind::None
                };

                net.graph.add_edge(source, idx, delay);
            }
            _ => unreachable!("regex only matches s or l"),
        }
    }

    Ok(net)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_net_group() {
        let net = parse_net("g1 s\ng2 l\n", &HashMap::new()).unwrap();
        assert_eq!(net.graph.node_count(), 2);
        assert_eq!(net.graph.edge_count(), 1);
    }

    #[test]
    fn chained_groups_ff_to_ff() {
        let net = parse_net("g1 s\ng2 l\ng2 s\ng3 l\n", &HashMap::new()).unwrap();
        assert_eq!(net.graph.node_count(), 3);
        assert_eq!(net.graph.edge_count(), 2);
        let g2 = net.index_by_name[&Symbol::from("g2")];
        assert_eq!(net.direction[&g2], Direction::SourceSink);
    }

    #[test]
    fn cable_delay_parsed() {
        let net = parse_net("g1 s\ng2 l 5\n", &HashMap::new()).unwrap();
        let edge = net.graph.edge_weights().next().unwrap();
        assert_eq!(edge.value(), 5.0);
    }

    #[test]
    fn tdm_delay_materialized_at_edge_creation() {
        let mut formulas: HashMap<Symbol, TdmFn> = HashMap::new();
        formulas.insert(Symbol::from("t0"), std::rc::Rc::new(|r: f64| r / 100.0));
        let net = parse_net("g1 s\ng2 l t0 r50\n", &formulas).unwrap();
        let edge = net.graph.edge_weights().next().unwrap();
        assert_eq!(edge.value(), 0.5);
    }

    #[test]
    fn unknown_tdm_id_is_fatal() {
        let err = parse_net("g1 s\ng2 l t9 r1\n", &HashMap::new()).unwrap_err();
        assert!(matches!(err, StaError::UnknownTdmId { .. }));
    }

    #[test]
    fn malformed_line_is_fatal() {
        let err = parse_net("garbage line here\n", &HashMap::new()).unwrap_err();
        assert!(matches!(err, StaError::MalformedNetLine { .. }));
    }
}

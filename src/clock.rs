//! Clock period map (`design.clk`, §6) and clock-latency resolver (§4.4).
//!
//! The resolver keeps clock-source latency out of `NodeRole::Dff` entirely,
//! looking it up by `NodeIndex` instead, so that the classified graph stays
//! immutable once built (§5) — nothing here ever touches `NetGraph` nodes or
//! edges after classification.

use std::collections::HashMap;

use lazy_static::lazy_static;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction::Incoming;
use regex::Regex;

use crate::graph::{report_line, NetGraph, NodeRole, Symbol};

lazy_static! {
    static ref CLK_LINE: Regex = Regex::new(r"^\s*(?P<id>c\d+)\s+(?P<freq>\d+(?:\.\d+)?)\s*$").unwrap();
}

/// Parse `design.clk` into a map from clock domain to period in nanoseconds
/// (`1000 / freq_mhz`). Unrecognized lines are ignored silently, the same
/// permissive policy as the TDM parser.
pub fn parse_clock_periods(input: &str) -> HashMap<Symbol, f64> {
    let mut periods = HashMap::new();
    for line in input.lines() {
        if let Some(caps) = CLK_LINE.captures(line) {
            let freq: f64 = caps["freq"].parse().unwrap();
            periods.insert(Symbol::from(&caps["id"]), 1000.0 / freq);
        }
    }
    periods
}

/// The resolved clock-source latency for one DFF: the summed edge delay along
/// its ancestor chain, plus the human-readable fragment used when a report
/// walks through that latency contribution (§4.6).
#[derive(Debug, Clone, Default)]
pub struct ClockLatency {
    pub latency: f64,
    pub report: String,
}

/// Resolve clock-source latency for every DFF in `ff_nodes` (§4.4).
///
/// Walks a single predecessor chain per step: at each node, the first
/// incoming edge whose source is a `ClockSource` or `ClockCell` is followed;
/// any other predecessor is ignored. A DFF with no such ancestor resolves to
/// latency 0 with an empty report — `UnresolvedClockLatency` (§7) is a silent
/// permissive default, not a diagnostic.
pub fn resolve_clock_latency(
    graph: &NetGraph,
    ff_nodes: &[NodeIndex],
) -> HashMap<NodeIndex, ClockLatency> {
    let mut result = HashMap::with_capacity(ff_nodes.len());

    for &dff in ff_nodes {
        let mut latency = 0.0;
        let mut report = String::new();
        let mut current = dff;

        loop {
            let step = graph
                .edges_directed(current, Incoming)
                .find_map(|edge| match &graph[edge.source()] {
                    NodeRole::ClockSource { .. } => Some((edge.source(), edge.weight(), true)),
                    NodeRole::ClockCell => Some((edge.source(), edge.weight(), false)),
                    _ => None,
                });

            match step {
                Some((pred, delay, is_source)) => {
                    let value = delay.value();
                    if value != 0.0 {
                        report.push_str(&report_line(
                            graph[pred].to_string().as_str(),
                            delay.report_tag(),
                            value,
                            latency + value,
                        ));
                    }
                    latency += value;
                    if is_source {
                        break;
                    }
                    current = pred;
                }
                None => break,
            }
        }

        result.insert(dff, ClockLatency { latency, report });
    }

    result
}

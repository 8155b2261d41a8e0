//! Path analyzer (§4.6): classifies each enumerated path and computes data
//! arrival time, setup/hold required time, and the slacks derived from them.
//!
//! Report text follows the fixed-width layout of the distilled `Path`
//! classes (`FFToFFPath`, `InToFFPath`, `FFToOutPath`) in the original
//! source, rebuilt here with [`crate::graph::report_line`] instead of one
//! f-string per subclass.

use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;

use crate::clock::ClockLatency;
use crate::graph::{report_line, NetGraph, NodeRole, Symbol};
use crate::partition::Partition;

pub const TSU: f64 = 1.0;
pub const THOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    FfToFf,
    FfToOut,
    InToFf,
    InToOut,
}

impl PathClass {
    pub fn label(&self) -> &'static str {
        match self {
            PathClass::FfToFf => "FF to FF",
            PathClass::FfToOut => "FF to Out",
            PathClass::InToFf => "In to FF",
            PathClass::InToOut => "In to Out",
        }
    }
}

/// One analyzed path, ready for sorting/truncation by the reporter (§4.7).
///
/// Setup and hold each get their own report text (§4.6): both share the
/// "data arrival time" trace but diverge on "data expected time" — setup's
/// trace carries the period and `tsu`, hold's carries only `thold` — so
/// `setup_report`/`hold_report` are kept separate rather than merged into one
/// string. `InToOut` paths have neither; `report` holds their flat
/// combinational trace instead.
pub struct AnalyzedPath {
    pub class: PathClass,
    pub data_arrival_time: f64,
    pub setup_slack: Option<f64>,
    pub hold_slack: Option<f64>,
    pub setup_report: String,
    pub hold_report: String,
    pub report: String,
}

impl AnalyzedPath {
    pub fn is_setup_violated(&self) -> bool {
        self.setup_slack.map_or(false, |s| s < 0.0)
    }

    pub fn is_hold_violated(&self) -> bool {
        self.hold_slack.map_or(false, |s| s < 0.0)
    }
}

fn domain_of(role: &NodeRole) -> &Symbol {
    match role {
        NodeRole::Dff { domain } => domain,
        _ => panic!("domain_of called on a non-DFF node"),
    }
}

/// Classify and compute timing for one enumerated path.
pub fn analyze_path(
    graph: &NetGraph,
    names: &HashMap<NodeIndex, Symbol>,
    path: &[NodeIndex],
    clk_periods: &HashMap<Symbol, f64>,
    latencies: &HashMap<NodeIndex, ClockLatency>,
    partition: &Partition,
) -> AnalyzedPath {
    let start = path[0];
    let end = *path.last().unwrap();
    let start_role = &graph[start];
    let end_role = &graph[end];

    let class = if start_role.is_dff() && end_role.is_dff() {
        PathClass::FfToFf
    } else if start_role.is_dff() && end_role.is_out_port() {
        PathClass::FfToOut
    } else if start_role.is_in_port() && end_role.is_dff() {
        PathClass::InToFf
    } else {
        PathClass::InToOut
    };

    let mut arrival_trace = String::new();
    arrival_trace.push_str("data arrival time:\n");

    let launch_latency = match class {
        PathClass::FfToFf | PathClass::FfToOut => {
            latencies.get(&start).cloned().unwrap_or_default()
        }
        PathClass::InToFf => latencies.get(&end).cloned().unwrap_or_default(),
        PathClass::InToOut => ClockLatency::default(),
    };

    let mut running = launch_latency.latency;
    if !launch_latency.report.is_empty() {
        arrival_trace.push_str(&launch_latency.report);
    }

    for (i, &node_idx) in path.iter().enumerate() {
        let role = &graph[node_idx];
        let name = names.get(&node_idx).map(|s| s.to_string()).unwrap_or_default();
        let tag = partition.tag_for(&Symbol::from(name.as_str()));

        if i + 1 < path.len() {
            let delta = role.instance_delay();
            if delta != 0.0 {
                running += delta;
                arrival_trace.push_str(&report_line(&name, &tag, delta, running));
            }

            let edge = graph.find_edge(node_idx, path[i + 1]);
            if let Some(edge_idx) = edge {
                let weight = &graph[edge_idx];
                let delta = weight.value();
                if delta != 0.0 {
                    running += delta;
                    arrival_trace.push_str(&report_line(&name, weight.report_tag(), delta, running));
                }
            }
        }
    }

    let data_arrival_time = running;

    if class == PathClass::InToOut {
        return AnalyzedPath {
            class,
            data_arrival_time,
            setup_slack: None,
            hold_slack: None,
            setup_report: String::new(),
            hold_report: String::new(),
            report: arrival_trace,
        };
    }

    let capture_dff = match class {
        PathClass::FfToFf | PathClass::InToFf => end,
        PathClass::FfToOut => start,
        PathClass::InToOut => unreachable!(),
    };
    let capture_domain = domain_of(&graph[capture_dff]);
    let capture_period = clk_periods.get(capture_domain).copied().unwrap_or(0.0);
    let capture_latency = latencies.get(&capture_dff).cloned().unwrap_or_default();

    // Setup required time: period + capture latency - tsu, its own trace.
    let mut setup_report = arrival_trace.clone();
    setup_report.push_str("data expected time:\n");
    let mut srt = 0.0;
    setup_report.push_str(&report_line("period", "", capture_period, capture_period));
    srt += capture_period;
    if !capture_latency.report.is_empty() {
        setup_report.push_str(&capture_latency.report);
    }
    srt += capture_latency.latency;
    srt -= TSU;
    setup_report.push_str(&report_line("tsu", "", -TSU, srt));

    let setup_slack = srt - data_arrival_time;

    setup_report.push_str(&"-".repeat(43));
    setup_report.push('\n');
    setup_report.push_str(&format!("setup slack: {setup_slack:.3} ns\n"));
    setup_report.push_str(&"=".repeat(80));
    setup_report.push('\n');

    // Hold required time: capture latency + thold, its own trace (no period).
    let mut hold_report = arrival_trace;
    hold_report.push_str("data expected time:\n");
    let mut hrt = 0.0;
    if !capture_latency.report.is_empty() {
        hold_report.push_str(&capture_latency.report);
    }
    hrt += capture_latency.latency;
    hrt += THOLD;
    hold_report.push_str(&report_line("thold", "", THOLD, hrt));

    let hold_slack = data_arrival_time - hrt;

    hold_report.push_str(&"-".repeat(43));
    hold_report.push('\n');
    hold_report.push_str(&format!("hold slack: {hold_slack:.3} ns\n"));
    hold_report.push_str(&"=".repeat(80));
    hold_report.push('\n');

    AnalyzedPath {
        class,
        data_arrival_time,
        setup_slack: Some(setup_slack),
        hold_slack: Some(hold_slack),
        setup_report,
        hold_report,
        report: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::clock::resolve_clock_latency;
    use crate::net::parse_net;
    use crate::partition::parse_partition;
    use crate::path::enumerate_all_paths;
    use std::collections::HashMap as Map;

    fn clk_periods(pairs: &[(&str, f64)]) -> HashMap<Symbol, f64> {
        pairs
            .iter()
            .map(|(k, v)| (Symbol::from(*k), *v))
            .collect()
    }

    #[test]
    fn ff_to_ff_no_cable_matches_scenario_one() {
        let net = parse_net("g1 s\ng2 l\ng2 s\ng3 l\n", &Map::new()).unwrap();
        let classified = classify(net, "g1 {ff c1}\ng2\ng3 {ff c1}\n").unwrap();
        let latencies = resolve_clock_latency(&classified.graph, &classified.ff_nodes);
        let periods = clk_periods(&[("c1", 1.0)]);
        let partition = parse_partition("");
        let paths = enumerate_all_paths(&classified.graph, &classified.ff_nodes, &classified.in_ports);
        assert_eq!(paths.len(), 1);
        let analyzed = analyze_path(
            &classified.graph,
            &classified.names,
            &paths[0],
            &periods,
            &latencies,
            &partition,
        );
        assert_eq!(analyzed.class, PathClass::FfToFf);
        assert_eq!(analyzed.data_arrival_time, 2.0);
        assert_eq!(analyzed.setup_slack, Some(-2.0));
        assert!(analyzed.is_setup_violated());
    }

    #[test]
    fn ff_to_ff_with_cable_matches_scenario_two() {
        let net = parse_net("g1 s\ng2 l 5\ng2 s\ng3 l\n", &Map::new()).unwrap();
        let classified = classify(net, "g1 {ff c1}\ng2\ng3 {ff c1}\n").unwrap();
        let latencies = resolve_clock_latency(&classified.graph, &classified.ff_nodes);
        let periods = clk_periods(&[("c1", 1.0)]);
        let partition = parse_partition("");
        let paths = enumerate_all_paths(&classified.graph, &classified.ff_nodes, &classified.in_ports);
        let analyzed = analyze_path(
            &classified.graph,
            &classified.names,
            &paths[0],
            &periods,
            &latencies,
            &partition,
        );
        assert_eq!(analyzed.data_arrival_time, 7.0);
        assert_eq!(analyzed.setup_slack, Some(-7.0));
    }

    #[test]
    fn in_to_ff_matches_scenario_four() {
        let net = parse_net("gp0 s\ng1 l\ng1 s\ng2 l\n", &Map::new()).unwrap();
        let classified = classify(net, "gp0\ng1\ng2 {ff c1}\n").unwrap();
        let latencies = resolve_clock_latency(&classified.graph, &classified.ff_nodes);
        let periods = clk_periods(&[("c1", 2.0)]);
        let partition = parse_partition("");
        let paths = enumerate_all_paths(&classified.graph, &classified.ff_nodes, &classified.in_ports);
        let analyzed = analyze_path(
            &classified.graph,
            &classified.names,
            &paths[0],
            &periods,
            &latencies,
            &partition,
        );
        assert_eq!(analyzed.class, PathClass::InToFf);
        assert_eq!(analyzed.data_arrival_time, 1.0);
        assert_eq!(analyzed.setup_slack, Some(0.0));
    }

    #[test]
    fn in_to_out_has_no_slack() {
        let net = parse_net("gp0 s\ng1 l\ng1 s\ngp1 l\n", &Map::new()).unwrap();
        let classified = classify(net, "gp0\ng1\ngp1\n").unwrap();
        let latencies = resolve_clock_latency(&classified.graph, &classified.ff_nodes);
        let periods = HashMap::new();
        let partition = parse_partition("");
        let paths = enumerate_all_paths(&classified.graph, &classified.ff_nodes, &classified.in_ports);
        assert_eq!(paths.len(), 1);
        let analyzed = analyze_path(
            &classified.graph,
            &classified.names,
            &paths[0],
            &periods,
            &latencies,
            &partition,
        );
        assert_eq!(analyzed.class, PathClass::InToOut);
        assert!(analyzed.setup_slack.is_none());
        assert!(analyzed.hold_slack.is_none());
        assert_eq!(analyzed.data_arrival_time, 1.0);
    }

    #[test]
    fn setup_and_hold_reports_are_distinct_traces() {
        let net = parse_net("g1 s\ng2 l\ng2 s\ng3 l\n", &Map::new()).unwrap();
        let classified = classify(net, "g1 {ff c1}\ng2\ng3 {ff c1}\n").unwrap();
        let latencies = resolve_clock_latency(&classified.graph, &classified.ff_nodes);
        let periods = clk_periods(&[("c1", 1.0)]);
        let partition = parse_partition("");
        let paths = enumerate_all_paths(&classified.graph, &classified.ff_nodes, &classified.in_ports);
        let analyzed = analyze_path(
            &classified.graph,
            &classified.names,
            &paths[0],
            &periods,
            &latencies,
            &partition,
        );
        assert_ne!(analyzed.setup_report, analyzed.hold_report);
        assert!(analyzed.setup_report.contains("tsu"));
        assert!(analyzed.setup_report.contains("setup slack"));
        assert!(!analyzed.setup_report.contains("hold slack"));
        assert!(analyzed.hold_report.contains("thold"));
        assert!(analyzed.hold_report.contains("hold slack"));
        assert!(!analyzed.hold_report.contains("setup slack"));
        assert!(!analyzed.hold_report.contains("period"));
    }
}

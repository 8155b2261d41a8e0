//! Static timing analysis for multi-FPGA partitioned netlists.
//!
//! # Pipeline
//!
//! Five flat, line-oriented design files are ingested into a single
//! [`graph::NetGraph`], classified into typed node roles, then walked to
//! enumerate and analyze every timing path:
//!
//! 1. [`tdm::parse_tdm`] — TDM delay formula table.
//! 2. [`net::parse_net`] — connectivity graph with resolved edge delays.
//! 3. [`classify::classify`] — node role assignment, power-node removal.
//! 4. [`clock::parse_clock_periods`] / [`clock::resolve_clock_latency`].
//! 5. [`partition::parse_partition`] — FPGA group annotations.
//! 6. [`path::enumerate_all_paths`] — every valid timing path.
//! 7. [`analyze::analyze_path`] — per-path slack computation.
//! 8. [`report::build_report`] / [`report::write_report`] — the final report.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use clap::Parser;
//! use sta::StaArgs;
//!
//! let args = StaArgs::parse();
//! sta::sta_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use prettytable::{format, row, Table};

pub mod analyze;
pub mod classify;
pub mod clock;
pub mod error;
pub mod graph;
pub mod net;
pub mod partition;
pub mod path;
pub mod report;
pub mod tdm;

pub use analyze::{AnalyzedPath, PathClass};
pub use error::StaError;
pub use graph::{DelayKind, NetGraph, NodeRole, Symbol};

const DESIGN_FILES: [&str; 5] = [
    "design.tdm",
    "design.net",
    "design.are",
    "design.clk",
    "design.node",
];

/// Command-line arguments for the `sta` binary (§4.8).
///
/// This tool has exactly one mode of operation, so `StaArgs` is a plain
/// struct rather than an enum of subcommands.
#[derive(Debug, Parser)]
#[clap(
    name = "sta",
    about = "Static timing analysis for multi-FPGA partitioned netlists"
)]
pub struct StaArgs {
    /// Directory containing design.net, design.are, design.clk, design.tdm,
    /// design.node.
    pub design_dir: PathBuf,

    /// Number of worst paths to report per category, clamped to 100.
    #[clap(long, default_value_t = report::TOP_N)]
    pub top: usize,

    /// Directory the report is written into.
    #[clap(long, default_value = "rpt")]
    pub report_dir: PathBuf,

    /// Print a console summary table before writing the report.
    #[clap(long)]
    pub summary: bool,
}

fn read_design_file(design_dir: &std::path::Path, name: &str) -> Result<String> {
    let path = design_dir.join(name);
    fs::read_to_string(&path).map_err(|_| anyhow::Error::new(StaError::MissingInput { path }))
}

/// Run the full pipeline for `args` and write the report to disk.
pub fn sta_main(args: StaArgs) -> Result<()> {
    let StaArgs {
        design_dir,
        top,
        report_dir,
        summary,
    } = args;

    for file in DESIGN_FILES {
        let path = design_dir.join(file);
        if !path.exists() {
            return Err(StaError::MissingInput { path }.into());
        }
    }

    let tdm_text = read_design_file(&design_dir, "design.tdm")?;
    let net_text = read_design_file(&design_dir, "design.net")?;
    let are_text = read_design_file(&design_dir, "design.are")?;
    let clk_text = read_design_file(&design_dir, "design.clk")?;
    let node_text = read_design_file(&design_dir, "design.node")?;

    let tdm_formulas = tdm::parse_tdm(&tdm_text);
    let raw_net = net::parse_net(&net_text, &tdm_formulas)
        .with_context(|| format!("parsing {}", design_dir.join("design.net").display()))?;
    let classified = classify::classify(raw_net, &are_text)
        .with_context(|| format!("parsing {}", design_dir.join("design.are").display()))?;
    let clk_periods = clock::parse_clock_periods(&clk_text);
    let latencies = clock::resolve_clock_latency(&classified.graph, &classified.ff_nodes);
    let partition = partition::parse_partition(&node_text);

    let paths = path::enumerate_all_paths(
        &classified.graph,
        &classified.ff_nodes,
        &classified.in_ports,
    );
    let analyzed: Vec<AnalyzedPath> = paths
        .iter()
        .map(|p| {
            analyze::analyze_path(
                &classified.graph,
                &classified.names,
                p,
                &clk_periods,
                &latencies,
                &partition,
            )
        })
        .collect();

    let summary_report = report::build_report(&analyzed, top);
    let case = report::case_name(&design_dir);
    report::write_report(&report_dir, &case, &summary_report)
        .with_context(|| format!("writing report for case {case}"))?;

    if summary {
        print_summary_table(&classified.graph, &analyzed, &summary_report);
    }

    Ok(())
}

fn print_summary_table(graph: &NetGraph, analyzed: &[AnalyzedPath], summary: &report::ReportSummary) {
    let mut roles = Table::new();
    roles.set_titles(row!["Role", "Count"]);
    let (mut dff, mut cell, mut clock_cell, mut port, mut clock_source) = (0, 0, 0, 0, 0);
    for idx in graph.node_indices() {
        match &graph[idx] {
            NodeRole::Dff { .. } => dff += 1,
            NodeRole::Cell { .. } => cell += 1,
            NodeRole::ClockCell => clock_cell += 1,
            NodeRole::Port { .. } => port += 1,
            NodeRole::ClockSource { .. } => clock_source += 1,
        }
    }
    roles.add_row(row!["DFF", dff]);
    roles.add_row(row!["Cell", cell]);
    roles.add_row(row!["ClockCell", clock_cell]);
    roles.add_row(row!["Port", port]);
    roles.add_row(row!["ClockSource", clock_source]);
    roles.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    roles.printstd();

    let mut classes = Table::new();
    classes.set_titles(row!["Path class", "Count", "Violated"]);
    for class in [
        PathClass::FfToFf,
        PathClass::FfToOut,
        PathClass::InToFf,
        PathClass::InToOut,
    ] {
        let count = analyzed.iter().filter(|p| p.class == class).count();
        let violated = analyzed
            .iter()
            .filter(|p| p.class == class && (p.is_setup_violated() || p.is_hold_violated()))
            .count();
        classes.add_row(row![class.label(), count, violated]);
    }
    classes.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    classes.printstd();

    println!(
        "total setup slack: {:.3} ns, total hold slack: {:.3} ns, total combinational delay: {:.3} ns",
        summary.total_setup_slack, summary.total_hold_slack, summary.total_combinational_delay
    );
}

//! Node roles and edge delay kinds for the timing graph.
//!
//! A single `StableGraph` carries every node and edge in the design, with
//! `StableGraph` (rather than `Graph`) chosen so that removing `Power` nodes
//! during classification does not invalidate the indices of nodes discovered
//! earlier.

use std::fmt;
use std::rc::Rc;

use petgraph::stable_graph::StableGraph;

pub use string_cache::DefaultAtom as Symbol;

/// How a node was observed to be wired in `design.net`: whether it ever drove
/// a net (appeared on an `s` line), was ever driven (appeared on an `l` line),
/// both, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Source,
    Sink,
    SourceSink,
}

/// Signal direction of a `Port` node once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    In,
    Out,
    /// Neither pure source nor pure sink — `PortDirectionConflict` (§7). The
    /// node is retained in the graph but the path enumerator never starts or
    /// ends a path at it.
    Conflict,
}

/// Timing role of a node in the net graph, the discriminated union of §3.
///
/// Exactly one role is assigned to every surviving node after classification
/// (`Power` nodes are removed outright, never appearing here).
#[derive(Debug, Clone)]
pub enum NodeRole {
    ClockSource {
        domain: Symbol,
    },
    /// `tco` is fixed at 1.0 ns per §3; clock source latency and its report
    /// fragment are resolved separately (see `clock.rs`) and looked up by
    /// node index rather than stored on the role, keeping the graph immutable
    /// once classification completes.
    Dff {
        domain: Symbol,
    },
    ClockCell,
    Cell {
        delay: f64,
    },
    Port {
        direction: PortDirection,
    },
}

impl NodeRole {
    pub fn is_dff(&self) -> bool {
        matches!(self, NodeRole::Dff { .. })
    }

    pub fn is_port(&self) -> bool {
        matches!(self, NodeRole::Port { .. })
    }

    pub fn is_in_port(&self) -> bool {
        matches!(
            self,
            NodeRole::Port {
                direction: PortDirection::In
            }
        )
    }

    pub fn is_out_port(&self) -> bool {
        matches!(
            self,
            NodeRole::Port {
                direction: PortDirection::Out
            }
        )
    }

    /// Interior-node eligibility for path enumeration (§4.5): only `Cell` and
    /// `ClockCell` may appear strictly between a path's endpoints.
    pub fn is_interior_eligible(&self) -> bool {
        matches!(self, NodeRole::Cell { .. } | NodeRole::ClockCell)
    }

    /// Instance delay contributed when this node is traversed mid-path
    /// (§4.6): a DFF contributes its `tco`, a `Cell` its gate delay, anything
    /// else (clock tree cells, ports) contributes nothing to the data path.
    pub fn instance_delay(&self) -> f64 {
        match self {
            NodeRole::Dff { .. } => 1.0,
            NodeRole::Cell { delay } => *delay,
            _ => 0.0,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::ClockSource { domain } => write!(f, "ClockSource({domain})"),
            NodeRole::Dff { domain } => write!(f, "DFF({domain})"),
            NodeRole::ClockCell => write!(f, "ClockCell"),
            NodeRole::Cell { delay } => write!(f, "Cell({delay})"),
            NodeRole::Port { direction } => write!(f, "Port({direction:?})"),
        }
    }
}

/// Shared, pre-parsed TDM delay formula: `λr. f(r)`. `Rc` rather than `Box` so
/// that every edge referencing the same TDM id shares one allocation instead
/// of cloning the closure per edge (see DESIGN.md).
pub type TdmFn = Rc<dyn Fn(f64) -> f64>;

/// Per-edge delay, the tagged variant of §3.
#[derive(Clone)]
pub enum DelayKind {
    Cable(f64),
    Tdm {
        formula: TdmFn,
        ratio: u32,
        /// The delay materialized once at edge-creation time (§4.2): calling
        /// `formula(ratio as f64)` during traversal would be redundant since
        /// the formula is pure and the ratio never changes post-ingestion.
        value: f64,
    },
    None,
}

impl DelayKind {
    /// The numeric delay this edge contributes, treating `None` as 0 per the
    /// invariant in §3.
    pub fn value(&self) -> f64 {
        match self {
            DelayKind::Cable(d) => *d,
            DelayKind::Tdm { value, .. } => *value,
            DelayKind::None => 0.0,
        }
    }

    /// The report-fragment tag used in clock delay and data arrival reports
    /// (§4.4, §4.6): `@cable` or `@tdm`.
    pub fn report_tag(&self) -> &'static str {
        match self {
            DelayKind::Cable(_) => "@cable",
            DelayKind::Tdm { .. } => "@tdm",
            DelayKind::None => "@cable",
        }
    }
}

impl fmt::Debug for DelayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayKind::Cable(d) => f.debug_tuple("Cable").field(d).finish(),
            DelayKind::Tdm { ratio, value, .. } => f
                .debug_struct("Tdm")
                .field("ratio", ratio)
                .field("value", value)
                .finish(),
            DelayKind::None => write!(f, "None"),
        }
    }
}

/// The timing graph: nodes carry a resolved [`NodeRole`], edges carry a
/// [`DelayKind`]. Constructed once during ingestion (`net.rs` + `classify.rs`)
/// and treated as immutable thereafter, per §5.
pub type NetGraph = StableGraph<NodeRole, DelayKind>;

/// One fixed-width report line shared by the clock-delay fragments (§4.4) and
/// the path analyzer (§4.6): `<name,9> <location,10> <delta,+10.3f> <running,10.3f>`.
pub fn report_line(name: &str, location: &str, delta: f64, running: f64) -> String {
    format!("    {name:<9}{location:<10}{delta:<+10.3}{running:<10.3}\n")
}

//! Path enumerator (§4.5).
//!
//! An explicit-stack depth-first walk, not recursion, so deep circuits don't
//! blow the call stack.

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction::Outgoing;

use crate::graph::{NetGraph, NodeRole, PortDirection};

struct Frame {
    node: NodeIndex,
    neighbors: Vec<NodeIndex>,
    next: usize,
}

/// Every simple path starting at `start` that ends at the first `DFF` or
/// `Port` reached, with an interior of `Cell`/`ClockCell` only (§4.5).
/// `start` itself must be a `DFF` or `Port(in)`; callers are expected to only
/// invoke this on such nodes (see [`enumerate_all_paths`]).
pub fn enumerate_paths(graph: &NetGraph, start: NodeIndex) -> Vec<Vec<NodeIndex>> {
    let mut results = Vec::new();
    let mut path = vec![start];
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    visited.insert(start);
    let mut stack = vec![Frame {
        node: start,
        neighbors: graph.neighbors_directed(start, Outgoing).collect(),
        next: 0,
    }];

    while !stack.is_empty() {
        let top = stack.len() - 1;
        if stack[top].next >= stack[top].neighbors.len() {
            let finished = stack.pop().unwrap();
            visited.remove(&finished.node);
            path.pop();
            continue;
        }

        let nbr = stack[top].neighbors[stack[top].next];
        stack[top].next += 1;

        if visited.contains(&nbr) {
            continue;
        }

        match &graph[nbr] {
            NodeRole::Dff { .. } => {
                path.push(nbr);
                results.push(path.clone());
                path.pop();
            }
            NodeRole::Port {
                direction: PortDirection::Conflict,
            } => {
                // PortDirectionConflict (§7): retained in the graph but
                // produces no paths.
            }
            NodeRole::Port { .. } => {
                path.push(nbr);
                results.push(path.clone());
                path.pop();
            }
            role if role.is_interior_eligible() => {
                path.push(nbr);
                visited.insert(nbr);
                stack.push(Frame {
                    node: nbr,
                    neighbors: graph.neighbors_directed(nbr, Outgoing).collect(),
                    next: 0,
                });
            }
            _ => {
                // ClockSource or anything else reached mid-path: not a valid
                // interior node, not an endpoint. Dead end.
            }
        }
    }

    results
}

/// Enumerate every path starting from any `DFF` or `Port(in)` node.
pub fn enumerate_all_paths(
    graph: &NetGraph,
    ff_nodes: &[NodeIndex],
    in_ports: &[NodeIndex],
) -> Vec<Vec<NodeIndex>> {
    ff_nodes
        .iter()
        .chain(in_ports.iter())
        .flat_map(|&start| enumerate_paths(graph, start))
        .collect()
}

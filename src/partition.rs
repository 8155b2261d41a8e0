//! FPGA partition map (`design.node`, §6).
//!
//! The simplest of the five parsers: no regex needed, just a split on the
//! literal token `FPGA` — grounded on the same "don't reach for a generated
//! grammar when a flat split will do" reasoning as the other ingestion
//! modules.

use std::collections::HashMap;

use crate::graph::Symbol;

/// `fpga_groups[i]` is the ordered set of node names assigned to the `i`-th
/// `FPGA` section of `design.node`. `group_of` maps a node name back to its
/// group index for report annotation (§4.6's `@FPGAn`).
pub struct Partition {
    pub fpga_groups: Vec<Vec<Symbol>>,
    pub group_of: HashMap<Symbol, usize>,
}

/// Parse `design.node`: split on the token `FPGA`; each resulting section
/// contributes one ordered group of every `g...` identifier it contains.
pub fn parse_partition(input: &str) -> Partition {
    let mut fpga_groups = Vec::new();
    let mut group_of = HashMap::new();

    for section in input.split("FPGA").skip(1) {
        let mut group = Vec::new();
        for token in section.split_whitespace() {
            if token.starts_with('g') {
                let name = Symbol::from(token);
                group_of.entry(name.clone()).or_insert(fpga_groups.len());
                group.push(name);
            }
        }
        fpga_groups.push(group);
    }

    Partition {
        fpga_groups,
        group_of,
    }
}

impl Partition {
    /// The `@FPGAn` report tag for `name`, or `@FPGA?` if unpartitioned.
    pub fn tag_for(&self, name: &Symbol) -> String {
        match self.group_of.get(name) {
            Some(idx) => format!("@FPGA{idx}"),
            None => "@FPGA?".to_string(),
        }
    }
}

//! Crate-level error taxonomy (§7).
//!
//! A plain `enum` + manual `Display`/`Error`, not `anyhow!` ad hoc strings,
//! because callers (tests, the CLI) need to match on the fatal error kinds.
//! `anyhow::Error` wraps this at the CLI boundary.
//!
//! Only the fatal kinds get a variant here. `UnresolvedClockLatency` is a
//! permissive default (latency 0, no diagnostic), `PortDirectionConflict` and
//! `FloatingAttribute` are warnings printed to stderr where they occur — none
//! of the three ever abort the pipeline, so none needs a typed error path.

use std::fmt;
use std::path::PathBuf;

use crate::graph::Symbol;

#[derive(Debug, PartialEq, Eq)]
pub enum StaError {
    /// A required design file is absent from the input directory.
    MissingInput { path: PathBuf },
    /// A `design.net` line does not match the connectivity grammar (§6).
    MalformedNetLine { line: usize, text: String },
    /// A `design.are` line does not match the attribute grammar (§6).
    MalformedAttribute { line: usize, text: String },
    /// An edge in `design.net` references a TDM id absent from `design.tdm`.
    UnknownTdmId { id: Symbol, line: usize },
}

impl fmt::Display for StaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaError::MissingInput { path } => {
                write!(f, "missing required input file: {}", path.display())
            }
            StaError::MalformedNetLine { line, text } => {
                write!(f, "design.net:{line}: malformed connectivity line: {text:?}")
            }
            StaError::MalformedAttribute { line, text } => {
                write!(f, "design.are:{line}: malformed attribute line: {text:?}")
            }
            StaError::UnknownTdmId { id, line } => {
                write!(f, "design.net:{line}: reference to undefined TDM id {id}")
            }
        }
    }
}

impl std::error::Error for StaError {}

// =============================================================================
// vmsim-core — Error Taxonomy
// =============================================================================
//
// Three kinds of problem can occur while driving a simulation, and the spec
// treats them very differently:
//
//   ParseWarning               — unrecognised instruction-file line. Non-fatal,
//                                 surfaced to the caller alongside the parsed
//                                 instruction list. Never returned as an `Err`.
//   UnknownPointer              — a `use`/`delete` on an unknown or dead ptr_id.
//                                 Logged and treated as a no-op step. Never
//                                 returned as an `Err` either.
//   InternalInvariantViolation  — an engine bug: a §3 invariant failed at a
//                                 step boundary, or a policy was asked to pick
//                                 a victim with no occupied frame. Fatal.
//
// Only the last of these is a real `SimError` — parsing is infallible by
// design (see `spec.md` §7: "the workload layer never raises"), and an
// unknown pointer is a workload-authoring problem, not an engine fault.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal engine error. Once `Driver::step` returns this, the session is done
/// — the invariants in `spec.md` §3 no longer hold and continuing would only
/// compound the corruption.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A §3 invariant failed at a step boundary, or a policy was asked to
    /// evict from an empty RAM (reaching a policy always implies RAM is full).
    #[error("internal invariant violation: {0}")]
    InternalInvariantViolation(String),
}

/// A non-fatal problem noticed while parsing an instruction file.
///
/// Collected into a `Vec<ParseWarning>` returned alongside the parsed
/// instruction list; never aborts parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number in the source text.
    pub line_number: usize,
    /// The offending line, verbatim (whitespace untrimmed).
    pub line: String,
    /// Human-readable reason the line was skipped.
    pub reason: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: unrecognised instruction {:?} ({})",
            self.line_number, self.line, self.reason
        )
    }
}

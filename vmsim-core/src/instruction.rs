// =============================================================================
// vmsim-core — Instruction Model & Parser
// =============================================================================
//
// spec.md §3 defines four instruction shapes, and §4.A/§6 define the textual
// format they round-trip through:
//
//   new(<pid>,<size_bytes>)
//   use(<ptr_id>)
//   delete(<ptr_id>)
//   kill(<pid>)
//
// one per line, case-insensitive keywords, whitespace ignored, ptr_id
// implicit (assigned in file order starting at a caller-supplied counter).
// Unrecognised lines become a `ParseWarning` and are skipped, never a hard
// parse error — per spec.md §7, the workload layer never raises.

use serde::{Deserialize, Serialize};

use crate::error::ParseWarning;
use crate::memory::{Pid, PtrId};

/// One line of a workload: an allocation, a touch, a free, or a process
/// teardown (spec.md §3, ProcessInstruction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessInstruction {
    New {
        pid: Pid,
        size_bytes: u32,
        ptr_id: PtrId,
    },
    Use {
        ptr_id: PtrId,
    },
    Delete {
        ptr_id: PtrId,
    },
    Kill {
        pid: Pid,
    },
}

/// Result of parsing an instruction file: the recognised instructions, any
/// warnings for skipped lines, and the next unused ptr_id (so a caller can
/// keep generating or appending without colliding with ids this file used).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub instructions: Vec<ProcessInstruction>,
    pub warnings: Vec<ParseWarning>,
    pub next_ptr_id: PtrId,
}

/// Parse UTF-8 instruction text (spec.md §6). `start_ptr_id` is the first
/// ptr_id to assign to a `new` line; ptr_ids are then assigned sequentially
/// in file order, regardless of any id written in the source text (there
/// isn't one — `new` lines never carry an explicit ptr_id).
pub fn parse_workload(text: &str, start_ptr_id: PtrId) -> ParseOutcome {
    let mut instructions = Vec::new();
    let mut warnings = Vec::new();
    let mut next_ptr_id = start_ptr_id;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        // "whitespace ignored" (spec.md §6): collapse it all out before matching.
        let compact: String = raw_line.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            continue;
        }

        match parse_line(&compact, next_ptr_id) {
            Ok(Parsed::New { pid, size_bytes }) => {
                instructions.push(ProcessInstruction::New {
                    pid,
                    size_bytes,
                    ptr_id: next_ptr_id,
                });
                next_ptr_id += 1;
            }
            Ok(Parsed::Use { ptr_id }) => instructions.push(ProcessInstruction::Use { ptr_id }),
            Ok(Parsed::Delete { ptr_id }) => {
                instructions.push(ProcessInstruction::Delete { ptr_id })
            }
            Ok(Parsed::Kill { pid }) => instructions.push(ProcessInstruction::Kill { pid }),
            Err(reason) => {
                log::warn!("vmsim: {}: {} ({})", line_number, raw_line, reason);
                warnings.push(ParseWarning {
                    line_number,
                    line: raw_line.to_string(),
                    reason,
                });
            }
        }
    }

    ParseOutcome {
        instructions,
        warnings,
        next_ptr_id,
    }
}

enum Parsed {
    New { pid: Pid, size_bytes: u32 },
    Use { ptr_id: PtrId },
    Delete { ptr_id: PtrId },
    Kill { pid: Pid },
}

fn parse_line(compact: &str, _next_ptr_id: PtrId) -> Result<Parsed, String> {
    if let Some(rest) = strip_ci_prefix(compact, "new(") {
        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| "new(...) missing closing paren".to_string())?;
        let (pid_str, size_str) = inner
            .split_once(',')
            .ok_or_else(|| "new(...) expects pid,size_bytes".to_string())?;
        let pid = validate_token(pid_str)?;
        let size_bytes: u32 = size_str
            .parse()
            .map_err(|_| format!("size_bytes {:?} is not a non-negative integer", size_str))?;
        if size_bytes == 0 {
            return Err("size_bytes must be at least 1".to_string());
        }
        return Ok(Parsed::New { pid, size_bytes });
    }

    if let Some(rest) = strip_ci_prefix(compact, "use(") {
        let ptr_id = parse_ptr_id(rest)?;
        return Ok(Parsed::Use { ptr_id });
    }

    if let Some(rest) = strip_ci_prefix(compact, "delete(") {
        let ptr_id = parse_ptr_id(rest)?;
        return Ok(Parsed::Delete { ptr_id });
    }

    if let Some(rest) = strip_ci_prefix(compact, "kill(") {
        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| "kill(...) missing closing paren".to_string())?;
        let pid = validate_token(inner)?;
        return Ok(Parsed::Kill { pid });
    }

    Err("unrecognised instruction".to_string())
}

fn parse_ptr_id(rest: &str) -> Result<PtrId, String> {
    let inner = rest
        .strip_suffix(')')
        .ok_or_else(|| "missing closing paren".to_string())?;
    inner
        .parse()
        .map_err(|_| format!("ptr_id {:?} is not a non-negative integer", inner))
}

fn validate_token(s: &str) -> Result<Pid, String> {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(s.to_string())
    } else {
        Err(format!("{:?} is not a valid pid token", s))
    }
}

/// Case-insensitive prefix strip that preserves the original case of the
/// remainder (pid tokens keep whatever case the author wrote).
fn strip_ci_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() < prefix.len() {
        return None;
    }
    let (head, tail) = s.split_at(prefix.len());
    if head.eq_ignore_ascii_case(prefix) {
        Some(tail)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_four_shapes() {
        let text = "new(A,4096)\nUSE(1)\ndelete(1)\nKiLL(A)\n";
        let outcome = parse_workload(text, 1);
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            outcome.instructions,
            vec![
                ProcessInstruction::New {
                    pid: "A".to_string(),
                    size_bytes: 4096,
                    ptr_id: 1
                },
                ProcessInstruction::Use { ptr_id: 1 },
                ProcessInstruction::Delete { ptr_id: 1 },
                ProcessInstruction::Kill { pid: "A".to_string() },
            ]
        );
        assert_eq!(outcome.next_ptr_id, 2);
    }

    #[test]
    fn ignores_whitespace_and_blank_lines() {
        let text = "  new( A , 4096 )  \n\n   \nuse( 1 )\n";
        let outcome = parse_workload(text, 1);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.instructions.len(), 2);
    }

    #[test]
    fn unrecognised_lines_become_warnings_not_errors() {
        let text = "new(A,4096)\nnonsense line\nuse(1)\n";
        let outcome = parse_workload(text, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].line_number, 2);
        assert_eq!(outcome.instructions.len(), 2);
    }

    #[test]
    fn ptr_ids_assigned_sequentially_from_start() {
        let text = "new(A,100)\nnew(A,100)\nnew(B,100)\n";
        let outcome = parse_workload(text, 5);
        let ptr_ids: Vec<PtrId> = outcome
            .instructions
            .iter()
            .map(|i| match i {
                ProcessInstruction::New { ptr_id, .. } => *ptr_id,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ptr_ids, vec![5, 6, 7]);
        assert_eq!(outcome.next_ptr_id, 8);
    }

    #[test]
    fn rejects_zero_size_and_bad_tokens() {
        let text = "new(A,0)\nnew(,4096)\n";
        let outcome = parse_workload(text, 1);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.instructions.is_empty());
    }
}

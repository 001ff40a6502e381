// =============================================================================
// vmsim-core — Instruction Serialization
// =============================================================================
//
// Inverse of `instruction::parse_workload` (spec.md §4.A "Serialization").
// `ptr_id` is never emitted on `new` lines — it is implicit in line order,
// the same way the parser reconstructs it.

use crate::instruction::ProcessInstruction;

/// Render a workload back to the textual format, one instruction per line.
pub fn serialize_workload(instructions: &[ProcessInstruction]) -> String {
    let mut out = String::new();
    for instr in instructions {
        match instr {
            ProcessInstruction::New {
                pid, size_bytes, ..
            } => {
                out.push_str(&format!("new({},{})\n", pid, size_bytes));
            }
            ProcessInstruction::Use { ptr_id } => {
                out.push_str(&format!("use({})\n", ptr_id));
            }
            ProcessInstruction::Delete { ptr_id } => {
                out.push_str(&format!("delete({})\n", ptr_id));
            }
            ProcessInstruction::Kill { pid } => {
                out.push_str(&format!("kill({})\n", pid));
            }
        }
    }
    out
}

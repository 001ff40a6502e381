// =============================================================================
// vmsim-core — Configuration Constants
// =============================================================================
//
// spec.md §3/§6 fixes page size = 4096 bytes, RAM = 100 frames (400 KB),
// hit cost = 1 simulated second, fault cost = 5 simulated seconds — and then
// notes "making these parameters is acceptable." We take it up on that: both
// the engine and the workload generator take an owned config struct rather
// than free constants, the way the teacher prefers named, documented structs
// over positional parameters (c.f. `MemoryStats` in `memory/pmm.rs`).
//
// The module-level constants below are the spec's defaults and are what
// `SimConfig::default()` returns; reach for them directly only in contexts
// (doctests, quick scripts) that do not otherwise have a `SimConfig` in hand.

use serde::{Deserialize, Serialize};

/// Default logical/physical page size, in bytes.
pub const PAGE_SIZE_BYTES: u32 = 4096;

/// Default RAM capacity, in frames (400 KB at the default page size).
pub const TOTAL_RAM_FRAMES: usize = 100;

/// Default cost of a page hit, in simulated seconds.
pub const HIT_TIME: u64 = 1;

/// Default cost of a page fault, in simulated seconds. The full fault cost
/// counts toward thrashing time (spec.md §3).
pub const FAULT_TIME: u64 = 5;

/// Tunable engine parameters. `Default` reproduces the spec's fixed
/// constants exactly; everything else in this crate is generic over this
/// struct rather than hardcoding the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Bytes per logical/physical page.
    pub page_size_bytes: u32,
    /// Number of physical RAM frames.
    pub total_ram_frames: usize,
    /// Simulated-second cost of a page hit.
    pub hit_time: u64,
    /// Simulated-second cost of a page fault.
    pub fault_time: u64,
}

impl SimConfig {
    /// Total RAM capacity in kilobytes, derived from `page_size_bytes` and
    /// `total_ram_frames`.
    pub fn total_ram_kb(&self) -> f64 {
        (self.page_size_bytes as f64 / 1024.0) * self.total_ram_frames as f64
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            page_size_bytes: PAGE_SIZE_BYTES,
            total_ram_frames: TOTAL_RAM_FRAMES,
            hit_time: HIT_TIME,
            fault_time: FAULT_TIME,
        }
    }
}

/// Parameters for synthetic workload generation (spec.md §4.A).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of processes `P1..PP` to simulate.
    pub process_count: u32,
    /// Target number of instructions `N` before final cleanup `kill`s.
    pub op_count: u32,
    /// Seed string. Same seed + same config ⇒ identical instruction stream.
    pub seed: String,
    /// Minimum `new` allocation size, in bytes (inclusive).
    pub min_alloc_bytes: u32,
    /// Maximum `new` allocation size, in bytes (inclusive).
    pub max_alloc_bytes: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            process_count: 8,
            op_count: 500,
            seed: "vmsim".to_string(),
            min_alloc_bytes: 100,
            max_alloc_bytes: 16 * 1024,
        }
    }
}

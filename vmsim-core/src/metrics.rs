// =============================================================================
// vmsim-core — Algorithm Metrics
// =============================================================================
//
// spec.md §3 splits metrics into two kinds:
//   - accumulated incrementally as instructions are applied: page_faults,
//     page_hits, total_time, thrashing_time;
//   - recomputed from scratch at every step boundary from the authoritative
//     state (RAM frames + MMU + active pointers): ram_used_kb, v_ram_used_kb,
//     running_processes, internal_fragmentation_kb, and the percentages.
//
// §4.D is explicit that we must not attempt incremental maintenance of the
// second group — `Metrics::recompute` below is the single place that does,
// driven directly off spec.md §3's invariants 2-5.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::memory::{ActivePointers, Mmu, PageFrame};

/// A snapshot of one policy's running performance counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmMetrics {
    pub page_faults: u64,
    pub page_hits: u64,
    /// `hit_time * page_hits + fault_time * page_faults` (spec.md §8 property 3).
    pub total_time: u64,
    /// `fault_time * page_faults` (spec.md §8 property 4).
    pub thrashing_time: u64,
    pub ram_used_kb: u32,
    pub v_ram_used_kb: u32,
    pub internal_fragmentation_kb: u32,
    pub running_processes: u32,
    /// `ram_used_kb` as a percentage of total RAM capacity.
    pub ram_used_pct: f64,
    /// `v_ram_used_kb` as a percentage of total RAM capacity (swapped
    /// volume compared against the same RAM budget, for side-by-side
    /// reading against `ram_used_pct`).
    pub v_ram_used_pct: f64,
}

impl AlgorithmMetrics {
    pub fn zero() -> Self {
        AlgorithmMetrics {
            page_faults: 0,
            page_hits: 0,
            total_time: 0,
            thrashing_time: 0,
            ram_used_kb: 0,
            v_ram_used_kb: 0,
            internal_fragmentation_kb: 0,
            running_processes: 0,
            ram_used_pct: 0.0,
            v_ram_used_pct: 0.0,
        }
    }

    pub fn record_hit(&mut self, hit_time: u64) {
        self.page_hits += 1;
        self.total_time += hit_time;
    }

    pub fn record_fault(&mut self, fault_time: u64) {
        self.page_faults += 1;
        self.total_time += fault_time;
        self.thrashing_time += fault_time;
    }

    /// Recompute every derived field from the authoritative state. Called
    /// once at the end of every instruction (spec.md §4.D).
    pub fn recompute(
        &mut self,
        config: &SimConfig,
        frames: &[PageFrame],
        mmu: &Mmu,
        active_pointers: &ActivePointers,
    ) {
        let page_size_kb = config.page_size_bytes as f64 / 1024.0;

        let resident_count = frames.iter().filter(|f| f.occupant.is_some()).count() as u32;
        self.ram_used_kb = (resident_count as f64 * page_size_kb) as u32;

        let swapped_count = mmu.values().filter(|p| !p.residency.is_resident()).count() as u32;
        self.v_ram_used_kb = (swapped_count as f64 * page_size_kb) as u32;

        let fragmentation_bytes: u64 = mmu
            .values()
            .filter(|p| p.residency.is_resident())
            .map(|p| p.internal_fragmentation_bytes(config.page_size_bytes) as u64)
            .sum();
        self.internal_fragmentation_kb = (fragmentation_bytes / 1024) as u32;

        let mut pids: Vec<&str> = active_pointers.values().map(|ap| ap.pid.as_str()).collect();
        pids.sort_unstable();
        pids.dedup();
        self.running_processes = pids.len() as u32;

        let total_ram_kb = config.total_ram_kb();
        if total_ram_kb > 0.0 {
            self.ram_used_pct = (self.ram_used_kb as f64 / total_ram_kb) * 100.0;
            self.v_ram_used_pct = (self.v_ram_used_kb as f64 / total_ram_kb) * 100.0;
        } else {
            self.ram_used_pct = 0.0;
            self.v_ram_used_pct = 0.0;
        }
    }
}

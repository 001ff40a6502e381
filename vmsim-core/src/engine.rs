// =============================================================================
// vmsim-core — Simulation Engine
// =============================================================================
//
// spec.md §4.D: one `AlgorithmSimulationState` per policy, applying one
// `ProcessInstruction` at a time. This module owns the RAM frames, the MMU,
// the active-pointers table, and the running metrics for a single policy —
// two of these (one pinned to OPT, one to the chosen policy) are what
// `Driver` runs in lock-step over the same instruction stream.
//
// Per spec.md §9's Design Note, state is a plain aggregate of owned
// containers (`Vec`, `BTreeMap`) updated in place; nothing here clones by
// serialising and reparsing.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::instruction::ProcessInstruction;
use crate::memory::{
    ActivePointer, ActivePointers, FrameId, FrameOccupant, LogicalPage, LogicalPageId, Mmu,
    PageFrame, Pid, PtrId, Residency,
};
use crate::metrics::AlgorithmMetrics;
use crate::policy::{decide, AlgorithmName, Decision, FutureView, ReplacementContext};
use crate::rng::Rng;

/// Per-policy simulation state (spec.md §3, `AlgorithmSimulationState`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmSimulationState {
    pub config: SimConfig,
    pub algorithm: AlgorithmName,
    pub frames: Vec<PageFrame>,
    pub mmu: Mmu,
    pub active_pointers: ActivePointers,
    pub metrics: AlgorithmMetrics,
    pub sc_hand: usize,
    pub rng: Rng,
}

impl AlgorithmSimulationState {
    /// Build a fresh, empty state for `algorithm`. `seed` is the session
    /// seed; this policy's own RNG stream is derived from
    /// `seed || algorithm_name` (spec.md §4.B), independent of every other
    /// policy's stream and of workload generation.
    pub fn new(config: SimConfig, algorithm: AlgorithmName, seed: &str) -> Self {
        AlgorithmSimulationState {
            frames: vec![PageFrame::empty(); config.total_ram_frames],
            mmu: Mmu::new(),
            active_pointers: ActivePointers::new(),
            metrics: AlgorithmMetrics::zero(),
            sc_hand: 0,
            rng: Rng::derive(seed, algorithm.label()),
            config,
            algorithm,
        }
    }

    /// Apply one instruction (spec.md §4.D). `future`, when present, is the
    /// full instruction list plus the index of `instr` within it — handed
    /// through unchanged to OPT if this policy needs to evict.
    pub fn apply(
        &mut self,
        instr: &ProcessInstruction,
        future: Option<FutureView<'_>>,
    ) -> Result<(), SimError> {
        match instr {
            ProcessInstruction::New {
                pid,
                size_bytes,
                ptr_id,
            } => self.apply_new(pid, *size_bytes, *ptr_id, future)?,
            ProcessInstruction::Use { ptr_id } => self.apply_use(*ptr_id, future)?,
            ProcessInstruction::Delete { ptr_id } => self.apply_delete(*ptr_id),
            ProcessInstruction::Kill { pid } => self.apply_kill(pid),
        }

        self.metrics
            .recompute(&self.config, &self.frames, &self.mmu, &self.active_pointers);
        self.check_invariants()
    }

    fn apply_new(
        &mut self,
        pid: &Pid,
        size_bytes: u32,
        ptr_id: PtrId,
        future: Option<FutureView<'_>>,
    ) -> Result<(), SimError> {
        let page_size = self.config.page_size_bytes;
        let num_pages = size_bytes.div_ceil(page_size);

        for page_index in 0..num_pages {
            let content_size_bytes = if page_index + 1 == num_pages {
                let remainder = size_bytes % page_size;
                if remainder == 0 {
                    page_size
                } else {
                    remainder
                }
            } else {
                page_size
            };
            let page_id = LogicalPageId::new(ptr_id, page_index);
            let timestamp = self.metrics.total_time;

            let frame_id = if let Some(free) = self.frames.iter().position(PageFrame::is_free) {
                self.metrics.record_hit(self.config.hit_time);
                free
            } else {
                let frame_id = self.evict_for(page_id, future)?;
                self.metrics.record_fault(self.config.fault_time);
                frame_id
            };

            self.frames[frame_id].occupant = Some(FrameOccupant {
                page_id,
                pid: pid.clone(),
                loaded_timestamp: timestamp,
                last_access_timestamp: timestamp,
                reference_bit: false,
            });
            self.mmu.insert(
                page_id,
                LogicalPage {
                    id: page_id,
                    pid: pid.clone(),
                    residency: Residency::Resident { frame_id },
                    load_timestamp: timestamp,
                    last_access_timestamp: timestamp,
                    reference_bit: false,
                    content_size_bytes,
                },
            );

            self.active_pointers
                .entry(ptr_id)
                .or_insert_with(|| ActivePointer {
                    pid: pid.clone(),
                    pages: Vec::new(),
                })
                .pages
                .push(page_id);
        }

        Ok(())
    }

    fn apply_use(&mut self, ptr_id: PtrId, future: Option<FutureView<'_>>) -> Result<(), SimError> {
        let Some(entry) = self.active_pointers.get(&ptr_id) else {
            log::warn!("vmsim: use({}) refers to an unknown or dead ptr_id", ptr_id);
            return Ok(());
        };
        // Snapshot the page order up front: the loop below may insert new
        // frames/pages via eviction, but never touches this ptr's own list.
        let pages = entry.pages.clone();
        let pid = entry.pid.clone();

        for page_id in pages {
            let timestamp = self.metrics.total_time;
            let resident = self
                .mmu
                .get(&page_id)
                .map(|p| p.residency.is_resident())
                .ok_or_else(|| {
                    SimError::InternalInvariantViolation(format!(
                        "active pointer {} lists page {:?} missing from MMU",
                        ptr_id, page_id
                    ))
                })?;

            if resident {
                let frame_id = self.touch_resident(page_id, timestamp)?;
                debug_assert!(self.frames[frame_id].occupant.is_some());
                self.metrics.record_hit(self.config.hit_time);
            } else {
                let frame_id = if let Some(free) = self.frames.iter().position(PageFrame::is_free) {
                    free
                } else {
                    self.evict_for(page_id, future)?
                };
                self.metrics.record_fault(self.config.fault_time);
                self.frames[frame_id].occupant = Some(FrameOccupant {
                    page_id,
                    pid: pid.clone(),
                    loaded_timestamp: timestamp,
                    last_access_timestamp: timestamp,
                    reference_bit: true,
                });
                if let Some(page) = self.mmu.get_mut(&page_id) {
                    page.residency = Residency::Resident { frame_id };
                    page.load_timestamp = timestamp;
                    page.last_access_timestamp = timestamp;
                    page.reference_bit = true;
                }
            }
        }

        Ok(())
    }

    /// Mark an already-resident page as just-accessed: bump its last-access
    /// timestamp and set its reference bit, on both halves of the
    /// bidirectional frame/page mapping. Returns the frame it lives in.
    fn touch_resident(&mut self, page_id: LogicalPageId, timestamp: u64) -> Result<FrameId, SimError> {
        let page = self.mmu.get_mut(&page_id).ok_or_else(|| {
            SimError::InternalInvariantViolation(format!("page {:?} missing from MMU", page_id))
        })?;
        page.last_access_timestamp = timestamp;
        page.reference_bit = true;
        let frame_id = page.residency.frame_id().ok_or_else(|| {
            SimError::InternalInvariantViolation(format!(
                "page {:?} marked resident with no frame",
                page_id
            ))
        })?;
        let occupant = self.frames[frame_id].occupant.as_mut().ok_or_else(|| {
            SimError::InternalInvariantViolation(format!(
                "frame {} has no occupant for resident page {:?}",
                frame_id, page_id
            ))
        })?;
        occupant.last_access_timestamp = timestamp;
        occupant.reference_bit = true;
        Ok(frame_id)
    }

    fn apply_delete(&mut self, ptr_id: PtrId) {
        let Some(entry) = self.active_pointers.remove(&ptr_id) else {
            log::warn!("vmsim: delete({}) refers to an unknown or dead ptr_id", ptr_id);
            return;
        };
        self.free_pointer_pages(&entry.pages);
    }

    fn apply_kill(&mut self, pid: &Pid) {
        let dead_ptrs: Vec<PtrId> = self
            .active_pointers
            .iter()
            .filter(|(_, entry)| &entry.pid == pid)
            .map(|(ptr_id, _)| *ptr_id)
            .collect();
        for ptr_id in dead_ptrs {
            if let Some(entry) = self.active_pointers.remove(&ptr_id) {
                self.free_pointer_pages(&entry.pages);
            }
        }
    }

    fn free_pointer_pages(&mut self, pages: &[LogicalPageId]) {
        for page_id in pages {
            if let Some(page) = self.mmu.remove(page_id) {
                if let Residency::Resident { frame_id } = page.residency {
                    self.frames[frame_id].occupant = None;
                }
            }
        }
    }

    /// Ask the configured policy for a victim and commit its decision:
    /// evict the chosen page to symbolic disk, clear whatever reference
    /// bits Second Chance asked for, and advance the hand. Returns the
    /// now-free frame id the caller should install the new page into.
    fn evict_for(
        &mut self,
        loading_page: LogicalPageId,
        future: Option<FutureView<'_>>,
    ) -> Result<FrameId, SimError> {
        let decision: Decision = {
            let mut ctx = ReplacementContext {
                frames: &self.frames,
                mmu: &self.mmu,
                loading_page,
                future,
                sc_hand: self.sc_hand,
                rng: &mut self.rng,
            };
            decide(self.algorithm, &mut ctx)?
        };

        let victim_page_id = decision.victim_logical_page_id.ok_or_else(|| {
            SimError::InternalInvariantViolation("policy decision carried no victim page".to_string())
        })?;

        {
            let victim = self.mmu.get_mut(&victim_page_id).ok_or_else(|| {
                SimError::InternalInvariantViolation(format!(
                    "victim page {:?} missing from MMU",
                    victim_page_id
                ))
            })?;
            victim.residency = Residency::Swapped {
                disk_address: victim_page_id.symbolic_disk_address(),
            };
            victim.reference_bit = false;
        }
        self.frames[decision.victim_frame_id].occupant = None;

        for cleared_id in &decision.clear_reference_bits {
            if let Some(page) = self.mmu.get_mut(cleared_id) {
                page.reference_bit = false;
                if let Residency::Resident { frame_id } = page.residency {
                    if let Some(occ) = self.frames[frame_id].occupant.as_mut() {
                        occ.reference_bit = false;
                    }
                }
            }
        }

        if let Some(next_hand) = decision.next_hand_position {
            self.sc_hand = next_hand;
        }

        Ok(decision.victim_frame_id)
    }

    /// Re-check every invariant in spec.md §3 that isn't already guaranteed
    /// by construction via `AlgorithmMetrics::recompute`. A violation here
    /// means this engine has a bug, not that the workload is malformed
    /// (spec.md §7) — fatal, and the caller must stop calling `apply`.
    fn check_invariants(&self) -> Result<(), SimError> {
        for (frame_id, frame) in self.frames.iter().enumerate() {
            if let Some(occ) = &frame.occupant {
                match self.mmu.get(&occ.page_id) {
                    Some(page) if page.residency.frame_id() == Some(frame_id) => {}
                    _ => {
                        return Err(SimError::InternalInvariantViolation(format!(
                            "frame {} occupant not mirrored by its logical page",
                            frame_id
                        )))
                    }
                }
            }
        }
        for page in self.mmu.values() {
            if let Residency::Resident { frame_id } = page.residency {
                match self.frames.get(frame_id).and_then(|f| f.occupant.as_ref()) {
                    Some(occ) if occ.page_id == page.id => {}
                    _ => {
                        return Err(SimError::InternalInvariantViolation(format!(
                            "resident page {:?} not mirrored by frame {}",
                            page.id, frame_id
                        )))
                    }
                }
            }
        }
        for (ptr_id, entry) in &self.active_pointers {
            if entry.pages.is_empty() {
                return Err(SimError::InternalInvariantViolation(format!(
                    "active ptr_id {} has no pages",
                    ptr_id
                )));
            }
            for page_id in &entry.pages {
                if !self.mmu.contains_key(page_id) {
                    return Err(SimError::InternalInvariantViolation(format!(
                        "ptr_id {} references missing page {:?}",
                        ptr_id, page_id
                    )));
                }
            }
        }
        for page in self.mmu.values() {
            match self.active_pointers.get(&page.id.ptr_id) {
                Some(entry) if entry.pages.contains(&page.id) => {}
                _ => {
                    return Err(SimError::InternalInvariantViolation(format!(
                        "orphan logical page {:?} with no active pointer",
                        page.id
                    )))
                }
            }
        }
        if self.metrics.thrashing_time > self.metrics.total_time {
            return Err(SimError::InternalInvariantViolation(
                "thrashing_time exceeds total_time".to_string(),
            ));
        }
        let expected_total =
            self.config.hit_time * self.metrics.page_hits + self.config.fault_time * self.metrics.page_faults;
        if self.metrics.total_time != expected_total {
            return Err(SimError::InternalInvariantViolation(format!(
                "total_time {} does not match {} hits * {} + {} faults * {}",
                self.metrics.total_time,
                self.metrics.page_hits,
                self.config.hit_time,
                self.metrics.page_faults,
                self.config.fault_time
            )));
        }
        Ok(())
    }
}

// =============================================================================
// vmsim-core — Logical Pages, Physical Frames, and the MMU
// =============================================================================
//
// spec.md §3 defines three entities that must stay mutually consistent on
// every instruction:
//
//   PageFrame    — one per physical frame (0..TOTAL_RAM_FRAMES). Either
//                  empty, or occupied by exactly one logical page.
//   LogicalPage  — one per 4 KB slice of an allocation. Either resident
//                  (has a frame) or swapped (has a symbolic disk address) —
//                  never both.
//   The MMU      — the set of every currently live logical page, keyed by
//                  its stable id.
//
// We use `BTreeMap` rather than `HashMap` throughout this crate: the spec's
// determinism requirement (spec.md §5, §8 property 5) means iteration order
// over the MMU or the active-pointers table must not depend on a hasher's
// random seed, and `BTreeMap`'s order is a pure function of its keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A process identifier. The textual workload format treats pid as an
/// opaque token (spec.md §4.A), so we carry it as an owned string rather
/// than inventing a numeric encoding the format doesn't have.
pub type Pid = String;

/// Global identifier of a single `new` allocation (spec.md GLOSSARY).
pub type PtrId = u32;

/// Index of a physical RAM frame, `0..TOTAL_RAM_FRAMES`.
pub type FrameId = usize;

/// Stable identity of one logical page: the ptr_id it belongs to, plus its
/// index within that allocation (spec.md §3, LogicalPage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalPageId {
    pub ptr_id: PtrId,
    pub page_index: u32,
}

impl LogicalPageId {
    pub fn new(ptr_id: PtrId, page_index: u32) -> Self {
        LogicalPageId { ptr_id, page_index }
    }

    /// A symbolic "disk" address for this page, used only to populate
    /// `Residency::Swapped`. There is no real disk in this simulator
    /// (spec.md §1) — this just needs to be stable and unique per page.
    pub fn symbolic_disk_address(&self) -> u64 {
        ((self.ptr_id as u64) << 32) | self.page_index as u64
    }
}

/// Whether a logical page currently has a frame, or is parked on symbolic
/// disk. Mutually exclusive by construction (spec.md §3 Ownership note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Residency {
    Resident { frame_id: FrameId },
    Swapped { disk_address: u64 },
}

impl Residency {
    pub fn is_resident(&self) -> bool {
        matches!(self, Residency::Resident { .. })
    }

    pub fn frame_id(&self) -> Option<FrameId> {
        match self {
            Residency::Resident { frame_id } => Some(*frame_id),
            Residency::Swapped { .. } => None,
        }
    }
}

/// One 4 KB slice of an allocation (spec.md §3, LogicalPage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalPage {
    pub id: LogicalPageId,
    pub pid: Pid,
    pub residency: Residency,
    /// Timestamp (engine `total_time`) at which this page was loaded into
    /// its *current* frame. Reset every time the page transitions into RAM.
    pub load_timestamp: u64,
    /// Timestamp of the most recent access (load or `use`).
    pub last_access_timestamp: u64,
    /// Reference bit, maintained only meaningfully under Second Chance, but
    /// tracked unconditionally so switching policies never needs a resize.
    pub reference_bit: bool,
    /// 4096 for every page except possibly the last page of a ptr_id, which
    /// carries the remainder and is the sole source of internal
    /// fragmentation (spec.md §3 invariant 5).
    pub content_size_bytes: u32,
}

impl LogicalPage {
    pub fn internal_fragmentation_bytes(&self, page_size_bytes: u32) -> u32 {
        page_size_bytes.saturating_sub(self.content_size_bytes)
    }
}

/// One physical RAM frame (spec.md §3, PageFrame). Frames begin unoccupied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFrame {
    pub occupant: Option<FrameOccupant>,
}

/// Per-frame bookkeeping mirrored from the logical page it holds. Both
/// halves of this mapping (`PageFrame::occupant` here, `Residency::Resident`
/// on the `LogicalPage`) must always be updated together — that is the
/// bidirectional invariant from spec.md §3 invariant 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOccupant {
    pub page_id: LogicalPageId,
    pub pid: Pid,
    pub loaded_timestamp: u64,
    pub last_access_timestamp: u64,
    pub reference_bit: bool,
}

impl PageFrame {
    pub fn empty() -> Self {
        PageFrame { occupant: None }
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

/// The set of every currently live logical page (spec.md §3, the MMU),
/// keyed by its stable id for deterministic iteration.
pub type Mmu = BTreeMap<LogicalPageId, LogicalPage>;

/// One entry of the "active pointers" table: which process owns a ptr_id,
/// and the ordered list of logical pages it allocated (spec.md §3,
/// `AlgorithmSimulationState`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePointer {
    pub pid: Pid,
    pub pages: Vec<LogicalPageId>,
}

/// `ptr_id → (pid, ordered logical-page ids)`, authoritative for which
/// pages belong to a live allocation, in allocation order.
pub type ActivePointers = BTreeMap<PtrId, ActivePointer>;

// =============================================================================
// vmsim-core — Replacement Policy Interface & the Six Policies
// =============================================================================
//
// spec.md §4.C: a policy is a pure function `decide(context) -> decision`.
// We represent the six policies as a closed enum and dispatch through a
// single match (per spec.md §9's Design Note) rather than a name→function
// map, so OPT's future-stream parameter stays type-checked instead of
// erased behind `dyn Fn`.
//
// Every policy here is only ever invoked when RAM is full (§4.C: "reaching
// the policy implies RAM is full") — `Engine` only calls `decide` from its
// fault path once it has confirmed no frame is free. A policy that finds no
// occupied frame anyway is an engine bug, not a workload problem, so it
// fails loudly with `SimError::InternalInvariantViolation`.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::instruction::ProcessInstruction;
use crate::memory::{FrameId, LogicalPageId, Mmu, PageFrame};
use crate::rng::Rng;

/// `AlgorithmName ∈ {FIFO, SC, MRU, LRU, RND, OPT}` (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmName {
    Fifo,
    Sc,
    Mru,
    Lru,
    Rnd,
    Opt,
}

impl AlgorithmName {
    /// Stable label used to derive this policy's own RNG stream
    /// (spec.md §4.B: `seed || algorithm_name`).
    pub fn label(&self) -> &'static str {
        match self {
            AlgorithmName::Fifo => "FIFO",
            AlgorithmName::Sc => "SC",
            AlgorithmName::Mru => "MRU",
            AlgorithmName::Lru => "LRU",
            AlgorithmName::Rnd => "RND",
            AlgorithmName::Opt => "OPT",
        }
    }
}

/// The full future suffix of the instruction stream, handed only to OPT
/// (spec.md §4.C). `start_index` is the index of the instruction currently
/// being applied — OPT looks for the earliest future use at or after it.
#[derive(Debug, Clone, Copy)]
pub struct FutureView<'a> {
    pub instructions: &'a [ProcessInstruction],
    pub start_index: usize,
}

/// Everything a policy needs to pick a victim (spec.md §4.C `context`).
pub struct ReplacementContext<'a> {
    pub frames: &'a [PageFrame],
    pub mmu: &'a Mmu,
    /// The logical page about to be loaded; carried for policies that may
    /// want it, though none of the six specified here consult it.
    pub loading_page: LogicalPageId,
    /// `Some` only for OPT.
    pub future: Option<FutureView<'a>>,
    /// Current Second Chance hand position; meaningful only for SC.
    pub sc_hand: usize,
    /// RNG handle; drawn from only by RND.
    pub rng: &'a mut Rng,
}

/// What committing a policy's choice requires (spec.md §4.C `decision`).
#[derive(Debug, Clone)]
pub struct Decision {
    pub victim_frame_id: FrameId,
    pub victim_logical_page_id: Option<LogicalPageId>,
    /// `Some` only for SC: the hand position to carry into the next fault.
    pub next_hand_position: Option<usize>,
    /// Logical pages whose reference bit must be cleared as part of
    /// committing this decision (SC only; empty for every other policy).
    pub clear_reference_bits: Vec<LogicalPageId>,
}

/// One occupied frame, resolved for the policies below (they all reason
/// over "the occupied frames", never the free ones).
struct Occupied {
    frame_id: FrameId,
    page_id: LogicalPageId,
    loaded_timestamp: u64,
    last_access_timestamp: u64,
    #[allow(dead_code)]
    reference_bit: bool,
}

fn occupied_frames(frames: &[PageFrame]) -> Vec<Occupied> {
    frames
        .iter()
        .enumerate()
        .filter_map(|(frame_id, frame)| {
            frame.occupant.as_ref().map(|occ| Occupied {
                frame_id,
                page_id: occ.page_id,
                loaded_timestamp: occ.loaded_timestamp,
                last_access_timestamp: occ.last_access_timestamp,
                reference_bit: occ.reference_bit,
            })
        })
        .collect()
}

fn no_occupied_frame_error() -> SimError {
    SimError::InternalInvariantViolation(
        "replacement policy invoked with no occupied frame".to_string(),
    )
}

/// Dispatch to the chosen policy (spec.md §9 Design Note: a single `match`,
/// not a name→function table).
pub fn decide(algorithm: AlgorithmName, ctx: &mut ReplacementContext<'_>) -> Result<Decision, SimError> {
    match algorithm {
        AlgorithmName::Fifo => fifo(&*ctx),
        AlgorithmName::Sc => second_chance(&*ctx),
        AlgorithmName::Mru => mru(&*ctx),
        AlgorithmName::Lru => lru(&*ctx),
        AlgorithmName::Rnd => rnd(ctx),
        AlgorithmName::Opt => opt(&*ctx),
    }
}

fn fifo(ctx: &ReplacementContext<'_>) -> Result<Decision, SimError> {
    let occupied = occupied_frames(ctx.frames);
    let victim = occupied
        .iter()
        .min_by_key(|o| (o.loaded_timestamp, o.frame_id))
        .ok_or_else(no_occupied_frame_error)?;
    Ok(Decision {
        victim_frame_id: victim.frame_id,
        victim_logical_page_id: Some(victim.page_id),
        next_hand_position: None,
        clear_reference_bits: Vec::new(),
    })
}

fn second_chance(ctx: &ReplacementContext<'_>) -> Result<Decision, SimError> {
    let total = ctx.frames.len();
    if total == 0 {
        return Err(no_occupied_frame_error());
    }
    let occupied = occupied_frames(ctx.frames);
    if occupied.is_empty() {
        return Err(no_occupied_frame_error());
    }
    let start = ctx.sc_hand % total;

    // Like every other policy here, SC only ever reasons over occupied
    // frames. A `use`-triggered fault can find the hand resting on a frame a
    // `delete`/`kill` freed since the last fault, so walk physical frame
    // slots starting at the hand and skip free ones entirely — they are not
    // part of the clock and must not stall or break the sweep.
    let mut sweep: Vec<&Occupied> = Vec::with_capacity(occupied.len());
    for i in 0..total {
        let pos = (start + i) % total;
        if let Some(occ) = occupied.iter().find(|o| o.frame_id == pos) {
            sweep.push(occ);
        }
    }

    let mut cleared = Vec::new();
    let mut victim_index = None;
    for (i, occ) in sweep.iter().enumerate() {
        if occ.reference_bit {
            cleared.push(occ.page_id);
        } else {
            victim_index = Some(i);
            break;
        }
    }

    let victim = sweep[victim_index.unwrap_or(0)];
    // Pure FIFO fallback: every occupied frame had R=1 on this sweep, so the
    // victim is the first occupied frame reached from the hand, and it must
    // not also be queued for clearing — only "all others" are.
    cleared.retain(|id| *id != victim.page_id);

    Ok(Decision {
        victim_frame_id: victim.frame_id,
        victim_logical_page_id: Some(victim.page_id),
        next_hand_position: Some((victim.frame_id + 1) % total),
        clear_reference_bits: cleared,
    })
}

fn mru(ctx: &ReplacementContext<'_>) -> Result<Decision, SimError> {
    let occupied = occupied_frames(ctx.frames);
    let victim = occupied
        .iter()
        .max_by_key(|o| (o.last_access_timestamp, core::cmp::Reverse(o.frame_id)))
        .ok_or_else(no_occupied_frame_error)?;
    Ok(Decision {
        victim_frame_id: victim.frame_id,
        victim_logical_page_id: Some(victim.page_id),
        next_hand_position: None,
        clear_reference_bits: Vec::new(),
    })
}

fn lru(ctx: &ReplacementContext<'_>) -> Result<Decision, SimError> {
    let occupied = occupied_frames(ctx.frames);
    let victim = occupied
        .iter()
        .min_by_key(|o| (o.last_access_timestamp, o.frame_id))
        .ok_or_else(no_occupied_frame_error)?;
    Ok(Decision {
        victim_frame_id: victim.frame_id,
        victim_logical_page_id: Some(victim.page_id),
        next_hand_position: None,
        clear_reference_bits: Vec::new(),
    })
}

fn rnd(ctx: &mut ReplacementContext<'_>) -> Result<Decision, SimError> {
    let occupied = occupied_frames(ctx.frames);
    if occupied.is_empty() {
        return Err(no_occupied_frame_error());
    }
    let idx = ctx.rng.gen_index(occupied.len());
    let victim = &occupied[idx];
    Ok(Decision {
        victim_frame_id: victim.frame_id,
        victim_logical_page_id: Some(victim.page_id),
        next_hand_position: None,
        clear_reference_bits: Vec::new(),
    })
}

fn opt(ctx: &ReplacementContext<'_>) -> Result<Decision, SimError> {
    let occupied = occupied_frames(ctx.frames);
    if occupied.is_empty() {
        return Err(no_occupied_frame_error());
    }
    let future = ctx.future.ok_or_else(|| {
        SimError::InternalInvariantViolation("OPT invoked without a future view".to_string())
    })?;

    let victim = occupied
        .iter()
        .max_by_key(|o| {
            let distance = next_use_distance(future, o.page_id.ptr_id);
            (distance, core::cmp::Reverse(o.frame_id))
        })
        .ok_or_else(no_occupied_frame_error)?;

    Ok(Decision {
        victim_frame_id: victim.frame_id,
        victim_logical_page_id: Some(victim.page_id),
        next_hand_position: None,
        clear_reference_bits: Vec::new(),
    })
}

/// Smallest index `i >= future.start_index` at which `use(ptr_id)` occurs,
/// or `usize::MAX` (treated as infinity) if there is none. `delete`/`kill`
/// are not "uses"; neither is `new` (spec.md §4.C).
fn next_use_distance(future: FutureView<'_>, ptr_id: crate::memory::PtrId) -> usize {
    future.instructions[future.start_index..]
        .iter()
        .position(|instr| matches!(instr, ProcessInstruction::Use { ptr_id: p } if *p == ptr_id))
        .map(|offset| future.start_index + offset)
        .unwrap_or(usize::MAX)
}

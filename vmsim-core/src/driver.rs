// =============================================================================
// vmsim-core — Dual-Policy Driver
// =============================================================================
//
// spec.md §4.E: a session always runs two engines over the identical
// instruction stream in lock-step — one pinned to OPT as the textbook lower
// bound, one running whichever policy the caller chose — so every metric can
// be read side by side on the same workload. `Driver` owns both engines and
// the shared instruction list; it never lets the two states diverge in which
// instruction they've consumed.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::engine::AlgorithmSimulationState;
use crate::error::SimError;
use crate::instruction::ProcessInstruction;
use crate::memory::{FrameId, LogicalPageId, Pid};
use crate::metrics::AlgorithmMetrics;
use crate::policy::{AlgorithmName, FutureView};

/// Outcome of a single `Driver::step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// `true` once the instruction just applied was the last one in the
    /// stream — the caller has nothing left to step through.
    pub reached_end: bool,
}

/// A read-only snapshot of one engine, suitable for a caller (a UI, a test,
/// a report) that wants the current picture without reaching into the
/// engine's own owned containers. Cloned out of `AlgorithmSimulationState`
/// rather than borrowed, so it stays valid across further `step` calls
/// (spec.md §9 Design Note).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateView {
    pub algorithm: AlgorithmName,
    pub metrics: AlgorithmMetrics,
    pub frames: Vec<Option<FrameSummary>>,
    pub resident_pages: Vec<LogicalPageId>,
    pub swapped_pages: Vec<LogicalPageId>,
}

/// One occupied frame, flattened for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    pub frame_id: FrameId,
    pub page_id: LogicalPageId,
    pub pid: Pid,
    pub reference_bit: bool,
}

impl StateView {
    fn from_state(state: &AlgorithmSimulationState) -> Self {
        let frames = state
            .frames
            .iter()
            .enumerate()
            .map(|(frame_id, frame)| {
                frame.occupant.as_ref().map(|occ| FrameSummary {
                    frame_id,
                    page_id: occ.page_id,
                    pid: occ.pid.clone(),
                    reference_bit: occ.reference_bit,
                })
            })
            .collect();

        let mut resident_pages = Vec::new();
        let mut swapped_pages = Vec::new();
        for page in state.mmu.values() {
            if page.residency.is_resident() {
                resident_pages.push(page.id);
            } else {
                swapped_pages.push(page.id);
            }
        }

        StateView {
            algorithm: state.algorithm,
            metrics: state.metrics,
            frames,
            resident_pages,
            swapped_pages,
        }
    }
}

/// A paired snapshot: OPT alongside the chosen policy, taken at the same
/// instruction boundary (spec.md §4.E, §6 "session state").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSnapshot {
    pub opt: StateView,
    pub chosen: StateView,
    /// Index of the next instruction `step` will apply (0 once nothing has
    /// run yet, `instructions.len()` once the session is exhausted).
    pub cursor: usize,
}

/// Drives two `AlgorithmSimulationState`s — one OPT, one the chosen policy —
/// over the same instruction stream, one instruction at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    instructions: Vec<ProcessInstruction>,
    cursor: usize,
    opt: AlgorithmSimulationState,
    chosen: AlgorithmSimulationState,
}

impl Driver {
    /// Start a new session: both engines begin empty, pinned to the same
    /// `config` and `seed`, over `instructions` (spec.md §4.E). `chosen`
    /// should not be `AlgorithmName::Opt` in practice: per §4.E, only OPT's
    /// context ever carries the future instruction stream, so a `chosen`
    /// engine pinned to OPT would abort on its first fault with no future
    /// view to consult. Callers wanting OPT compared against itself should
    /// use a single `AlgorithmSimulationState` directly instead of a
    /// `Driver`.
    pub fn new_session(
        config: SimConfig,
        seed: &str,
        chosen: AlgorithmName,
        instructions: Vec<ProcessInstruction>,
    ) -> Self {
        Driver {
            instructions,
            cursor: 0,
            opt: AlgorithmSimulationState::new(config, AlgorithmName::Opt, seed),
            chosen: AlgorithmSimulationState::new(config, chosen, seed),
        }
    }

    /// Which policy is being compared against OPT in this session.
    pub fn chosen_algorithm(&self) -> AlgorithmName {
        self.chosen.algorithm
    }

    pub fn instructions(&self) -> &[ProcessInstruction] {
        &self.instructions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.instructions.len()
    }

    /// Apply the next instruction to both engines. A no-op that returns
    /// `reached_end: true` if the session has already consumed every
    /// instruction — this is not an error (spec.md §7: exhaustion is an
    /// ordinary terminal state, not a fault).
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        if self.cursor >= self.instructions.len() {
            return Ok(StepOutcome { reached_end: true });
        }

        let instr = &self.instructions[self.cursor];
        let future = FutureView {
            instructions: &self.instructions,
            start_index: self.cursor,
        };

        // §4.E: only OPT's context carries the future instruction stream;
        // every other policy decides from present state alone.
        self.opt.apply(instr, Some(future))?;
        self.chosen.apply(instr, None)?;

        self.cursor += 1;
        Ok(StepOutcome {
            reached_end: self.cursor >= self.instructions.len(),
        })
    }

    /// Run every remaining instruction to completion.
    pub fn run_to_completion(&mut self) -> Result<(), SimError> {
        loop {
            if self.step()?.reached_end {
                return Ok(());
            }
        }
    }

    /// Rewind both engines back to the start of the same instruction
    /// stream and seed, producing two fresh `AlgorithmSimulationState`s
    /// (spec.md §6). The instruction list itself is kept, not regenerated.
    pub fn reset(&mut self, config: SimConfig, seed: &str) {
        self.cursor = 0;
        self.opt = AlgorithmSimulationState::new(config, AlgorithmName::Opt, seed);
        self.chosen = AlgorithmSimulationState::new(config, self.chosen.algorithm, seed);
    }

    /// A paired, owned snapshot of both engines at the current cursor.
    pub fn snapshot(&self) -> ComparisonSnapshot {
        ComparisonSnapshot {
            opt: StateView::from_state(&self.opt),
            chosen: StateView::from_state(&self.chosen),
            cursor: self.cursor,
        }
    }
}

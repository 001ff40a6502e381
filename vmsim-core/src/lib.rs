//! Deterministic virtual-memory page-replacement simulation core.
//!
//! Given a textual instruction stream (`new`/`use`/`delete`/`kill`, either
//! parsed or synthetically generated), this crate runs two engines over it
//! in lock-step: one pinned to the clairvoyant Optimal policy, one running
//! whichever of FIFO / Second Chance / MRU / LRU / Random the caller chose.
//! Everything is seeded and ordered so that the same inputs always produce
//! byte-identical output — there is no wall-clock, no threads, and no
//! hashing whose order isn't a pure function of its keys.
//!
//! The public surface is small on purpose:
//!
//!   - [`config::SimConfig`] / [`config::WorkloadConfig`] — tunable constants,
//!     in case a caller wants something other than the textbook defaults.
//!   - [`instruction::parse_workload`] / [`format::serialize_workload`] /
//!     [`workload::generate_workload`] — get an instruction stream in or out.
//!   - [`policy::AlgorithmName`] — which policy to compare against OPT.
//!   - [`driver::Driver`] — run the comparison, one instruction at a time or
//!     to completion, and read back a [`driver::ComparisonSnapshot`].
//!
//! Everything else (an interactive visualizer, a setup form, playback
//! timing) is an external collaborator and lives outside this crate.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod format;
pub mod instruction;
pub mod memory;
pub mod metrics;
pub mod policy;
pub mod rng;
pub mod workload;

pub use config::{SimConfig, WorkloadConfig};
pub use driver::{ComparisonSnapshot, Driver, FrameSummary, StateView, StepOutcome};
pub use engine::AlgorithmSimulationState;
pub use error::{ParseWarning, SimError};
pub use format::serialize_workload;
pub use instruction::{parse_workload, ParseOutcome, ProcessInstruction};
pub use memory::{
    ActivePointer, ActivePointers, FrameId, FrameOccupant, LogicalPage, LogicalPageId, Mmu,
    PageFrame, Pid, PtrId, Residency,
};
pub use metrics::AlgorithmMetrics;
pub use policy::{decide, AlgorithmName, Decision, FutureView, ReplacementContext};
pub use rng::Rng;
pub use workload::generate_workload;

// =============================================================================
// vmsim-core — Concrete End-to-End Scenarios
// =============================================================================
//
// Six fixed instruction streams against RAM = 3 frames, page size = 4096 B,
// HIT_TIME = 1, FAULT_TIME = 5. Each one pins down one policy's behavior
// exactly, the way a textbook worked example would, rather than asserting a
// property over random input (see `invariants.rs` for those).

use vmsim_core::{AlgorithmName, Driver, LogicalPageId, ProcessInstruction, SimConfig};

fn three_frame_config() -> SimConfig {
    SimConfig {
        page_size_bytes: 4096,
        total_ram_frames: 3,
        hit_time: 1,
        fault_time: 5,
    }
}

fn new_(pid: &str, size_bytes: u32, ptr_id: u32) -> ProcessInstruction {
    ProcessInstruction::New {
        pid: pid.to_string(),
        size_bytes,
        ptr_id,
    }
}

fn use_(ptr_id: u32) -> ProcessInstruction {
    ProcessInstruction::Use { ptr_id }
}

fn page(ptr_id: u32) -> LogicalPageId {
    LogicalPageId::new(ptr_id, 0)
}

/// S1 — FIFO basic: four single-page allocations into three frames.
#[test]
fn s1_fifo_basic() {
    let instructions = vec![
        new_("A", 4096, 1),
        new_("A", 4096, 2),
        new_("A", 4096, 3),
        new_("A", 4096, 4),
    ];
    let mut driver = Driver::new_session(three_frame_config(), "s1", AlgorithmName::Fifo, instructions);
    driver.run_to_completion().unwrap();
    let snapshot = driver.snapshot();

    assert_eq!(snapshot.chosen.metrics.page_hits, 3);
    assert_eq!(snapshot.chosen.metrics.page_faults, 1);
    assert_eq!(snapshot.chosen.metrics.total_time, 8);

    let mut resident: Vec<u32> = snapshot.chosen.resident_pages.iter().map(|p| p.ptr_id).collect();
    resident.sort_unstable();
    assert_eq!(resident, vec![2, 3, 4]);
}

/// S2 — LRU and MRU disagree once a `use` reorders recency.
#[test]
fn s2_lru_vs_mru_on_use() {
    let stream = vec![new_("A", 4096, 1), new_("A", 4096, 2), new_("A", 4096, 3), use_(1), new_("A", 4096, 4)];

    let mut lru = Driver::new_session(three_frame_config(), "s2", AlgorithmName::Lru, stream.clone());
    lru.run_to_completion().unwrap();
    let lru_resident: Vec<u32> = lru.snapshot().chosen.resident_pages.iter().map(|p| p.ptr_id).collect();
    assert!(!lru_resident.contains(&2), "LRU should evict ptr 2, the oldest access: {:?}", lru_resident);

    let mut mru = Driver::new_session(three_frame_config(), "s2", AlgorithmName::Mru, stream);
    mru.run_to_completion().unwrap();
    let mru_resident: Vec<u32> = mru.snapshot().chosen.resident_pages.iter().map(|p| p.ptr_id).collect();
    assert!(!mru_resident.contains(&1), "MRU should evict ptr 1, just freshly used: {:?}", mru_resident);
}

/// S3 — Second Chance: two `use`s set R=1 on pages 1 and 2; the next fault's
/// sweep from hand=0 clears both and lands on page 3.
#[test]
fn s3_second_chance_sweeps_past_referenced_pages() {
    let instructions = vec![
        new_("A", 4096, 1),
        new_("A", 4096, 2),
        new_("A", 4096, 3),
        use_(1),
        use_(2),
        new_("A", 4096, 4),
    ];
    let mut driver = Driver::new_session(three_frame_config(), "s3", AlgorithmName::Sc, instructions);
    driver.run_to_completion().unwrap();
    let snapshot = driver.snapshot();

    let mut resident: Vec<u32> = snapshot.chosen.resident_pages.iter().map(|p| p.ptr_id).collect();
    resident.sort_unstable();
    assert_eq!(resident, vec![1, 2, 4], "page 3 should be the one evicted");
}

/// S4 — OPT lookahead: pages 1 and 2 are used again after the fault, page 3
/// never is, so OPT evicts 3 even though it loaded most recently.
#[test]
fn s4_opt_evicts_the_page_with_no_future_use() {
    let instructions = vec![
        new_("A", 4096, 1),
        new_("A", 4096, 2),
        new_("A", 4096, 3),
        use_(1),
        use_(2),
        new_("A", 4096, 4),
        use_(1),
        use_(2),
    ];
    // `Driver` always runs OPT as the fixed reference policy; pick any other
    // policy as `chosen` here since what's under test is `snapshot.opt`, not
    // `snapshot.chosen` (only OPT's context ever carries the future view).
    let mut driver = Driver::new_session(three_frame_config(), "s4", AlgorithmName::Fifo, instructions);
    driver.run_to_completion().unwrap();
    let snapshot = driver.snapshot();

    let mut resident: Vec<u32> = snapshot.opt.resident_pages.iter().map(|p| p.ptr_id).collect();
    resident.sort_unstable();
    assert_eq!(resident, vec![1, 2, 4], "OPT should keep 1 and 2, which are used again, and evict 3");
}

/// S5 — `delete` frees a frame that a subsequent `new` reuses without a fault.
#[test]
fn s5_delete_frees_a_frame_for_reuse() {
    let instructions = vec![
        new_("A", 4096, 1),
        new_("A", 4096, 2),
        new_("A", 4096, 3),
        ProcessInstruction::Delete { ptr_id: 2 },
        new_("A", 4096, 4),
    ];
    let mut driver = Driver::new_session(three_frame_config(), "s5", AlgorithmName::Fifo, instructions);
    driver.run_to_completion().unwrap();
    let snapshot = driver.snapshot();

    assert_eq!(snapshot.chosen.metrics.page_faults, 0);
    let mut resident: Vec<u32> = snapshot.chosen.resident_pages.iter().map(|p| p.ptr_id).collect();
    resident.sort_unstable();
    assert_eq!(resident, vec![1, 3, 4]);
}

/// S6 — killing one process tears down exactly its own pages (resident or
/// swapped) and leaves the other process untouched.
#[test]
fn s6_kill_cascade_only_touches_the_killed_pid() {
    let instructions = vec![
        new_("A", 4096, 1),
        new_("A", 4096, 2),
        new_("A", 4096, 3),
        new_("B", 4096, 4),
        new_("B", 4096, 5),
        new_("B", 4096, 6),
        ProcessInstruction::Kill { pid: "A".to_string() },
    ];
    let mut driver = Driver::new_session(three_frame_config(), "s6", AlgorithmName::Fifo, instructions);
    driver.run_to_completion().unwrap();
    let snapshot = driver.snapshot();

    assert_eq!(snapshot.chosen.metrics.running_processes, 1);
    for ptr_id in 1..=3u32 {
        assert!(!snapshot.chosen.resident_pages.contains(&page(ptr_id)));
        assert!(!snapshot.chosen.swapped_pages.contains(&page(ptr_id)));
    }
    let b_pages_alive = (4..=6u32)
        .filter(|&p| {
            snapshot.chosen.resident_pages.contains(&page(p)) || snapshot.chosen.swapped_pages.contains(&page(p))
        })
        .count();
    assert_eq!(b_pages_alive, 3, "B's pages must survive A's kill untouched");
}

/// A swapped page and a free frame can coexist after a `delete` frees a
/// frame that FIFO had already evicted someone else into. The fault on
/// `use(1)` must claim the free frame directly rather than invoking the
/// policy and evicting a still-resident page (spec.md §4.D: "free frame if
/// available; else run the policy").
#[test]
fn use_fault_prefers_a_free_frame_over_evicting() {
    let instructions = vec![
        new_("A", 4096, 1),
        new_("A", 4096, 2),
        new_("A", 4096, 3),
        new_("A", 4096, 4), // RAM full; FIFO evicts ptr 1 (oldest load) to make room.
        ProcessInstruction::Delete { ptr_id: 3 }, // frees ptr 3's frame; ptr 1 stays swapped.
        use_(1),            // ptr 1 is non-resident and a frame is free: no eviction should occur.
    ];
    let mut driver = Driver::new_session(three_frame_config(), "free-frame-on-use", AlgorithmName::Fifo, instructions);
    driver.run_to_completion().unwrap();
    let snapshot = driver.snapshot();

    let mut resident: Vec<u32> = snapshot.chosen.resident_pages.iter().map(|p| p.ptr_id).collect();
    resident.sort_unstable();
    assert_eq!(
        resident,
        vec![1, 2, 4],
        "ptr 2 must still be resident — the free frame from ptr 3's delete should have taken ptr 1, not an eviction"
    );
    assert!(snapshot.chosen.swapped_pages.is_empty());

    // 3 hits (the first three `new`s) + 2 faults (ptr 4's eviction, ptr 1's reload).
    assert_eq!(snapshot.chosen.metrics.page_hits, 3);
    assert_eq!(snapshot.chosen.metrics.page_faults, 2);
    assert_eq!(snapshot.chosen.metrics.total_time, 3 * 1 + 2 * 5);
}

// =============================================================================
// vmsim-core — Property Tests Over Generated Workloads
// =============================================================================
//
// spec.md §8's numbered invariants, checked over several (seed, algorithm)
// combinations rather than one fixed trace — `scenarios.rs` covers the exact
// worked examples; this file covers the properties that must hold for *any*
// valid workload.

use vmsim_core::{
    generate_workload, parse_workload, serialize_workload, AlgorithmName, Driver, ProcessInstruction, SimConfig,
    WorkloadConfig,
};

const ALGORITHMS: [AlgorithmName; 5] = [
    AlgorithmName::Fifo,
    AlgorithmName::Sc,
    AlgorithmName::Mru,
    AlgorithmName::Lru,
    AlgorithmName::Rnd,
];

const SEEDS: [&str; 3] = ["alpha", "bravo-seed", "3"];

fn workload_for(seed: &str) -> Vec<ProcessInstruction> {
    let config = WorkloadConfig {
        process_count: 5,
        op_count: 250,
        seed: seed.to_string(),
        ..WorkloadConfig::default()
    };
    generate_workload(&config).0
}

fn small_ram_config() -> SimConfig {
    SimConfig {
        total_ram_frames: 10,
        ..SimConfig::default()
    }
}

/// 1 & 2 & 6: at every step boundary, the frame/page mapping is consistent
/// (this is exactly what `AlgorithmSimulationState::apply` refuses to let
/// pass — any run that finishes without an error already proves it held at
/// every instruction) and `ram_used_kb + 4*free_frames == total_ram_kb`, and
/// OPT never faults more than the compared policy on any prefix.
#[test]
fn per_step_properties_hold_across_seeds_and_algorithms() {
    let config = small_ram_config();
    for seed in SEEDS {
        let instructions = workload_for(seed);
        for algorithm in ALGORITHMS {
            let mut driver = Driver::new_session(config, seed, algorithm, instructions.clone());
            loop {
                let outcome = driver.step().expect("invariant violation mid-run");
                let snapshot = driver.snapshot();

                let free_frames = snapshot.chosen.frames.iter().filter(|f| f.is_none()).count() as u32;
                let page_size_kb = config.page_size_bytes / 1024;
                assert_eq!(
                    snapshot.chosen.metrics.ram_used_kb + free_frames * page_size_kb,
                    (config.total_ram_frames as u32) * page_size_kb
                );

                assert!(
                    snapshot.opt.metrics.page_faults <= snapshot.chosen.metrics.page_faults,
                    "OPT faulted more than {:?} on seed {} at step {}",
                    algorithm,
                    seed,
                    snapshot.cursor
                );

                if outcome.reached_end {
                    break;
                }
            }
        }
    }
}

/// 3 & 4: total_time and thrashing_time match their closed-form definitions.
#[test]
fn time_accounting_matches_closed_form() {
    let config = small_ram_config();
    let instructions = workload_for("timing");
    let mut driver = Driver::new_session(config, "timing", AlgorithmName::Lru, instructions);
    driver.run_to_completion().unwrap();
    let metrics = driver.snapshot().chosen.metrics;

    assert_eq!(
        metrics.total_time,
        config.hit_time * metrics.page_hits + config.fault_time * metrics.page_faults
    );
    assert_eq!(metrics.thrashing_time, config.fault_time * metrics.page_faults);
}

/// 5: two sessions over identical (seed, algorithm, instructions) stay
/// bit-for-bit identical at every step, not just at the end.
#[test]
fn identical_inputs_produce_identical_trajectories() {
    let config = small_ram_config();
    let instructions = workload_for("twin");
    let mut a = Driver::new_session(config, "twin", AlgorithmName::Sc, instructions.clone());
    let mut b = Driver::new_session(config, "twin", AlgorithmName::Sc, instructions);

    loop {
        let outcome_a = a.step().unwrap();
        let outcome_b = b.step().unwrap();
        assert_eq!(outcome_a, outcome_b);

        let snap_a = a.snapshot();
        let snap_b = b.snapshot();
        assert_eq!(snap_a.chosen.metrics, snap_b.chosen.metrics);
        assert_eq!(snap_a.opt.metrics, snap_b.opt.metrics);
        assert_eq!(
            snap_a.chosen.resident_pages, snap_b.chosen.resident_pages,
            "resident sets diverged between two identical sessions"
        );

        if outcome_a.reached_end {
            break;
        }
    }
}

/// 7: parsing what the generator's own serializer wrote back out reproduces
/// the same operations in the same order (ptr_ids are reassigned, not
/// preserved verbatim, since the format never spells them out for `new`).
#[test]
fn round_trips_generate_serialize_parse() {
    for seed in SEEDS {
        let original = workload_for(seed);
        let text = serialize_workload(&original);
        let outcome = parse_workload(&text, 1);
        assert!(outcome.warnings.is_empty(), "unexpected parse warnings for seed {}", seed);
        assert_eq!(outcome.instructions.len(), original.len());

        for (original_instr, reparsed_instr) in original.iter().zip(outcome.instructions.iter()) {
            match (original_instr, reparsed_instr) {
                (
                    ProcessInstruction::New { pid: p1, size_bytes: s1, .. },
                    ProcessInstruction::New { pid: p2, size_bytes: s2, .. },
                ) => {
                    assert_eq!(p1, p2);
                    assert_eq!(s1, s2);
                }
                (ProcessInstruction::Use { .. }, ProcessInstruction::Use { .. }) => {}
                (ProcessInstruction::Delete { .. }, ProcessInstruction::Delete { .. }) => {}
                (ProcessInstruction::Kill { pid: p1 }, ProcessInstruction::Kill { pid: p2 }) => {
                    assert_eq!(p1, p2);
                }
                (a, b) => panic!("operation shape changed across round trip: {:?} vs {:?}", a, b),
            }
        }
    }
}

/// 8: deleting an already-deleted ptr_id is a harmless no-op, not a second
/// teardown and not an error.
#[test]
fn deleting_twice_is_idempotent() {
    let instructions = vec![
        ProcessInstruction::New {
            pid: "A".to_string(),
            size_bytes: 4096,
            ptr_id: 1,
        },
        ProcessInstruction::Delete { ptr_id: 1 },
        ProcessInstruction::Delete { ptr_id: 1 },
    ];
    let mut driver = Driver::new_session(small_ram_config(), "dup-delete", AlgorithmName::Fifo, instructions);
    driver.run_to_completion().unwrap();
    let metrics = driver.snapshot().chosen.metrics;
    assert_eq!(metrics.running_processes, 0);
    assert_eq!(metrics.ram_used_kb, 0);
}

/// 9: `kill(pid)` leaves nothing of that pid behind — no resident or
/// swapped page, no active pointer.
#[test]
fn kill_removes_every_trace_of_its_pid() {
    let instructions = vec![
        ProcessInstruction::New {
            pid: "A".to_string(),
            size_bytes: 4096 * 3,
            ptr_id: 1,
        },
        ProcessInstruction::New {
            pid: "A".to_string(),
            size_bytes: 4096,
            ptr_id: 2,
        },
        ProcessInstruction::Kill {
            pid: "A".to_string(),
        },
    ];
    let mut driver = Driver::new_session(small_ram_config(), "kill-all", AlgorithmName::Fifo, instructions);
    driver.run_to_completion().unwrap();
    let snapshot = driver.snapshot();
    assert_eq!(snapshot.chosen.metrics.running_processes, 0);
    assert!(snapshot.chosen.resident_pages.is_empty());
    assert!(snapshot.chosen.swapped_pages.is_empty());
}

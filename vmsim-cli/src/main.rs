// =============================================================================
// vmsim-cli — Headless Demo / Debug Front-End
// =============================================================================
//
// Usage:
//   vmsim-cli --algorithm lru --seed demo --processes 8 --ops 500 --frames 100
//   vmsim-cli --algorithm fifo --workload path/to/instructions.txt
//
// Either generates a synthetic workload from `--seed`/`--processes`/`--ops`,
// or parses one from a file given with `--workload`. Either way it runs the
// chosen policy against OPT to completion and prints the final metrics
// comparison to stdout. Parser/generator warnings and engine diagnostics go
// through the `log` facade, so `RUST_LOG=vmsim_core=debug` surfaces them.

use std::env;
use std::fs;
use std::process::ExitCode;

use vmsim_core::{generate_workload, parse_workload, AlgorithmName, Driver, SimConfig, WorkloadConfig};

struct Args {
    algorithm: AlgorithmName,
    seed: String,
    processes: u32,
    ops: u32,
    frames: usize,
    workload_path: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(env::args().skip(1).collect()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("vmsim-cli: {}", message);
            return ExitCode::FAILURE;
        }
    };

    let instructions = match &args.workload_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => {
                let outcome = parse_workload(&text, 1);
                for warning in &outcome.warnings {
                    log::warn!("{}", warning);
                }
                outcome.instructions
            }
            Err(err) => {
                eprintln!("vmsim-cli: could not read {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let workload_config = WorkloadConfig {
                process_count: args.processes,
                op_count: args.ops,
                seed: args.seed.clone(),
                ..WorkloadConfig::default()
            };
            let (instructions, _) = generate_workload(&workload_config);
            instructions
        }
    };

    let sim_config = SimConfig {
        total_ram_frames: args.frames,
        ..SimConfig::default()
    };

    let mut driver = Driver::new_session(sim_config, &args.seed, args.algorithm, instructions);
    if let Err(err) = driver.run_to_completion() {
        eprintln!("vmsim-cli: simulation aborted: {}", err);
        return ExitCode::FAILURE;
    }

    print_report(&driver);
    ExitCode::SUCCESS
}

fn print_report(driver: &Driver) {
    let snapshot = driver.snapshot();
    println!("instructions applied : {}", driver.cursor());
    println!();
    println!("{:>24} | {:>12} | {:>12}", "metric", "OPT", snapshot.chosen.algorithm.label());
    println!("{:->24}-+-{:->12}-+-{:->12}", "", "", "");
    println!(
        "{:>24} | {:>12} | {:>12}",
        "page faults", snapshot.opt.metrics.page_faults, snapshot.chosen.metrics.page_faults
    );
    println!(
        "{:>24} | {:>12} | {:>12}",
        "page hits", snapshot.opt.metrics.page_hits, snapshot.chosen.metrics.page_hits
    );
    println!(
        "{:>24} | {:>12} | {:>12}",
        "total time (s)", snapshot.opt.metrics.total_time, snapshot.chosen.metrics.total_time
    );
    println!(
        "{:>24} | {:>12} | {:>12}",
        "thrashing time (s)", snapshot.opt.metrics.thrashing_time, snapshot.chosen.metrics.thrashing_time
    );
    println!(
        "{:>24} | {:>11.1}% | {:>11.1}%",
        "RAM used", snapshot.opt.metrics.ram_used_pct, snapshot.chosen.metrics.ram_used_pct
    );
    println!(
        "{:>24} | {:>12} | {:>12}",
        "running processes", snapshot.opt.metrics.running_processes, snapshot.chosen.metrics.running_processes
    );
}

fn parse_args(raw: Vec<String>) -> Result<Args, String> {
    let mut algorithm = AlgorithmName::Fifo;
    let mut seed = "vmsim".to_string();
    let mut processes: u32 = 8;
    let mut ops: u32 = 500;
    let mut frames: usize = 100;
    let mut workload_path = None;

    let mut iter = raw.into_iter();
    while let Some(flag) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| format!("{} expects a value", flag));
        match flag.as_str() {
            "--algorithm" => algorithm = parse_algorithm(&value()?)?,
            "--seed" => seed = value()?,
            "--processes" => processes = value()?.parse().map_err(|_| "--processes expects an integer".to_string())?,
            "--ops" => ops = value()?.parse().map_err(|_| "--ops expects an integer".to_string())?,
            "--frames" => frames = value()?.parse().map_err(|_| "--frames expects an integer".to_string())?,
            "--workload" => workload_path = Some(value()?),
            other => return Err(format!("unrecognised flag {:?}", other)),
        }
    }

    Ok(Args {
        algorithm,
        seed,
        processes,
        ops,
        frames,
        workload_path,
    })
}

fn parse_algorithm(s: &str) -> Result<AlgorithmName, String> {
    match s.to_ascii_lowercase().as_str() {
        "fifo" => Ok(AlgorithmName::Fifo),
        "sc" | "second_chance" | "second-chance" => Ok(AlgorithmName::Sc),
        "mru" => Ok(AlgorithmName::Mru),
        "lru" => Ok(AlgorithmName::Lru),
        "rnd" | "random" => Ok(AlgorithmName::Rnd),
        "opt" => Ok(AlgorithmName::Opt),
        other => Err(format!("unknown algorithm {:?} (expected fifo/sc/mru/lru/rnd/opt)", other)),
    }
}

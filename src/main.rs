//! Distributed bucket sort demo.
//!
//! Spawns one thread per participant and runs the scatter/gather sorting
//! protocol: the coordinator (rank 0) generates a bounded-range dataset,
//! partitions it into per-worker buckets, scatters them, every rank sorts its
//! bucket locally, and a gather reassembles the fully sorted sequence.
//!
//! Usage:
//!   scatter-sort [SIZE] [WORKERS] [SEED]
//!
//! With no SIZE argument the dataset size is read from an interactive prompt.
//! Non-integer input is not an error: the run falls back to the default of
//! 100 integers. Set RUST_LOG=debug for per-rank protocol diagnostics.

use std::io::{self, BufRead, Write};
use std::process;
use std::thread;

use scatter_sort::comm::{self, CommError};
use scatter_sort::config::{self, RunConfig, DEFAULT_DATASET_SIZE, DEFAULT_WORKERS};
use scatter_sort::pipeline;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let dataset_size = match args.get(1) {
        Some(raw) => match config::parse_dataset_size(raw) {
            Some(size) => size,
            None => {
                println!(
                    "'{}' is not a valid integer. Using the default of {} integers.",
                    raw, DEFAULT_DATASET_SIZE
                );
                DEFAULT_DATASET_SIZE
            }
        },
        None => prompt_dataset_size(),
    };

    let workers = args
        .get(2)
        .and_then(|raw| raw.parse().ok())
        .filter(|&w| w >= 1)
        .unwrap_or(DEFAULT_WORKERS);

    let seed = args.get(3).and_then(|raw| raw.parse().ok());

    let config = RunConfig {
        dataset_size,
        seed,
        ..RunConfig::default()
    };

    println!(
        "Sorting {} integers in [0, {}) across {} workers\n",
        config.dataset_size, config.range_max, workers
    );

    let handles: Vec<_> = comm::connect(workers)
        .into_iter()
        .map(|mut endpoint| {
            let config = config.clone();
            thread::Builder::new()
                .name(format!("rank-{}", endpoint.rank()))
                .spawn(move || -> Result<(), CommError> {
                    let outcome = pipeline::run_participant(&mut endpoint, &config)?;
                    if let Some(dataset) = &outcome.dataset {
                        println!("Process 0 initialized array: {:?}", dataset);
                    }
                    println!(
                        "Process {} received array {:?}",
                        endpoint.rank(),
                        outcome.received
                    );
                    if let Some(merged) = &outcome.merged {
                        println!("Process 0 gathered sorted array: {:?}", merged);
                    }
                    Ok(())
                })
                .expect("failed to spawn worker thread")
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                eprintln!("fatal: {err}");
                process::exit(1);
            }
            Err(_) => {
                eprintln!("fatal: a worker thread panicked");
                process::exit(1);
            }
        }
    }
}

/// Ask the user for the dataset size, falling back to the default on
/// non-integer input (including EOF on a non-interactive stdin).
fn prompt_dataset_size() -> usize {
    print!("How many integers: ");
    io::stdout().flush().ok();

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        println!(
            "Could not read input. Using the default of {} integers.",
            DEFAULT_DATASET_SIZE
        );
        return DEFAULT_DATASET_SIZE;
    }

    match config::parse_dataset_size(&line) {
        Some(size) => size,
        None => {
            println!(
                "You typed a non-integer value. Using the default of {} integers.",
                DEFAULT_DATASET_SIZE
            );
            DEFAULT_DATASET_SIZE
        }
    }
}

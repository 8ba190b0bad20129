/*!
 * OS Behavior Simulator - Main Entry Point
 *
 * Loads a JSON configuration record and a JSON workload (the validated
 * inputs the core expects), runs the simulation, and reports summary
 * statistics.
 */

use anyhow::{bail, Context, Result};
use os_sim_kernel::{init_tracing, OpCode, SimConfig, Simulation, Workload};
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        show_usage(&args[0]);
        bail!("expected a config file and a workload file");
    }

    let config = load_config(Path::new(&args[1]))?;
    let codes = load_workload(Path::new(&args[2]))?;

    info!(
        policy = config.policy.as_str(),
        mem_available = config.mem_available,
        "simulator starting"
    );

    let workload = Workload::compile(codes, &config)?;
    let mut simulation = Simulation::new(config, workload)?;
    let report = simulation.run()?;

    info!(
        processes = report.stats.processes,
        selections = report.stats.selections,
        seg_faults = report.stats.seg_faults,
        elapsed_ms = report.elapsed_ms,
        "simulator finished"
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: SimConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn load_workload(path: &Path) -> Result<Vec<OpCode>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading workload file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing workload file {}", path.display()))
}

fn show_usage(program: &str) {
    eprintln!("Usage: {program} <config.json> <workload.json>");
    eprintln!("  config.json   - simulation configuration record");
    eprintln!("  workload.json - scripted operation sequence");
    eprintln!("See demos/ for examples.");
}

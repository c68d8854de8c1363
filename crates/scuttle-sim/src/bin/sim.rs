#![forbid(unsafe_code)]

use anyhow::{Result, bail};
use scuttle_sim::{SimulationConfig, Simulator};

fn main() -> Result<()> {
    let report = Simulator::new(SimulationConfig::default())?.run();

    println!(
        "simulation complete: schedules={} passed={} failed={} truncated={}",
        report.schedules_checked(),
        report.schedules_passed,
        report.schedules_failed,
        report.exhaustive_truncated
    );

    if !report.all_passed() {
        bail!("{} schedule(s) violated an invariant", report.schedules_failed);
    }
    Ok(())
}

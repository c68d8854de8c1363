use anyhow::Result;
use scuttle_sim::{SimulationConfig, to_dot};

/// Execute `scuttle dot`.
pub fn run_dot(config: &SimulationConfig) -> Result<()> {
    let timeline = super::ingest(config)?;
    print!("{}", to_dot(&timeline));
    Ok(())
}

//! `scuttle converge` — run the convergence simulator.

use anyhow::{Result, bail};
use scuttle_sim::{SimulationConfig, SimulationReport, Simulator};

use crate::output::{OutputMode, pretty_kv, pretty_section, print_json};

/// Failing schedules shown in human output.
const SHOWN_FAILURES: usize = 5;

fn render_human(report: &SimulationReport) -> Result<()> {
    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    pretty_section(&mut w, "Convergence")?;
    pretty_kv(&mut w, "Events", report.events.to_string())?;
    pretty_kv(&mut w, "Reference", report.reference_order.join(" "))?;
    pretty_kv(&mut w, "Seed", report.seed.to_string())?;
    pretty_kv(&mut w, "Coalesce", report.coalesce.to_string())?;
    pretty_kv(
        &mut w,
        "Schedules",
        format!(
            "{} exhaustive{} + {} random",
            report.exhaustive_schedules,
            if report.exhaustive_truncated {
                " (truncated)"
            } else {
                ""
            },
            report.random_schedules
        ),
    )?;
    pretty_kv(
        &mut w,
        "Results",
        format!(
            "{} passed / {} failed",
            report.schedules_passed, report.schedules_failed
        ),
    )?;

    for failure in report.failures.iter().take(SHOWN_FAILURES) {
        pretty_kv(
            &mut w,
            "Failure",
            format!(
                "{:?} #{}: {}",
                failure.source,
                failure.index,
                failure.schedule.join(" ")
            ),
        )?;
        for violation in &failure.violations {
            pretty_kv(&mut w, "", violation)?;
        }
    }
    Ok(())
}

/// Execute `scuttle converge`.
pub fn run_converge(config: SimulationConfig, output: OutputMode) -> Result<()> {
    let report = Simulator::new(config)?.run();

    match output {
        OutputMode::Json => print_json(&report)?,
        OutputMode::Human => render_human(&report)?,
    }

    if !report.all_passed() {
        bail!(
            "{} of {} schedules violated an invariant",
            report.schedules_failed,
            report.schedules_checked()
        );
    }
    Ok(())
}

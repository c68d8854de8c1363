//! `scuttle order` — ingest the configured graph and print the result.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use clap::Args;
use scuttle_core::{Change, Timeline};
use scuttle_sim::SimulationConfig;
use serde::Serialize;

use crate::output::{OutputMode, pretty_section, print_json};

/// Arguments for `scuttle order`.
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Show the change records delivered by each add.
    #[arg(long)]
    pub changes: bool,
}

/// One row of the final order.
#[derive(Debug, Serialize)]
struct EntryOutput {
    position: usize,
    name: String,
    rank: usize,
    successors: Vec<String>,
    predecessors: Vec<String>,
}

/// Records delivered while adding one event.
#[derive(Debug, Serialize)]
struct StepOutput {
    event: String,
    after: Vec<String>,
    changes: Vec<Change<String>>,
}

#[derive(Debug, Serialize)]
struct PendingOutput {
    awaited: String,
    waiters: Vec<String>,
}

/// JSON output for `scuttle order`.
#[derive(Debug, Serialize)]
struct OrderOutput {
    order: Vec<EntryOutput>,
    pending: Vec<PendingOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<StepOutput>>,
}

fn ingest_with_steps(config: &SimulationConfig) -> Result<(Timeline, Vec<StepOutput>)> {
    let delivered: Arc<Mutex<Vec<Change<String>>>> = Arc::default();
    let mut timeline = Timeline::with_options(config.timeline);
    timeline.set_notifier({
        let delivered = Arc::clone(&delivered);
        move |change| {
            delivered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(change.clone());
        }
    });

    let mut steps = Vec::with_capacity(config.events.len());
    for spec in &config.events {
        super::add_event(&mut timeline, &spec.name, &spec.after)?;
        steps.push(StepOutput {
            event: spec.name.clone(),
            after: spec.after.clone(),
            changes: delivered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .drain(..)
                .collect(),
        });
    }
    timeline.clear_notifier();
    Ok((timeline, steps))
}

fn collect(timeline: &Timeline, steps: Option<Vec<StepOutput>>) -> OrderOutput {
    let order = timeline
        .entries()
        .map(|event| EntryOutput {
            position: event.position(),
            name: event.name().clone(),
            rank: event.rank(),
            successors: event.successors().map(|s| s.name().clone()).collect(),
            predecessors: event.predecessors().map(|p| p.name().clone()).collect(),
        })
        .collect();
    let pending = timeline
        .pending()
        .map(|(awaited, waiters)| PendingOutput {
            awaited: awaited.clone(),
            waiters: waiters.into_iter().cloned().collect(),
        })
        .collect();
    OrderOutput {
        order,
        pending,
        steps,
    }
}

fn describe(change: &Change<String>) -> String {
    match change {
        Change::Insert { name, position } => format!("insert {name} at {position}"),
        Change::Move { from, to } => format!("move {from} -> {to}"),
    }
}

/// Execute `scuttle order`.
pub fn run_order(args: &OrderArgs, config: &SimulationConfig, output: OutputMode) -> Result<()> {
    let (timeline, steps) = if args.changes {
        let (timeline, steps) = ingest_with_steps(config)?;
        (timeline, Some(steps))
    } else {
        (super::ingest(config)?, None)
    };
    let out = collect(&timeline, steps);

    match output {
        OutputMode::Json => print_json(&out),
        OutputMode::Human => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();

            if let Some(steps) = &out.steps {
                pretty_section(&mut w, "Changes")?;
                for step in steps {
                    writeln!(w, "add {} after [{}]", step.event, step.after.join(", "))?;
                    for change in &step.changes {
                        writeln!(w, "    {}", describe(change))?;
                    }
                }
                writeln!(w)?;
            }

            pretty_section(&mut w, "Order")?;
            writeln!(w, "{:>4}  {:<12} {:>4}  successors", "pos", "name", "rank")?;
            for entry in &out.order {
                writeln!(
                    w,
                    "{:>4}  {:<12} {:>4}  {}",
                    entry.position,
                    entry.name,
                    entry.rank,
                    entry.successors.join(", ")
                )?;
            }

            if !out.pending.is_empty() {
                writeln!(w)?;
                pretty_section(&mut w, "Pending")?;
                for pending in &out.pending {
                    writeln!(w, "{} <- {}", pending.awaited, pending.waiters.join(", "))?;
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_replay_to_the_final_order() {
        let config = SimulationConfig::default();

        let (timeline, steps) = ingest_with_steps(&config).unwrap();

        let mut mirror = Vec::new();
        for change in steps.iter().flat_map(|step| &step.changes) {
            change.apply(&mut mirror);
        }
        assert_eq!(mirror, timeline.iter().cloned().collect::<Vec<_>>());
        assert_eq!(steps.len(), 8);
        assert_eq!(steps[5].event, "B");
        assert_eq!(steps[5].changes.len(), 4);
    }

    #[test]
    fn collected_rows_expose_edges() {
        let config = SimulationConfig::default();
        let timeline = super::super::ingest(&config).unwrap();

        let out = collect(&timeline, None);

        let x = &out.order[0];
        assert_eq!(x.name, "X");
        assert_eq!(x.successors, ["A", "Y"]);
        let d = out.order.iter().find(|entry| entry.name == "D").unwrap();
        assert_eq!(d.predecessors, ["B", "C"]);
        assert_eq!(d.rank, 3);
        assert!(out.pending.is_empty());
    }

    #[test]
    fn describes_changes_tersely() {
        assert_eq!(
            describe(&Change::Insert {
                name: "B".to_string(),
                position: 5
            }),
            "insert B at 5"
        );
        assert_eq!(describe(&Change::Move { from: 0, to: 4 }), "move 0 -> 4");
    }
}

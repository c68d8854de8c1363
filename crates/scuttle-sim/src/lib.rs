//! scuttle-sim library.
//!
//! Deterministic convergence harness for [`scuttle_core::Timeline`]: one
//! causal graph is delivered in many orders (chain interleavings or full
//! permutations, plus seeded shuffles) and every run is checked against an
//! independently computed reference order.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod dot;
pub mod graph;
pub mod oracle;
pub mod rng;
pub mod schedule;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use config::{SimulationConfig, load_config};
pub use dot::to_dot;
pub use graph::{CausalGraph, EventSpec, GraphError};
pub use oracle::{ConvergenceOracle, InvariantViolation, OracleResult};
pub use rng::DeterministicRng;

use schedule::{Schedule, interleaving_count, interleavings, permutation_count, permutations};

/// At most this many failing schedules are kept in a report.
pub const MAX_RECORDED_FAILURES: usize = 16;

/// Where a checked schedule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    Exhaustive,
    Random,
}

/// One schedule that violated an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFailure {
    pub source: ScheduleSource,
    /// Zero-based index within its source.
    pub index: usize,
    pub schedule: Schedule,
    pub violations: Vec<String>,
}

/// Aggregate report produced by [`Simulator::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub coalesce: bool,
    pub events: usize,
    pub reference_order: Vec<String>,
    /// Exhaustive schedules checked.
    pub exhaustive_schedules: usize,
    /// `true` if the exhaustive set was cut off at the configured limit.
    pub exhaustive_truncated: bool,
    pub random_schedules: usize,
    pub schedules_passed: usize,
    pub schedules_failed: usize,
    /// The first [`MAX_RECORDED_FAILURES`] failing schedules.
    pub failures: Vec<ScheduleFailure>,
}

impl SimulationReport {
    /// Total schedules checked.
    #[must_use]
    pub const fn schedules_checked(&self) -> usize {
        self.exhaustive_schedules + self.random_schedules
    }

    /// True if every schedule passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.schedules_failed == 0
    }
}

/// Runs every configured schedule through a [`ConvergenceOracle`].
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
    graph: CausalGraph,
}

impl Simulator {
    /// Validate `config` and prepare a simulator.
    ///
    /// # Errors
    ///
    /// Returns an error if the event graph or the chains are invalid.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let graph = config.graph()?;
        Ok(Self { config, graph })
    }

    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub const fn graph(&self) -> &CausalGraph {
        &self.graph
    }

    /// The exhaustive schedule set and whether it was truncated.
    #[must_use]
    pub fn exhaustive_schedules(&self) -> (Vec<Schedule>, bool) {
        let limit = self.config.exhaustive_limit;
        let (schedules, total) = if self.config.chains.is_empty() {
            let names: Vec<String> = self.graph.names().into_iter().map(str::to_string).collect();
            (permutations(&names, limit), permutation_count(names.len()))
        } else {
            let lengths: Vec<usize> = self.config.chains.iter().map(Vec::len).collect();
            (
                interleavings(&self.config.chains, limit),
                interleaving_count(&lengths),
            )
        };
        let truncated = total.is_none_or(|total| total > schedules.len() as u128);
        (schedules, truncated)
    }

    /// The seeded random schedule set.
    #[must_use]
    pub fn random_schedules(&self) -> Vec<Schedule> {
        let names: Vec<String> = self.graph.names().into_iter().map(str::to_string).collect();
        let mut rng = DeterministicRng::new(self.config.seed);
        schedule::random_schedules(&mut rng, &names, self.config.random_schedules)
    }

    /// Check every schedule and aggregate the results.
    #[must_use]
    pub fn run(&self) -> SimulationReport {
        let (exhaustive, exhaustive_truncated) = self.exhaustive_schedules();
        let random = self.random_schedules();
        info!(
            seed = self.config.seed,
            events = self.graph.len(),
            exhaustive = exhaustive.len(),
            exhaustive_truncated,
            random = random.len(),
            "simulation started"
        );

        let mut report = SimulationReport {
            seed: self.config.seed,
            coalesce: self.config.timeline.coalesce,
            events: self.graph.len(),
            reference_order: self.graph.reference_order().to_vec(),
            exhaustive_schedules: exhaustive.len(),
            exhaustive_truncated,
            random_schedules: random.len(),
            schedules_passed: 0,
            schedules_failed: 0,
            failures: Vec::new(),
        };

        let tagged = exhaustive
            .into_iter()
            .enumerate()
            .map(|(index, schedule)| (ScheduleSource::Exhaustive, index, schedule))
            .chain(
                random
                    .into_iter()
                    .enumerate()
                    .map(|(index, schedule)| (ScheduleSource::Random, index, schedule)),
            );
        for (source, index, schedule) in tagged {
            let result =
                ConvergenceOracle::check_schedule(&self.graph, &schedule, self.config.timeline);
            if result.passed {
                report.schedules_passed += 1;
                continue;
            }

            report.schedules_failed += 1;
            let violations: Vec<String> = result.violations.iter().map(ToString::to_string).collect();
            if report.failures.len() < MAX_RECORDED_FAILURES {
                warn!(?source, index, ?schedule, ?violations, "schedule failed");
                report.failures.push(ScheduleFailure {
                    source,
                    index,
                    schedule,
                    violations,
                });
            } else {
                debug!(?source, index, "schedule failed (not recorded)");
            }
        }

        info!(
            checked = report.schedules_checked(),
            passed = report.schedules_passed,
            failed = report.schedules_failed,
            "simulation complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_run_checks_every_interleaving() {
        let simulator = Simulator::new(SimulationConfig::default()).unwrap();

        let report = simulator.run();

        assert_eq!(report.exhaustive_schedules, 840);
        assert!(!report.exhaustive_truncated);
        assert_eq!(report.random_schedules, 64);
        assert_eq!(report.schedules_checked(), 904);
        assert!(report.all_passed(), "{:?}", report.failures);
        assert_eq!(report.reference_order, ["X", "A", "Y", "B", "C", "D", "F", "E"]);
    }

    #[test]
    fn exhaustive_limit_marks_truncation() {
        let config = SimulationConfig {
            exhaustive_limit: 100,
            random_schedules: 0,
            chains: Vec::new(),
            ..SimulationConfig::default()
        };
        let simulator = Simulator::new(config).unwrap();

        let (schedules, truncated) = simulator.exhaustive_schedules();

        assert_eq!(schedules.len(), 100);
        assert!(truncated);
    }

    #[test]
    fn random_schedules_follow_the_seed() {
        let config = SimulationConfig {
            seed: 5,
            random_schedules: 3,
            ..SimulationConfig::default()
        };
        let a = Simulator::new(config.clone()).unwrap().random_schedules();
        let b = Simulator::new(config).unwrap().random_schedules();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig {
            events: vec![EventSpec::new("a", &["b"])],
            chains: Vec::new(),
            ..SimulationConfig::default()
        };
        assert!(Simulator::new(config).is_err());
    }

    #[test]
    fn report_serializes_to_json() {
        let config = SimulationConfig {
            events: vec![EventSpec::new("a", &[]), EventSpec::new("b", &["a"])],
            chains: Vec::new(),
            random_schedules: 2,
            ..SimulationConfig::default()
        };
        let report = Simulator::new(config).unwrap().run();

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["exhaustive_schedules"], 2);
        assert_eq!(json["schedules_passed"], 4);
        assert_eq!(json["failures"], serde_json::json!([]));
    }
}

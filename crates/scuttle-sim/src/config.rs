//! Simulation configuration, loaded from TOML.
//!
//! ```toml
//! seed = 7
//! random_schedules = 32
//!
//! [timeline]
//! coalesce = false
//!
//! [[events]]
//! name = "root"
//!
//! [[events]]
//! name = "leaf"
//! after = ["root"]
//! ```
//!
//! Omitted keys fall back to [`SimulationConfig::default`], which describes
//! the eight-event demo graph.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use scuttle_core::TimelineOptions;
use serde::{Deserialize, Serialize};

use crate::graph::{CausalGraph, EventSpec};

/// Everything a [`Simulator`](crate::Simulator) run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for the random schedules.
    #[serde(default)]
    pub seed: u64,
    /// Number of seeded shuffles checked in addition to the exhaustive set.
    #[serde(default = "default_random_schedules")]
    pub random_schedules: usize,
    /// Cap on the number of exhaustively enumerated schedules.
    #[serde(default = "default_exhaustive_limit")]
    pub exhaustive_limit: usize,
    #[serde(default)]
    pub timeline: TimelineOptions,
    #[serde(default = "demo_events")]
    pub events: Vec<EventSpec>,
    /// Delivery chains to interleave. When empty, every permutation of the
    /// events is enumerated instead.
    #[serde(default)]
    pub chains: Vec<Vec<String>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            random_schedules: default_random_schedules(),
            exhaustive_limit: default_exhaustive_limit(),
            timeline: TimelineOptions::default(),
            events: demo_events(),
            chains: demo_chains(),
        }
    }
}

const fn default_random_schedules() -> usize {
    64
}

const fn default_exhaustive_limit() -> usize {
    50_000
}

fn demo_events() -> Vec<EventSpec> {
    CausalGraph::demo().events().to_vec()
}

/// The four delivery chains of the demo graph, 840 interleavings in total.
fn demo_chains() -> Vec<Vec<String>> {
    [&["F", "E"][..], &["X", "A", "B", "D"], &["C"], &["Y"]]
        .iter()
        .map(|chain| chain.iter().map(|name| (*name).to_string()).collect())
        .collect()
}

impl SimulationConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse simulation config")
    }

    /// Build the validated causal graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the event definitions are invalid or the chains
    /// do not deliver every event exactly once.
    pub fn graph(&self) -> Result<CausalGraph> {
        let graph = CausalGraph::new(self.events.clone()).context("Invalid event graph")?;
        self.validate_chains(&graph)?;
        Ok(graph)
    }

    fn validate_chains(&self, graph: &CausalGraph) -> Result<()> {
        if self.chains.is_empty() {
            return Ok(());
        }
        let defined: BTreeSet<&str> = graph.names().into_iter().collect();
        let mut delivered = BTreeSet::new();
        for name in self.chains.iter().flatten() {
            if !defined.contains(name.as_str()) {
                bail!("chain delivers undefined event {name}");
            }
            if !delivered.insert(name.as_str()) {
                bail!("chains deliver event {name} more than once");
            }
        }
        if let Some(missing) = defined.difference(&delivered).next() {
            bail!("chains never deliver event {missing}");
        }
        Ok(())
    }
}

/// Load a simulation config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<SimulationConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    SimulationConfig::from_toml(&content).with_context(|| format!("In {}", path.display()))
}

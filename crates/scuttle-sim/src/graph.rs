//! Causal graph definitions and their canonical linearization.
//!
//! The reference order is computed here from scratch (topological sort plus
//! longest-path ranks) so it can serve as an oracle for the incremental
//! [`Timeline`](scuttle_core::Timeline).

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

/// One event definition: a name and the names it causally follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpec {
    pub name: String,
    #[serde(default)]
    pub after: Vec<String>,
}

impl EventSpec {
    #[must_use]
    pub fn new(name: &str, after: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            after: after.iter().map(|cause| (*cause).to_string()).collect(),
        }
    }
}

/// Errors from validating a graph definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("event defined twice: {0}")]
    DuplicateEvent(String),

    #[error("event {event} follows undefined event {missing}")]
    UndefinedPredecessor { event: String, missing: String },

    #[error("causal cycle through event {0}")]
    Cycle(String),
}

/// A validated, acyclic, closed set of event definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausalGraph {
    events: Vec<EventSpec>,
    order: Vec<String>,
    ranks: BTreeMap<String, usize>,
}

impl CausalGraph {
    /// Validate `events` and compute the reference order.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if a name is defined twice, a predecessor is
    /// never defined, or the definitions form a cycle.
    pub fn new(events: Vec<EventSpec>) -> Result<Self, GraphError> {
        let (order, ranks) = linearize(&events)?;
        Ok(Self {
            events,
            order,
            ranks,
        })
    }

    /// The eight-event feed used throughout the documentation:
    ///
    /// ```text
    ///                .-- F <-- E
    ///               /         /
    ///  X <-- A <-- B <-- D <-'
    ///  ^     ^          /
    ///   \     `--- C <-'
    ///    \
    ///     `- Y
    /// ```
    #[must_use]
    pub fn demo() -> Self {
        let events = vec![
            EventSpec::new("X", &[]),
            EventSpec::new("A", &["X"]),
            EventSpec::new("D", &["B", "C"]),
            EventSpec::new("E", &["D", "F"]),
            EventSpec::new("F", &["B"]),
            EventSpec::new("B", &["A"]),
            EventSpec::new("Y", &["X"]),
            EventSpec::new("C", &["A"]),
        ];
        Self::new(events).unwrap_or_else(|_| unreachable!("demo graph is valid"))
    }

    /// Definitions in the order they were given.
    #[must_use]
    pub fn events(&self) -> &[EventSpec] {
        &self.events
    }

    /// Event names in definition order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.events.iter().map(|spec| spec.name.as_str()).collect()
    }

    /// Declared predecessors of `name`.
    #[must_use]
    pub fn after(&self, name: &str) -> Option<&[String]> {
        self.events
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.after.as_slice())
    }

    /// Canonical order: ascending longest-path rank, then ascending name.
    #[must_use]
    pub fn reference_order(&self) -> &[String] {
        &self.order
    }

    /// Longest-path rank of every event.
    #[must_use]
    pub const fn reference_ranks(&self) -> &BTreeMap<String, usize> {
        &self.ranks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

type Linearization = (Vec<String>, BTreeMap<String, usize>);

fn linearize(events: &[EventSpec]) -> Result<Linearization, GraphError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(events.len(), events.len());
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(events.len());

    for spec in events {
        let ix = graph.add_node(spec.name.as_str());
        if index.insert(spec.name.as_str(), ix).is_some() {
            return Err(GraphError::DuplicateEvent(spec.name.clone()));
        }
    }
    for spec in events {
        for cause in &spec.after {
            let Some(&from) = index.get(cause.as_str()) else {
                return Err(GraphError::UndefinedPredecessor {
                    event: spec.name.clone(),
                    missing: cause.clone(),
                });
            };
            graph.add_edge(from, index[spec.name.as_str()], ());
        }
    }

    let sorted = toposort(&graph, None)
        .map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].to_string()))?;

    let mut rank_of: HashMap<NodeIndex, usize> = HashMap::with_capacity(sorted.len());
    for ix in &sorted {
        let rank = graph
            .neighbors_directed(*ix, Direction::Incoming)
            .map(|cause| rank_of[&cause] + 1)
            .max()
            .unwrap_or(0);
        rank_of.insert(*ix, rank);
    }

    let ranks: BTreeMap<String, usize> = rank_of
        .iter()
        .map(|(ix, rank)| (graph[*ix].to_string(), *rank))
        .collect();
    let mut order: Vec<String> = ranks.keys().cloned().collect();
    order.sort_by(|a, b| ranks[a].cmp(&ranks[b]).then_with(|| a.cmp(b)));
    Ok((order, ranks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_reference_order() {
        let graph = CausalGraph::demo();

        assert_eq!(
            graph.reference_order(),
            ["X", "A", "Y", "B", "C", "D", "F", "E"]
        );
        let ranks: Vec<usize> = graph
            .reference_order()
            .iter()
            .map(|name| graph.reference_ranks()[name])
            .collect();
        assert_eq!(ranks, [0, 1, 1, 2, 2, 3, 3, 4]);
    }

    #[test]
    fn duplicate_definition_is_rejected() {
        let err = CausalGraph::new(vec![EventSpec::new("A", &[]), EventSpec::new("A", &[])])
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateEvent("A".into()));
    }

    #[test]
    fn undefined_predecessor_is_rejected() {
        let err = CausalGraph::new(vec![EventSpec::new("A", &["ghost"])]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UndefinedPredecessor {
                event: "A".into(),
                missing: "ghost".into()
            }
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let err = CausalGraph::new(vec![EventSpec::new("A", &["B"]), EventSpec::new("B", &["A"])])
            .unwrap_err();
        assert!(matches!(err, GraphError::Cycle(_)));
    }

    #[test]
    fn rank_is_longest_path_not_shortest() {
        let graph = CausalGraph::new(vec![
            EventSpec::new("r", &[]),
            EventSpec::new("a", &["r"]),
            EventSpec::new("b", &["a"]),
            EventSpec::new("z", &["r", "b"]),
        ])
        .unwrap();
        assert_eq!(graph.reference_ranks()["z"], 3);
        assert_eq!(graph.after("z").unwrap(), ["r", "b"]);
        assert!(graph.after("nope").is_none());
    }
}

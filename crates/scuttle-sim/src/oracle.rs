use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use scuttle_core::{Timeline, TimelineOptions};
use serde::{Deserialize, Serialize};

use crate::graph::CausalGraph;

// ── Core result types ─────────────────────────────────────────────────────────

/// Oracle result for one delivery schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    #[must_use]
    const fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }
}

// ── Invariant violation diagnostics ──────────────────────────────────────────

/// Diagnostic information for a single failed invariant check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    /// The schedule is not a permutation of the graph's events.
    Schedule {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// `Timeline::add` rejected an event.
    Rejected {
        step: usize,
        event: String,
        error: String,
    },

    /// A resolved predecessor sits at or after its successor.
    EdgeOrder {
        step: usize,
        event: String,
        cause: String,
        event_position: usize,
        cause_position: usize,
    },

    /// A successor's rank does not exceed its predecessor's.
    RankMonotonicity {
        step: usize,
        event: String,
        cause: String,
        event_rank: usize,
        cause_rank: usize,
    },

    /// The final order differs from the independently computed one.
    ReferenceOrder {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// A final rank differs from the longest-path rank.
    ReferenceRank {
        event: String,
        expected: usize,
        actual: usize,
    },

    /// Applying the delivered change records to an empty list did not
    /// reproduce the final order.
    Replay {
        expected: Vec<String>,
        replayed: Vec<String>,
    },

    /// Predecessors were still awaited after full delivery.
    Pending { awaited: Vec<String> },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule {
                missing,
                unexpected,
            } => write!(
                f,
                "Schedule: not a permutation (missing={missing:?}, unexpected={unexpected:?})"
            ),
            Self::Rejected { step, event, error } => {
                write!(f, "Rejected: step {step} add {event} failed: {error}")
            }
            Self::EdgeOrder {
                step,
                event,
                cause,
                event_position,
                cause_position,
            } => write!(
                f,
                "EdgeOrder: after step {step}, {cause}@{cause_position} does not precede \
                 {event}@{event_position}"
            ),
            Self::RankMonotonicity {
                step,
                event,
                cause,
                event_rank,
                cause_rank,
            } => write!(
                f,
                "RankMonotonicity: after step {step}, rank({event})={event_rank} \
                 <= rank({cause})={cause_rank}"
            ),
            Self::ReferenceOrder { expected, actual } => {
                write!(f, "ReferenceOrder: expected {expected:?}, got {actual:?}")
            }
            Self::ReferenceRank {
                event,
                expected,
                actual,
            } => write!(f, "ReferenceRank: {event} expected {expected}, got {actual}"),
            Self::Replay { expected, replayed } => {
                write!(f, "Replay: expected {expected:?}, replayed {replayed:?}")
            }
            Self::Pending { awaited } => write!(f, "Pending: still awaiting {awaited:?}"),
        }
    }
}

// ── Oracle ────────────────────────────────────────────────────────────────────

/// Oracle for verifying timeline invariants over one delivery schedule.
///
/// # Invariants checked
///
/// 1. **Edge order**: after every `add`, each resolved predecessor sits
///    before its successor.
/// 2. **Rank monotonicity**: after every `add`, each successor outranks its
///    resolved predecessors.
/// 3. **Reference order**: the final order equals [`CausalGraph::reference_order`].
/// 4. **Reference ranks**: the final ranks equal the longest-path ranks.
/// 5. **Replay**: the delivered change records rebuild the final order.
/// 6. **Drained pending**: nothing is awaited once every event is delivered.
pub struct ConvergenceOracle;

impl ConvergenceOracle {
    /// Ingest `schedule` into a fresh timeline and check every invariant.
    ///
    /// Stops at the first rejected `add`; the remaining checks are
    /// meaningless on a timeline that reported a cycle.
    #[must_use]
    pub fn check_schedule(
        graph: &CausalGraph,
        schedule: &[String],
        options: TimelineOptions,
    ) -> OracleResult {
        if let Some(violation) = Self::check_permutation(graph, schedule) {
            return OracleResult::from_violations(vec![violation]);
        }

        let mirror: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut timeline: Timeline<String> = Timeline::with_options(options);
        timeline.set_notifier({
            let mirror = Arc::clone(&mirror);
            move |change| {
                change.apply(&mut mirror.lock().unwrap_or_else(PoisonError::into_inner));
            }
        });

        let mut violations = Vec::new();
        for (step, name) in schedule.iter().enumerate() {
            let after = graph.after(name).unwrap_or_default().to_vec();
            if let Err(err) = timeline.add(name.clone(), after) {
                violations.push(InvariantViolation::Rejected {
                    step,
                    event: name.clone(),
                    error: err.to_string(),
                });
                return OracleResult::from_violations(violations);
            }
            Self::check_edges(&timeline, step, &mut violations);
        }

        let actual: Vec<String> = timeline.iter().cloned().collect();
        if actual != graph.reference_order() {
            violations.push(InvariantViolation::ReferenceOrder {
                expected: graph.reference_order().to_vec(),
                actual: actual.clone(),
            });
        }
        for (event, &expected) in graph.reference_ranks() {
            let actual = timeline.rank(event).unwrap_or(usize::MAX);
            if actual != expected {
                violations.push(InvariantViolation::ReferenceRank {
                    event: event.clone(),
                    expected,
                    actual,
                });
            }
        }

        let replayed = mirror
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if replayed != actual {
            violations.push(InvariantViolation::Replay {
                expected: actual,
                replayed,
            });
        }

        let awaited: Vec<String> = timeline.pending().map(|(name, _)| name.clone()).collect();
        if !awaited.is_empty() {
            violations.push(InvariantViolation::Pending { awaited });
        }

        if violations.is_empty() {
            OracleResult::pass()
        } else {
            OracleResult::from_violations(violations)
        }
    }

    fn check_permutation(graph: &CausalGraph, schedule: &[String]) -> Option<InvariantViolation> {
        let defined: BTreeSet<&str> = graph.names().into_iter().collect();
        let delivered: BTreeSet<&str> = schedule.iter().map(String::as_str).collect();
        if schedule.len() == defined.len() && delivered == defined {
            return None;
        }
        let missing = defined.difference(&delivered).map(|name| (*name).to_string()).collect();
        let mut unexpected: Vec<String> = delivered
            .difference(&defined)
            .map(|name| (*name).to_string())
            .collect();
        if unexpected.is_empty() && schedule.len() != delivered.len() {
            // Same names, but something is delivered twice.
            let mut seen = BTreeSet::new();
            unexpected = schedule
                .iter()
                .filter(|name| !seen.insert(name.as_str()))
                .cloned()
                .collect();
        }
        Some(InvariantViolation::Schedule {
            missing,
            unexpected,
        })
    }

    fn check_edges(
        timeline: &Timeline<String>,
        step: usize,
        violations: &mut Vec<InvariantViolation>,
    ) {
        for event in timeline.entries() {
            for cause in event.predecessors() {
                if cause.position() >= event.position() {
                    violations.push(InvariantViolation::EdgeOrder {
                        step,
                        event: event.name().clone(),
                        cause: cause.name().clone(),
                        event_position: event.position(),
                        cause_position: cause.position(),
                    });
                }
                if cause.rank() >= event.rank() {
                    violations.push(InvariantViolation::RankMonotonicity {
                        step,
                        event: event.name().clone(),
                        cause: cause.name().clone(),
                        event_rank: event.rank(),
                        cause_rank: cause.rank(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EventSpec;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn demo_definition_order_passes() {
        let graph = CausalGraph::demo();
        let schedule: Vec<String> = graph.names().into_iter().map(str::to_string).collect();

        for coalesce in [true, false] {
            let result =
                ConvergenceOracle::check_schedule(&graph, &schedule, TimelineOptions { coalesce });
            assert!(result.passed, "{:?}", result.violations);
        }
    }

    #[test]
    fn reversed_delivery_passes() {
        let graph = CausalGraph::demo();
        let schedule = names(&["Y", "X", "C", "A", "B", "F", "D", "E"]);

        let result = ConvergenceOracle::check_schedule(&graph, &schedule, TimelineOptions::default());

        assert!(result.passed, "{:?}", result.violations);
    }

    #[test]
    fn incomplete_schedule_is_flagged() {
        let graph = CausalGraph::demo();
        let schedule = names(&["X", "A", "Q"]);

        let result = ConvergenceOracle::check_schedule(&graph, &schedule, TimelineOptions::default());

        assert!(!result.passed);
        let InvariantViolation::Schedule {
            missing,
            unexpected,
        } = &result.violations[0]
        else {
            panic!("expected schedule violation, got {:?}", result.violations);
        };
        assert_eq!(missing, &names(&["B", "C", "D", "E", "F", "Y"]));
        assert_eq!(unexpected, &names(&["Q"]));
    }

    #[test]
    fn duplicate_delivery_is_flagged() {
        let graph = CausalGraph::new(vec![EventSpec::new("a", &[]), EventSpec::new("b", &[])]).unwrap();
        let schedule = names(&["a", "a"]);

        let result = ConvergenceOracle::check_schedule(&graph, &schedule, TimelineOptions::default());

        assert_eq!(
            result.violations,
            vec![InvariantViolation::Schedule {
                missing: names(&["b"]),
                unexpected: names(&["a"]),
            }]
        );
    }

    #[test]
    fn violations_render_readably() {
        let violation = InvariantViolation::EdgeOrder {
            step: 3,
            event: "B".into(),
            cause: "A".into(),
            event_position: 0,
            cause_position: 2,
        };
        assert_eq!(
            violation.to_string(),
            "EdgeOrder: after step 3, A@2 does not precede B@0"
        );

        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["kind"], "edge_order");
    }
}

//! Causal edge integration.
//!
//! Attaching the edge "`event` happens after `cause`" can raise the rank of
//! `event` and of everything downstream of it. The affected wave walks the
//! successor graph from `event`, raising ranks level by level, and stops
//! descending wherever a node's rank already exceeds what the wave would
//! assign. Only the wave's nodes and the edge's endpoints can be out of
//! place afterwards, so only they are repositioned.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use tracing::{trace, warn};

use super::{EventName, NodeId, Timeline};
use crate::error::TimelineError;

impl<N: EventName> Timeline<N> {
    /// Enforce that `cause` precedes `event` in the linear order.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Cycle`] if `cause` is reachable from `event`
    /// through successor links. The timeline is left partially updated.
    pub(super) fn integrate(&mut self, event: NodeId, cause: NodeId) -> Result<(), TimelineError<N>> {
        let mut wave = self.affected_wave(event, cause)?;

        let cause_at = self.node(cause).position;
        if self.node(event).position < cause_at {
            self.jump(event, cause_at);
        } else {
            self.rise(event);
        }

        // Furthest first, so every rise lands in an already-settled suffix.
        wave.sort_unstable_by_key(|id| Reverse(self.node(*id).position));
        for id in wave {
            self.rise(id);
        }
        Ok(())
    }

    /// Propagate `rank(cause) + distance` through the successors of `start`
    /// and return every node the wave touched.
    fn affected_wave(&mut self, start: NodeId, cause: NodeId) -> Result<Vec<NodeId>, TimelineError<N>> {
        let seed = self.node(cause).rank;
        let mut visited = BTreeSet::new();
        // One frame per wave distance; frame `d` holds nodes still to visit at
        // distance `d + 1` from `cause`.
        let mut frames = vec![vec![start]];

        loop {
            let distance = frames.len();
            let Some(frame) = frames.last_mut() else {
                break;
            };
            let Some(current) = frame.pop() else {
                frames.pop();
                continue;
            };

            visited.insert(current);
            if current == cause {
                let (event, cause) = (self.node(start).name.clone(), self.node(cause).name.clone());
                warn!(?event, ?cause, "causal cycle detected");
                return Err(TimelineError::Cycle { event, cause });
            }

            let node = &mut self.nodes[current.0];
            if node.rank < seed + distance {
                node.rank = seed + distance;
                frames.push(node.successors.clone());
            }
        }

        trace!(
            event = ?self.node(start).name,
            cause = ?self.node(cause).name,
            affected = visited.len(),
            "affected wave settled"
        );
        Ok(visited.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::TimelineError;
    use crate::timeline::Timeline;

    #[test]
    fn wave_raises_downstream_ranks() {
        let mut timeline = Timeline::new();
        // b and c arrive first and wait on a.
        timeline.add("c", ["b"]).unwrap();
        timeline.add("b", ["a"]).unwrap();
        assert_eq!(timeline.rank(&"b").unwrap(), 0);
        assert_eq!(timeline.rank(&"c").unwrap(), 1);

        timeline.add("a", []).unwrap();

        assert_eq!(timeline.rank(&"a").unwrap(), 0);
        assert_eq!(timeline.rank(&"b").unwrap(), 1);
        assert_eq!(timeline.rank(&"c").unwrap(), 2);
        assert_eq!(timeline.iter().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn wave_stops_at_nodes_already_ahead() {
        let mut timeline = Timeline::new();
        timeline.add("r", []).unwrap();
        timeline.add("s", ["r"]).unwrap();
        timeline.add("t", ["s"]).unwrap();
        timeline.add("u", ["t", "x"]).unwrap();
        assert_eq!(timeline.rank(&"u").unwrap(), 3);

        // x sits at rank 1; u is already deeper and keeps its rank.
        timeline.add("x", ["r"]).unwrap();

        assert_eq!(timeline.rank(&"u").unwrap(), 3);
        assert_eq!(
            timeline.iter().copied().collect::<Vec<_>>(),
            ["r", "s", "x", "t", "u"]
        );
    }

    #[test]
    fn closing_edge_reports_cycle() {
        let mut timeline = Timeline::new();
        timeline.add("a", ["b"]).unwrap();

        let err = timeline.add("b", ["a"]).unwrap_err();

        assert_eq!(
            err,
            TimelineError::Cycle {
                event: "a",
                cause: "b"
            }
        );
    }

    #[test]
    fn longer_cycle_is_detected() {
        let mut timeline = Timeline::new();
        timeline.add("a", ["c"]).unwrap();
        timeline.add("b", ["a"]).unwrap();

        let err = timeline.add("c", ["b"]).unwrap_err();

        assert!(matches!(err, TimelineError::Cycle { .. }));
    }
}

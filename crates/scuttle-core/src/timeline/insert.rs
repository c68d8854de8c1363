//! Event ingestion.

use tracing::{debug, warn};

use super::node::{Cause, Node};
use super::{EventName, NodeId, Timeline};
use crate::error::TimelineError;

impl<N: EventName> Timeline<N> {
    /// Ingest event `name` whose causal predecessors are `after`.
    ///
    /// Predecessors may name events that have not been ingested yet; the
    /// edge is attached once they arrive. Repeated predecessor names are
    /// collapsed to their first occurrence.
    ///
    /// Change records produced by this call are delivered to the notifier
    /// (coalesced unless disabled in [`TimelineOptions`](super::TimelineOptions))
    /// after the order has settled.
    ///
    /// # Errors
    ///
    /// - [`TimelineError::DuplicateName`] if `name` was already ingested. The
    ///   timeline is unchanged.
    /// - [`TimelineError::Cycle`] if `name` lists itself (the timeline is
    ///   unchanged) or if one of the new edges closes a longer cycle. In the
    ///   latter case the timeline is left inconsistent and must be discarded;
    ///   no change records are delivered.
    pub fn add(&mut self, name: N, after: impl IntoIterator<Item = N>) -> Result<(), TimelineError<N>> {
        if self.by_name.contains_key(&name) {
            return Err(TimelineError::DuplicateName(name));
        }

        let mut declared: Vec<N> = Vec::new();
        for cause in after {
            if !declared.contains(&cause) {
                declared.push(cause);
            }
        }
        if declared.contains(&name) {
            warn!(event = ?name, "event lists itself as a predecessor");
            return Err(TimelineError::Cycle {
                event: name.clone(),
                cause: name,
            });
        }

        self.changes.clear();
        let id = self.register(name.clone(), declared);
        let anchors: Vec<NodeId> = self.node(id).resolved().collect();

        // Provisional slot: right after the latest resolved predecessor.
        let slot = anchors
            .iter()
            .map(|anchor| self.node(*anchor).position + 1)
            .max()
            .unwrap_or(0);
        self.splice(id, slot);

        if anchors.is_empty() {
            if self.linear.len() > 1 {
                self.rise(id);
            }
        } else {
            for anchor in anchors {
                self.integrate(id, anchor)?;
            }
        }

        if let Some(waiters) = self.pending.remove(&name) {
            debug!(event = ?name, waiters = waiters.len(), "resolving pending edges");
            for waiter in waiters {
                self.integrate(waiter, id)?;
                self.nodes[id.0].successors.push(waiter);
                self.nodes[waiter.0].resolve(&name, id);
            }
        }

        let delivered = self.flush();
        let node = self.node(id);
        debug!(
            event = ?name,
            position = node.position,
            rank = node.rank,
            delivered,
            "event ingested"
        );
        Ok(())
    }

    /// Create the arena node for `name`, link it to known predecessors and
    /// file it under every predecessor that is still missing.
    fn register(&mut self, name: N, declared: Vec<N>) -> NodeId {
        let id = NodeId(self.nodes.len());

        let mut causes = Vec::with_capacity(declared.len());
        for cause in declared {
            if let Some(&anchor) = self.by_name.get(&cause) {
                self.nodes[anchor.0].successors.push(id);
                causes.push(Cause::Resolved(anchor));
            } else {
                self.pending.entry(cause.clone()).or_default().push(id);
                causes.push(Cause::Pending(cause));
            }
        }

        self.by_name.insert(name.clone(), id);
        self.nodes.push(Node::new(name, causes));
        id
    }
}

//! Incrementally maintained linearization of a causal event graph.
//!
//! The [`Timeline`] owns every ingested event in an arena addressed by
//! [`NodeId`], the current linear order, a name index, and the index of
//! predecessors that are referenced but not yet ingested.
//!
//! # Ordering
//!
//! Once every referenced predecessor has been delivered, the linear order is
//! ascending by rank (longest path from a root) and, within one rank,
//! ascending by name. Peers that ingest the same events in any order
//! therefore converge on the same sequence.
//!
//! # Sub-modules
//!
//! - `insert`: the [`Timeline::add`] entry point.
//! - `edge`: causal edge integration and rank propagation.
//! - `position`: the splice, jump and rise primitives.
//!
//! # Concurrency
//!
//! `add` is synchronous and not reentrant. Callers sharing a timeline across
//! threads must serialize access themselves.

mod edge;
mod insert;
mod node;
mod position;

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub use node::NodeId;
use node::{Cause, Node};

use crate::error::TimelineError;
use crate::notify::{Change, Notifier, coalesce};

/// Requirements on caller-supplied event names.
///
/// Names are opaque identifiers; their total order breaks ties between
/// events of equal rank.
pub trait EventName: Clone + Ord + Hash + fmt::Debug {}

impl<T: Clone + Ord + Hash + fmt::Debug> EventName for T {}

/// Tunables for a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    /// Run the change-notification optimizer before delivering records.
    pub coalesce: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self { coalesce: true }
    }
}

/// Deterministic total order over causally-linked events.
pub struct Timeline<N = String> {
    nodes: Vec<Node<N>>,
    linear: Vec<NodeId>,
    by_name: HashMap<N, NodeId>,
    /// Awaited predecessor name -> waiting nodes, in registration order.
    pending: BTreeMap<N, Vec<NodeId>>,
    options: TimelineOptions,
    notifier: Option<Notifier<N>>,
    /// Raw records of the `add` in progress.
    changes: Vec<Change<N>>,
}

impl<N: EventName> Timeline<N> {
    /// Create an empty timeline without a change notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TimelineOptions::default())
    }

    /// Create an empty timeline with explicit options.
    #[must_use]
    pub fn with_options(options: TimelineOptions) -> Self {
        Self {
            nodes: Vec::new(),
            linear: Vec::new(),
            by_name: HashMap::new(),
            pending: BTreeMap::new(),
            options,
            notifier: None,
            changes: Vec::new(),
        }
    }

    /// Create an empty timeline that reports every positional edit to
    /// `notify`, synchronously and in order, at the end of each `add`.
    #[must_use]
    pub fn with_notifier(notify: impl FnMut(&Change<N>) + Send + 'static) -> Self {
        let mut timeline = Self::new();
        timeline.set_notifier(notify);
        timeline
    }

    /// Install or replace the change notifier.
    pub fn set_notifier(&mut self, notify: impl FnMut(&Change<N>) + Send + 'static) {
        self.notifier = Some(Box::new(notify));
    }

    /// Remove the change notifier. No records are buffered afterwards.
    pub fn clear_notifier(&mut self) {
        self.notifier = None;
    }

    #[must_use]
    pub const fn options(&self) -> TimelineOptions {
        self.options
    }

    /// Number of ingested events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.linear.len()
    }

    /// Returns `true` if nothing has been ingested yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.linear.is_empty()
    }

    /// Returns `true` if `name` has been ingested.
    #[must_use]
    pub fn contains<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_name.contains_key(name)
    }

    /// Current zero-based position of `name` in the linear order.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownName`] if `name` was never ingested.
    pub fn index<Q>(&self, name: &Q) -> Result<usize, TimelineError<N>>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = N> + ?Sized,
    {
        self.by_name
            .get(name)
            .map(|id| self.node(*id).position)
            .ok_or_else(|| TimelineError::UnknownName(name.to_owned()))
    }

    /// Current rank of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownName`] if `name` was never ingested.
    pub fn rank<Q>(&self, name: &Q) -> Result<usize, TimelineError<N>>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = N> + ?Sized,
    {
        self.by_name
            .get(name)
            .map(|id| self.node(*id).rank)
            .ok_or_else(|| TimelineError::UnknownName(name.to_owned()))
    }

    /// Name of the event at `position`, if in range.
    #[must_use]
    pub fn name_at(&self, position: usize) -> Option<&N> {
        self.linear.get(position).map(|id| &self.node(*id).name)
    }

    /// Look up an event view by name.
    #[must_use]
    pub fn get<Q>(&self, name: &Q) -> Option<EventRef<'_, N>>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_name.get(name).map(|id| self.event(*id))
    }

    /// Names in linear order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &N> + ExactSizeIterator + '_ {
        self.linear.iter().map(|id| &self.node(*id).name)
    }

    /// Event views in linear order.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = EventRef<'_, N>> + ExactSizeIterator {
        self.linear.iter().map(|id| self.event(*id))
    }

    /// Awaited predecessor names with the events waiting on each, ordered by
    /// awaited name. Waiters appear in registration order.
    pub fn pending(&self) -> impl Iterator<Item = (&N, Vec<&N>)> + '_ {
        self.pending.iter().map(|(awaited, waiters)| {
            let names = waiters.iter().map(|id| &self.node(*id).name).collect();
            (awaited, names)
        })
    }

    /// Returns `true` if some ingested event is still waiting on `name`.
    #[must_use]
    pub fn is_pending<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.pending.contains_key(name)
    }

    fn node(&self, id: NodeId) -> &Node<N> {
        &self.nodes[id.0]
    }

    const fn event(&self, id: NodeId) -> EventRef<'_, N> {
        EventRef { timeline: self, id }
    }

    fn record(&mut self, change: impl FnOnce(&Self) -> Change<N>) {
        if self.notifier.is_some() {
            let change = change(self);
            self.changes.push(change);
        }
    }

    /// Deliver the records buffered by the `add` that just completed.
    fn flush(&mut self) -> usize {
        let raw = std::mem::take(&mut self.changes);
        let Some(notify) = self.notifier.as_mut() else {
            return 0;
        };
        let records = if self.options.coalesce {
            coalesce(raw)
        } else {
            raw
        };
        for record in &records {
            notify(record);
        }
        records.len()
    }
}

impl<N: EventName> Default for Timeline<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: EventName> fmt::Debug for Timeline<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("order", &self.iter().collect::<Vec<_>>())
            .field("pending", &self.pending().collect::<Vec<_>>())
            .field("options", &self.options)
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

/// Read-only view of one ingested event.
pub struct EventRef<'a, N> {
    timeline: &'a Timeline<N>,
    id: NodeId,
}

impl<N> Clone for EventRef<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for EventRef<'_, N> {}

impl<'a, N: EventName> EventRef<'a, N> {
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'a N {
        &self.timeline.node(self.id).name
    }

    /// Longest-path depth from a root, over the edges resolved so far.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.timeline.node(self.id).rank
    }

    /// Current zero-based position in the linear order.
    #[must_use]
    pub fn position(&self) -> usize {
        self.timeline.node(self.id).position
    }

    /// Events that list this one as a resolved predecessor, in the order
    /// the edges were attached.
    pub fn successors(&self) -> impl Iterator<Item = EventRef<'a, N>> + use<'a, N> {
        let timeline = self.timeline;
        timeline
            .node(self.id)
            .successors
            .iter()
            .map(move |id| timeline.event(*id))
    }

    /// Resolved predecessors, in declaration order.
    pub fn predecessors(&self) -> impl Iterator<Item = EventRef<'a, N>> + use<'a, N> {
        let timeline = self.timeline;
        timeline
            .node(self.id)
            .resolved()
            .map(move |id| timeline.event(id))
    }

    /// Declared predecessors that have not been ingested yet.
    pub fn unresolved(&self) -> impl Iterator<Item = &'a N> + use<'a, N> {
        self.timeline
            .node(self.id)
            .causes
            .iter()
            .filter_map(|cause| match cause {
                Cause::Pending(name) => Some(name),
                Cause::Resolved(_) => None,
            })
    }
}

impl<N: EventName> fmt::Debug for EventRef<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRef")
            .field("name", self.name())
            .field("rank", &self.rank())
            .field("position", &self.position())
            .finish()
    }
}

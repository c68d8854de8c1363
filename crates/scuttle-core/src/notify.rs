//! Positional change records and the change-notification optimizer.
//!
//! Every edit the timeline makes to its linear order is recorded as a
//! [`Change`]. A consumer mirroring the order (a UI list, a replicated log
//! index) can apply the records in sequence to an initially empty vector and
//! reproduce the timeline exactly.
//!
//! # Coalescing
//!
//! A single `add` frequently inserts an event and then relocates it several
//! times while causal edges are integrated. [`coalesce`] folds every maximal
//! chain in which a move starts where the previous record ended:
//!
//! - `insert(n, a), move(a, b), move(b, c)` becomes `insert(n, c)`
//! - `move(a, b), move(b, c)` becomes `move(a, c)`
//!
//! Unrelated records keep their relative order.

use serde::{Deserialize, Serialize};

/// A single edit to the linear order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change<N> {
    /// `name` was spliced in at `position`; everything at or after it shifted
    /// one slot later.
    Insert { name: N, position: usize },
    /// The event at `from` was removed and re-inserted at `to`.
    Move { from: usize, to: usize },
}

impl<N> Change<N> {
    /// The position the affected event occupies after this record.
    #[must_use]
    pub const fn destination(&self) -> usize {
        match self {
            Self::Insert { position, .. } => *position,
            Self::Move { to, .. } => *to,
        }
    }

    const fn set_destination(&mut self, destination: usize) {
        match self {
            Self::Insert { position, .. } => *position = destination,
            Self::Move { to, .. } => *to = destination,
        }
    }

    /// Replay this record onto a mirror of the linear order.
    ///
    /// # Panics
    ///
    /// Panics if the positions are out of range for `mirror`, which means the
    /// mirror has diverged from the timeline that produced the record.
    pub fn apply(&self, mirror: &mut Vec<N>)
    where
        N: Clone,
    {
        match self {
            Self::Insert { name, position } => mirror.insert(*position, name.clone()),
            Self::Move { from, to } => {
                let moved = mirror.remove(*from);
                mirror.insert(*to, moved);
            }
        }
    }
}

/// Collapse derivable move chains into the minimal equivalent record list.
///
/// Pure fold with one lookahead slot: the current base record absorbs every
/// following move whose source equals the base's destination.
#[must_use]
pub fn coalesce<N>(records: impl IntoIterator<Item = Change<N>>) -> Vec<Change<N>> {
    let mut out = Vec::new();
    let mut base: Option<Change<N>> = None;

    for record in records {
        if let Some(current) = base.as_mut() {
            if let Change::Move { from, to } = record {
                if current.destination() == from {
                    current.set_destination(to);
                    continue;
                }
            }
        }
        out.extend(base.replace(record));
    }
    out.extend(base);
    out
}

/// Callback receiving each change record of the most recent `add`.
///
/// Sinks must be `Send` so a timeline can move between threads.
pub type Notifier<N> = Box<dyn FnMut(&Change<N>) + Send>;

//! Elementary repositioning of nodes within the linear order.
//!
//! All higher logic is built from two moves: [`Timeline::jump`] relocates a
//! node past a contiguous run of later nodes, and [`Timeline::rise`] scans
//! forward for the node's resting slot (ascending rank, then ascending name)
//! and jumps there. Both keep every node's cached position in sync and cost
//! O(span moved).

use tracing::trace;

use super::node::Node;
use super::{EventName, NodeId, Timeline};
use crate::notify::Change;

impl<N: EventName> Timeline<N> {
    /// Splice `id` into the order at `position`, shifting later nodes.
    pub(super) fn splice(&mut self, id: NodeId, position: usize) {
        for later in &self.linear[position..] {
            self.nodes[later.0].position += 1;
        }
        self.linear.insert(position, id);
        self.nodes[id.0].position = position;
        self.record(|timeline| Change::Insert {
            name: timeline.node(id).name.clone(),
            position,
        });
    }

    /// Move `id` forward to `target`.
    ///
    /// ```text
    ///            from        target
    ///            v           v
    ///   .. | e | f | g | h | ..      ->      .. | f | g | h | e | ..
    /// ```
    pub(super) fn jump(&mut self, id: NodeId, target: usize) {
        let from = self.node(id).position;
        debug_assert!(from < target, "jump only moves towards the future");

        for shifted in &self.linear[from + 1..=target] {
            self.nodes[shifted.0].position -= 1;
        }
        self.linear[from..=target].rotate_left(1);
        self.nodes[id.0].position = target;

        trace!(event = ?self.node(id).name, from, to = target, "jump");
        self.record(|_| Change::Move { from, to: target });
    }

    /// Advance `id` past every later node that should precede it.
    ///
    /// First skips nodes of strictly lower rank, then equal-rank nodes with a
    /// smaller name. No-op if the node is already at rest.
    pub(super) fn rise(&mut self, id: NodeId) {
        let node = self.node(id);
        let start = node.position;
        let last = self.linear.len() - 1;
        let mut target = start;

        while target < last && self.at(target + 1).rank < node.rank {
            target += 1;
        }
        while target < last && {
            let next = self.at(target + 1);
            next.rank == node.rank && next.name < node.name
        } {
            target += 1;
        }

        if target > start {
            self.jump(id, target);
        }
    }

    fn at(&self, position: usize) -> &Node<N> {
        self.node(self.linear[position])
    }
}

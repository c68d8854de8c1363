//! Arena-resident event records.

/// Stable handle of a node inside a [`Timeline`](crate::Timeline) arena.
///
/// Handles are assigned in ingestion order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// A declared predecessor of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cause<N> {
    /// The predecessor has been ingested and the edge integrated.
    Resolved(NodeId),
    /// The predecessor is only known by name so far.
    Pending(N),
}

/// One ingested event.
#[derive(Debug, Clone)]
pub(crate) struct Node<N> {
    pub(crate) name: N,
    /// Declared predecessors, in the order the caller listed them.
    pub(crate) causes: Vec<Cause<N>>,
    /// Nodes that list this one as a resolved predecessor.
    pub(crate) successors: Vec<NodeId>,
    pub(crate) rank: usize,
    pub(crate) position: usize,
}

impl<N> Node<N> {
    pub(crate) const fn new(name: N, causes: Vec<Cause<N>>) -> Self {
        Self {
            name,
            causes,
            successors: Vec::new(),
            rank: 0,
            position: 0,
        }
    }

    pub(crate) fn resolved(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.causes.iter().filter_map(|cause| match cause {
            Cause::Resolved(id) => Some(*id),
            Cause::Pending(_) => None,
        })
    }

    /// Mark the pending cause named `name` as resolved to `id`.
    pub(crate) fn resolve(&mut self, name: &N, id: NodeId)
    where
        N: PartialEq,
    {
        for cause in &mut self.causes {
            if matches!(cause, Cause::Pending(pending) if pending == name) {
                *cause = Cause::Resolved(id);
            }
        }
    }
}

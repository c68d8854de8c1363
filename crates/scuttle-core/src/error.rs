//! Error types for timeline mutation and lookup.
//!
//! Every [`TimelineError`] maps onto a stable [`ErrorCode`] so callers that
//! relay failures (replication daemons, CLIs) can react without parsing
//! display strings.

use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DuplicateName,
    UnknownName,
    CycleDetected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DuplicateName => "E2101",
            Self::UnknownName => "E2102",
            Self::CycleDetected => "E2103",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DuplicateName => "Event already ingested",
            Self::UnknownName => "Event not found",
            Self::CycleDetected => "Causal cycle detected",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DuplicateName => Some("Skip events that were already delivered to this timeline."),
            Self::UnknownName => None,
            Self::CycleDetected => {
                Some("Discard this timeline; its predecessor graph is not acyclic.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by [`Timeline`](crate::Timeline) operations.
///
/// `N` is the caller's event name type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError<N: fmt::Debug> {
    /// The name was already ingested. Raised before any mutation.
    #[error("event already ingested: {0:?}")]
    DuplicateName(N),

    /// Position or rank lookup for a name that was never ingested.
    #[error("event not found: {0:?}")]
    UnknownName(N),

    /// Integrating the edge `event -> cause` closed a cycle.
    ///
    /// Apart from self-references, which are rejected up front, the
    /// timeline has already been partially mutated when this is returned
    /// and must be discarded.
    #[error("cycle detected while ordering {event:?} after {cause:?}")]
    Cycle {
        /// The event whose predecessor edge was being integrated.
        event: N,
        /// The predecessor that turned out to be reachable from `event`.
        cause: N,
    },
}

impl<N: fmt::Debug> TimelineError<N> {
    /// The stable error code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateName(_) => ErrorCode::DuplicateName,
            Self::UnknownName(_) => ErrorCode::UnknownName,
            Self::Cycle { .. } => ErrorCode::CycleDetected,
        }
    }
}

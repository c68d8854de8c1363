//! scuttle-core library.
//!
//! Incremental, deterministic linearization of causally-linked events.
//! Events arrive one at a time, possibly before their predecessors, and every
//! replica that eventually receives the same events ends up with the same
//! total order: ascending by rank, ties broken by name.
//!
//! ```
//! use scuttle_core::Timeline;
//!
//! let mut timeline = Timeline::new();
//! timeline.add("B", ["A"])?;
//! timeline.add("A", [])?;
//! assert_eq!(timeline.iter().copied().collect::<Vec<_>>(), ["A", "B"]);
//! # Ok::<(), scuttle_core::TimelineError<&str>>(())
//! ```
//!
//! # Conventions
//!
//! - **Errors**: Typed [`TimelineError`] values carrying an [`ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod error;
pub mod notify;
pub mod timeline;

pub use error::{ErrorCode, TimelineError};
pub use notify::{Change, Notifier, coalesce};
pub use timeline::{EventName, EventRef, NodeId, Timeline, TimelineOptions};

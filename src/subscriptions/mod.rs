//! Live window subscriptions.
//!
//! A window subscription is a standing query over the post collection:
//! newest posts first, capped to a fixed limit. Whenever a change to the
//! collection alters a subscriber's window, that subscriber receives a full
//! replacement snapshot (never a diff).
//!
//! Buffers are bounded; a subscriber that stops draining its channel is
//! dropped with [`DropReason::BufferOverflow`].
//!
//! # Example
//!
//! ```ignore
//! let handle = collection.watch_recent(WindowConfig::default())?;
//!
//! loop {
//!     match handle.recv() {
//!         Ok(FeedEvent::Snapshot(snapshot)) => render(&snapshot.posts),
//!         Ok(FeedEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::WindowManager;
pub use types::{
    DropReason, FeedEvent, FeedSnapshot, SubscriptionId, WindowConfig, WindowHandle,
    DEFAULT_WINDOW_LIMIT,
};

//! # Feedline
//!
//! A live feed synchronization core with ownership-gated post mutation.
//!
//! ## Core Concepts
//!
//! - **Feed window**: a live query over the newest posts, delivered as full
//!   replacement snapshots whenever the window changes
//! - **Posts**: text entries with at most one media attachment, stored in a
//!   document collection and mirrored by a path-addressed blob store
//! - **Ownership gate**: edit/delete are UI affordances reachable only by the
//!   post's author, checked against live session state
//! - **Delete cascade**: removing a post also removes its media blob at
//!   `posts/{owner}/{post}`, non-transactionally, with an orphan sweep
//!
//! ## Example
//!
//! ```ignore
//! use feedline::{FeedSubscriber, PostCollection, WindowConfig};
//!
//! let collection = PostCollection::new();
//! let mut feed = FeedSubscriber::new();
//! feed.activate(&collection, WindowConfig::default());
//!
//! feed.poll();
//! for post in feed.posts() {
//!     println!("{}: {}", post.author_display_name, post.text);
//! }
//!
//! feed.teardown();
//! ```

pub mod blobs;
pub mod error;
pub mod feed;
pub mod item;
pub mod store;
pub mod subscriptions;
pub mod sweep;
pub mod types;

// Re-exports
pub use blobs::MediaStorage;
pub use error::{FeedError, Result};
pub use feed::FeedSubscriber;
pub use item::{MutationOutcome, PostItem, StagedMedia};
pub use store::PostCollection;
pub use subscriptions::{
    DropReason, FeedEvent, FeedSnapshot, SubscriptionId, WindowConfig, WindowHandle,
    DEFAULT_WINDOW_LIMIT,
};
pub use sweep::{sweep_orphaned_media, SweepReport};
pub use types::*;

//! Subscription types for live feed windows.

use crate::types::Post;
use serde::{Deserialize, Serialize};
use std::sync::Weak;

use super::manager::WindowManager;

/// Default number of posts in the feed window.
pub const DEFAULT_WINDOW_LIMIT: usize = 3;

/// Configuration for a window subscription.
#[derive(Clone, Debug)]
pub struct WindowConfig {
    /// Max posts in the delivered window.
    pub limit: usize,

    /// Max buffered events before the subscriber is dropped.
    pub buffer_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_WINDOW_LIMIT,
            buffer_size: 64,
        }
    }
}

impl WindowConfig {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

/// One complete delivery of the window's current result set.
///
/// Snapshots are full replacements, never diffs; posts arrive already sorted
/// by `created_at` descending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
}

impl FeedSnapshot {
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Events delivered to a window subscriber.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    /// The window's content changed; replaces any previously held snapshot.
    Snapshot(FeedSnapshot),

    /// Subscription was dropped; no further snapshots will arrive.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// The store was closed.
    Disconnected,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to a live window subscription.
///
/// Dropping the handle does not unsubscribe; call [`WindowHandle::close`] to
/// tear the subscription down from the client side.
pub struct WindowHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<FeedEvent>,
    pub(crate) manager: Weak<WindowManager>,
}

impl WindowHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<FeedEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<FeedEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<FeedEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Unsubscribe. Safe to call after the store is gone.
    pub fn close(&self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.unsubscribe(self.id);
        }
    }
}

//! Window manager: broadcasts replacement snapshots to feed subscribers.

use crate::types::Post;
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::types::{
    DropReason, FeedEvent, FeedSnapshot, SubscriptionId, WindowConfig, WindowHandle,
};

/// Internal subscriber state.
struct Subscriber {
    config: WindowConfig,
    sender: Sender<FeedEvent>,
    /// Window content of the last snapshot sent. Re-fires are suppressed
    /// when a collection change leaves this subscriber's window unchanged.
    last_window: Vec<Post>,
}

impl Subscriber {
    /// Try to send an event. Returns false if the buffer is full or the
    /// receiver is gone (subscriber will be dropped).
    fn try_send(&self, event: FeedEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }

    fn window_of<'a>(&self, sorted: &'a [Post]) -> &'a [Post] {
        &sorted[..sorted.len().min(self.config.limit)]
    }
}

/// Manages window subscriptions and broadcasts snapshots.
pub struct WindowManager {
    /// Active subscribers by ID.
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl WindowManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Create a new subscription.
    ///
    /// `current` is the collection's posts sorted by `created_at` descending;
    /// the subscriber's initial snapshot is delivered immediately from it.
    pub fn subscribe(self: &Arc<Self>, config: WindowConfig, current: &[Post]) -> WindowHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size.max(1));

        let mut subscriber = Subscriber {
            config,
            sender,
            last_window: Vec::new(),
        };

        let initial = subscriber.window_of(current).to_vec();
        let _ = subscriber.try_send(FeedEvent::Snapshot(FeedSnapshot {
            posts: initial.clone(),
        }));
        subscriber.last_window = initial;
        self.subscribers.write().insert(id, subscriber);

        WindowHandle {
            id,
            receiver,
            manager: Arc::downgrade(self),
        }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscribers.write();
        if let Some(sub) = subs.remove(&id) {
            // Best effort
            let _ = sub.try_send(FeedEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Broadcast the collection's new state.
    ///
    /// `sorted` must be every post ordered by `created_at` descending. Each
    /// subscriber receives a full replacement snapshot of its own window, and
    /// only if that window's content changed.
    pub fn broadcast(&self, sorted: &[Post]) {
        let mut to_remove = Vec::new();

        {
            let mut subs = self.subscribers.write();
            for (id, sub) in subs.iter_mut() {
                let window = sub.window_of(sorted);
                if window == sub.last_window.as_slice() {
                    continue;
                }
                let snapshot = FeedSnapshot {
                    posts: window.to_vec(),
                };
                if sub.try_send(FeedEvent::Snapshot(snapshot)) {
                    sub.last_window = window.to_vec();
                } else {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscribers.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    // Might fail, that's ok
                    let _ = sub.try_send(FeedEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }

    /// Drop every subscriber (store closing).
    pub fn drop_all(&self, reason: DropReason) {
        let mut subs = self.subscribers.write();
        for (_, sub) in subs.drain() {
            let _ = sub.try_send(FeedEvent::Dropped { reason });
        }
    }

    /// Get subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

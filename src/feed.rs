//! Feed subscriber: a reactive, ordered view of the most recent posts.

use crate::store::PostCollection;
use crate::subscriptions::{FeedEvent, WindowConfig, WindowHandle};
use crate::types::Post;
use tracing::{debug, warn};

/// Lifecycle of the underlying subscription.
enum SubscriptionState {
    /// No subscription established (initial, or establishment failed).
    Idle,
    /// Live subscription.
    Active(WindowHandle),
    /// Torn down. No further snapshots are acted upon.
    Closed,
}

/// Maintains a live, always-current ordered sequence of the newest posts.
///
/// Holds at most one subscription for its whole lifetime. Establishment is
/// asynchronous from the caller's point of view: [`FeedSubscriber::attach`]
/// is the completion point, and a handle arriving after
/// [`FeedSubscriber::teardown`] is closed immediately instead of stored.
///
/// If establishment fails the view stays empty; there is no automatic retry.
pub struct FeedSubscriber {
    view: Vec<Post>,
    state: SubscriptionState,
}

impl FeedSubscriber {
    pub fn new() -> Self {
        Self {
            view: Vec::new(),
            state: SubscriptionState::Idle,
        }
    }

    /// Establish the live subscription against the collection.
    ///
    /// On failure the subscriber logs and stays empty. No-op when a
    /// subscription already exists or teardown has run.
    pub fn activate(&mut self, collection: &PostCollection, config: WindowConfig) {
        match self.state {
            SubscriptionState::Idle => {}
            SubscriptionState::Active(_) | SubscriptionState::Closed => return,
        }

        match collection.watch_recent(config) {
            Ok(handle) => self.attach(handle),
            Err(e) => {
                warn!(error = %e, "feed subscription could not be established");
            }
        }
    }

    /// Completion point of subscription establishment.
    ///
    /// If teardown already ran, the handle is closed here and never stored,
    /// so a subscription resolving after teardown cannot leak.
    pub fn attach(&mut self, handle: WindowHandle) {
        match self.state {
            SubscriptionState::Idle => self.state = SubscriptionState::Active(handle),
            SubscriptionState::Closed => {
                debug!("subscription resolved after teardown, closing");
                handle.close();
            }
            SubscriptionState::Active(_) => {
                debug!("duplicate subscription attach, closing the new handle");
                handle.close();
            }
        }
    }

    /// Drain pending events and apply the newest snapshot to the view.
    ///
    /// Each snapshot fully replaces the held sequence; when several are
    /// queued, the last one wins. After teardown this is a no-op even for
    /// events that were already in flight.
    pub fn poll(&mut self) {
        let SubscriptionState::Active(handle) = &self.state else {
            return;
        };

        let mut latest = None;
        let mut dropped = false;
        while let Ok(event) = handle.try_recv() {
            match event {
                FeedEvent::Snapshot(snapshot) => latest = Some(snapshot),
                FeedEvent::Dropped { reason } => {
                    debug!(?reason, "feed subscription dropped by store");
                    dropped = true;
                    break;
                }
            }
        }

        if let Some(snapshot) = latest {
            self.view = snapshot.posts;
        }
        if dropped {
            // The store already removed the subscription; the last view is
            // kept for display.
            self.state = SubscriptionState::Closed;
        }
    }

    /// The ordered sequence handed to rendering (newest first).
    pub fn posts(&self) -> &[Post] {
        &self.view
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SubscriptionState::Active(_))
    }

    /// Tear down the subscription. Idempotent; closes the handle exactly
    /// once, and arms the late-attach guard if establishment is still
    /// pending.
    pub fn teardown(&mut self) {
        match std::mem::replace(&mut self.state, SubscriptionState::Closed) {
            SubscriptionState::Active(handle) => handle.close(),
            SubscriptionState::Idle | SubscriptionState::Closed => {}
        }
    }
}

impl Default for FeedSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

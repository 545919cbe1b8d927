//! In-process post collection with live window queries.

use crate::error::{FeedError, Result};
use crate::subscriptions::{DropReason, WindowConfig, WindowHandle, WindowManager};
use crate::types::{MediaPatch, Post, PostDraft, PostId, PostPatch, Timestamp};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Document store for posts.
///
/// Reference implementation of the collaborator contract the feed core
/// consumes: point reads, remove-by-id, field updates, and live window
/// queries that re-deliver a replacement snapshot on any change affecting
/// window membership. Strongly consistent per document; no transactions.
pub struct PostCollection {
    /// Records by id.
    posts: RwLock<HashMap<PostId, Post>>,

    /// Live window subscribers.
    windows: Arc<WindowManager>,

    /// Counter for generating record ids.
    next_id: AtomicU64,

    /// High-water mark for monotonic `created_at` assignment.
    last_created: Mutex<Timestamp>,

    /// Once closed, every operation fails with `StoreClosed`.
    closed: AtomicBool,
}

impl PostCollection {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            windows: WindowManager::new(),
            next_id: AtomicU64::new(1),
            last_created: Mutex::new(Timestamp(0)),
            closed: AtomicBool::new(false),
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(FeedError::StoreClosed)
        } else {
            Ok(())
        }
    }

    fn assign_id(&self) -> PostId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        PostId(format!("{n:08x}"))
    }

    /// Next creation timestamp, strictly greater than any assigned before.
    fn assign_created_at(&self) -> Timestamp {
        let mut last = self.last_created.lock();
        let now = Timestamp::now();
        let assigned = if now > *last { now } else { last.next() };
        *last = assigned;
        assigned
    }

    /// Every post, ordered by `created_at` descending (id descending on ties,
    /// so window ordering is strict).
    fn sorted_desc(&self) -> Vec<Post> {
        let posts = self.posts.read();
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        all
    }

    fn broadcast(&self) {
        self.windows.broadcast(&self.sorted_desc());
    }

    /// Insert a new post, assigning its id and creation time.
    pub fn insert(&self, draft: PostDraft) -> Result<Post> {
        self.check_open()?;
        let created_at = self.assign_created_at();
        self.insert_with(draft, created_at)
    }

    /// Insert with an explicit creation time (backfill and test ingestion).
    pub fn insert_at(&self, draft: PostDraft, created_at: Timestamp) -> Result<Post> {
        self.check_open()?;
        {
            let mut last = self.last_created.lock();
            if created_at > *last {
                *last = created_at;
            }
        }
        self.insert_with(draft, created_at)
    }

    /// Callers have already checked the store is open.
    fn insert_with(&self, draft: PostDraft, created_at: Timestamp) -> Result<Post> {
        let post = Post {
            id: self.assign_id(),
            created_at,
            text: draft.text,
            photo_url: draft.photo_url,
            video_url: draft.video_url,
            author_id: draft.author_id,
            author_display_name: draft.author_display_name,
        };

        self.posts.write().insert(post.id.clone(), post.clone());
        self.broadcast();
        Ok(post)
    }

    /// Point read. `Ok(None)` is the not-found signal.
    pub fn fetch(&self, id: &PostId) -> Result<Option<Post>> {
        self.check_open()?;
        Ok(self.posts.read().get(id).cloned())
    }

    /// Remove a post by id. Returns false if it was absent.
    pub fn delete(&self, id: &PostId) -> Result<bool> {
        self.check_open()?;

        let removed = self.posts.write().remove(id).is_some();
        if removed {
            self.broadcast();
        }
        Ok(removed)
    }

    /// Apply a patch to an existing post, returning the updated record.
    pub fn apply_update(&self, id: &PostId, patch: PostPatch) -> Result<Post> {
        self.check_open()?;

        let updated = {
            let mut posts = self.posts.write();
            let post = posts
                .get_mut(id)
                .ok_or_else(|| FeedError::PostNotFound(id.clone()))?;

            if let Some(text) = patch.text {
                post.text = text;
            }
            match patch.media {
                Some(MediaPatch::Photo(url)) => {
                    post.photo_url = Some(url);
                    post.video_url = None;
                }
                Some(MediaPatch::Video(url)) => {
                    post.video_url = Some(url);
                    post.photo_url = None;
                }
                Some(MediaPatch::Clear) => {
                    post.photo_url = None;
                    post.video_url = None;
                }
                None => {}
            }
            post.clone()
        };

        self.broadcast();
        Ok(updated)
    }

    /// Open a live window query: newest posts first, capped to
    /// `config.limit`. The initial snapshot is delivered immediately.
    pub fn watch_recent(&self, config: WindowConfig) -> Result<WindowHandle> {
        self.check_open()?;
        Ok(self.windows.subscribe(config, &self.sorted_desc()))
    }

    /// Close the store. Subsequent operations fail with `StoreClosed` and
    /// live subscribers are dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.windows.drop_all(DropReason::Disconnected);
        }
    }

    pub fn len(&self) -> usize {
        self.posts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.read().is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.windows.subscriber_count()
    }
}

impl Default for PostCollection {
    fn default() -> Self {
        Self::new()
    }
}

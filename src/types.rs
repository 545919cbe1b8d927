//! Core types for the feed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque identifier for a post, assigned by the store at creation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

impl fmt::Debug for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostId({})", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an authenticated principal.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        PrincipalId(id.into())
    }
}

impl fmt::Debug for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrincipalId({})", self.0)
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Microseconds since Unix epoch. Sole sort key for the feed window.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Timestamp(duration.as_micros() as i64)
    }

    pub fn next(self) -> Self {
        Timestamp(self.0 + 1)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// Kind of media attached to a post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
}

/// A single feed entry.
///
/// At most one of `photo_url`/`video_url` is expected to be set; nothing in
/// this core enforces that, and `media_kind` prefers photo when both are.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier (assigned by store).
    pub id: PostId,

    /// Creation time (assigned at insert, monotonic).
    pub created_at: Timestamp,

    /// Post body.
    pub text: String,

    /// Resolved location of an attached photo, if any.
    pub photo_url: Option<String>,

    /// Resolved location of an attached video, if any.
    pub video_url: Option<String>,

    /// Creating principal. Immutable after creation.
    pub author_id: PrincipalId,

    /// Display label captured at creation; not kept in sync with renames.
    pub author_display_name: String,
}

impl Post {
    /// Kind of the attached media, if any.
    pub fn media_kind(&self) -> Option<MediaKind> {
        if self.photo_url.is_some() {
            Some(MediaKind::Photo)
        } else if self.video_url.is_some() {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn has_media(&self) -> bool {
        self.media_kind().is_some()
    }
}

/// Input for creating a post (before id/created_at are assigned).
#[derive(Clone, Debug)]
pub struct PostDraft {
    pub text: String,
    pub photo_url: Option<String>,
    pub video_url: Option<String>,
    pub author_id: PrincipalId,
    pub author_display_name: String,
}

impl PostDraft {
    /// Text-only draft.
    pub fn text(
        author_id: PrincipalId,
        author_display_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            photo_url: None,
            video_url: None,
            author_id,
            author_display_name: author_display_name.into(),
        }
    }

    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }
}

/// Media change carried by a [`PostPatch`].
///
/// Setting one media field clears the other, preserving the single-attachment
/// shape of the record.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaPatch {
    Photo(String),
    Video(String),
    Clear,
}

/// Write set for updating a post. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct PostPatch {
    pub text: Option<String>,
    pub media: Option<MediaPatch>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.media.is_none()
    }
}

/// Read-only ambient view of the authenticated principal.
#[derive(Clone, Debug, Default)]
pub struct Session {
    principal: Option<PrincipalId>,
}

impl Session {
    pub fn authenticated(principal: PrincipalId) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    /// Current principal id, or `None` when unauthenticated.
    pub fn principal(&self) -> Option<&PrincipalId> {
        self.principal.as_ref()
    }

    /// Whether the session's principal owns the given post.
    ///
    /// Checked against live session state, not the denormalized author copy.
    /// This is a UI affordance filter, not a security boundary; real
    /// authorization belongs to the store's access-control layer.
    pub fn owns(&self, post: &Post) -> bool {
        self.principal() == Some(&post.author_id)
    }
}

/// Deterministic location of a post's media blob: `posts/{owner}/{post}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobPath {
    pub owner: PrincipalId,
    pub post: PostId,
}

impl BlobPath {
    pub fn new(owner: PrincipalId, post: PostId) -> Self {
        Self { owner, post }
    }

    /// Path relative to the media root.
    pub fn relative(&self) -> PathBuf {
        PathBuf::from("posts").join(&self.owner.0).join(&self.post.0)
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "posts/{}/{}", self.owner, self.post)
    }
}

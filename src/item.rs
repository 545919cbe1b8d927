//! Single-post rendering surface: ownership-gated edit and delete.

use crate::blobs::MediaStorage;
use crate::error::FeedError;
use crate::store::PostCollection;
use crate::types::{BlobPath, MediaKind, MediaPatch, Post, PostPatch, Session};
use tracing::{debug, warn};

/// Typed result of a delete or update attempt.
///
/// Failures are logged where they occur and never reach rendering as view
/// state; the variant exists so callers and tests can assert on outcomes.
#[derive(Debug)]
pub enum MutationOutcome {
    /// The operation was issued and completed.
    Applied,
    /// The confirmation prompt was declined. No store effect.
    Declined,
    /// The item was not in edit mode, so the update affordance was
    /// unreachable. No store effect.
    NotEditing,
    /// The live session principal does not own the post. No store effect.
    NotOwner,
    /// A remote step rejected; the operation was abandoned without rollback.
    Failed(FeedError),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// A replacement media file staged while editing. Never persisted until the
/// update completes.
#[derive(Clone, Debug)]
pub struct StagedMedia {
    pub content: Vec<u8>,
    pub kind: MediaKind,
}

/// Per-item edit state.
enum EditState {
    Viewing,
    Editing { staged: Option<StagedMedia> },
}

/// Renders one post and mediates owner-only mutation.
///
/// Edit/delete affordances are gated on the live session principal matching
/// the post's author. The gate is a UI affordance filter only; it is not a
/// security boundary.
pub struct PostItem {
    post: Post,
    edit: EditState,
}

impl PostItem {
    pub fn new(post: Post) -> Self {
        Self {
            post,
            edit: EditState::Viewing,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.edit, EditState::Editing { .. })
    }

    /// Whether the edit/delete controls render for this session.
    pub fn owner_controls_visible(&self, session: &Session) -> bool {
        session.owns(&self.post)
    }

    /// Whether the editing controls (cancel/update and the hidden file
    /// input) render. Only true in the editing state, which only an owner
    /// can reach.
    pub fn editor_controls_visible(&self) -> bool {
        self.is_editing()
    }

    /// Enter edit mode. Owners only; returns whether the transition ran.
    pub fn begin_edit(&mut self, session: &Session) -> bool {
        if !session.owns(&self.post) {
            debug!(post = %self.post.id, "edit refused for non-owner");
            return false;
        }
        if self.is_editing() {
            return false;
        }
        self.edit = EditState::Editing { staged: None };
        true
    }

    /// Stage a replacement media file. Only while editing; a second staged
    /// file replaces the first (single-file input).
    pub fn stage_media(&mut self, media: StagedMedia) -> bool {
        match &mut self.edit {
            EditState::Editing { staged } => {
                *staged = Some(media);
                true
            }
            EditState::Viewing => false,
        }
    }

    pub fn staged_media(&self) -> Option<&StagedMedia> {
        match &self.edit {
            EditState::Editing { staged } => staged.as_ref(),
            EditState::Viewing => None,
        }
    }

    /// Leave edit mode, discarding any staged media. No side effects.
    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Viewing;
    }

    /// Delete this post, cascading to its media blob.
    ///
    /// Order: confirmation, live-session ownership, record delete, then blob
    /// removal at `posts/{principal}/{post}` if the post carries a photo or
    /// video. The two deletions are not transactional: a blob failure after
    /// the record delete leaves an orphan for the reconciliation sweep.
    pub fn delete(
        &self,
        session: &Session,
        collection: &PostCollection,
        media: &MediaStorage,
        confirm: impl FnOnce() -> bool,
    ) -> MutationOutcome {
        if !confirm() {
            debug!(post = %self.post.id, "delete declined at prompt");
            return MutationOutcome::Declined;
        }
        let Some(principal) = session.principal().filter(|p| **p == self.post.author_id) else {
            debug!(post = %self.post.id, "delete refused for non-owner");
            return MutationOutcome::NotOwner;
        };

        if let Err(e) = collection.delete(&self.post.id) {
            warn!(post = %self.post.id, error = %e, "record delete failed, abandoning");
            return MutationOutcome::Failed(e);
        }

        if self.post.has_media() {
            let path = BlobPath::new(principal.clone(), self.post.id.clone());
            if let Err(e) = media.remove(&path) {
                warn!(
                    post = %self.post.id,
                    error = %e,
                    "media removal failed after record delete, orphan left for sweep"
                );
                return MutationOutcome::Failed(e);
            }
        }

        MutationOutcome::Applied
    }

    /// Update this post with the edits staged on this item.
    ///
    /// Only reachable from the editing state; fetches the current server
    /// copy first, and its media kind decides whether a superseded blob has
    /// to go before the replacement is stored. A missing record at fetch
    /// time aborts the operation with zero writes. On success the item
    /// leaves edit mode and discards the staged file.
    pub fn update(
        &mut self,
        session: &Session,
        collection: &PostCollection,
        media: &MediaStorage,
        confirm: impl FnOnce() -> bool,
        new_text: Option<String>,
    ) -> MutationOutcome {
        if !self.is_editing() {
            debug!(post = %self.post.id, "update invoked outside edit mode");
            return MutationOutcome::NotEditing;
        }
        if !confirm() {
            debug!(post = %self.post.id, "update declined at prompt");
            return MutationOutcome::Declined;
        }
        let Some(principal) = session.principal().filter(|p| **p == self.post.author_id) else {
            debug!(post = %self.post.id, "update refused for non-owner");
            return MutationOutcome::NotOwner;
        };
        let principal = principal.clone();

        let current = match collection.fetch(&self.post.id) {
            Ok(Some(post)) => post,
            Ok(None) => {
                warn!(post = %self.post.id, "record gone at update pre-fetch, aborting");
                return MutationOutcome::Failed(FeedError::PostNotFound(self.post.id.clone()));
            }
            Err(e) => {
                warn!(post = %self.post.id, error = %e, "update pre-fetch failed, abandoning");
                return MutationOutcome::Failed(e);
            }
        };
        let existing_kind = current.media_kind();

        let mut patch = PostPatch {
            text: new_text,
            media: None,
        };

        if let Some(staged) = self.staged_media() {
            let path = BlobPath::new(principal, self.post.id.clone());

            if existing_kind.is_some() {
                if let Err(e) = media.remove(&path) {
                    warn!(
                        post = %self.post.id,
                        error = %e,
                        "superseded media removal failed, abandoning update"
                    );
                    return MutationOutcome::Failed(e);
                }
            }

            let location = match media.store(&path, &staged.content) {
                Ok(location) => location,
                Err(e) => {
                    warn!(post = %self.post.id, error = %e, "replacement media store failed");
                    return MutationOutcome::Failed(e);
                }
            };

            patch.media = Some(match staged.kind {
                MediaKind::Photo => MediaPatch::Photo(location),
                MediaKind::Video => MediaPatch::Video(location),
            });
        }

        if !patch.is_empty() {
            match collection.apply_update(&self.post.id, patch) {
                Ok(updated) => self.post = updated,
                Err(e) => {
                    warn!(post = %self.post.id, error = %e, "record update failed, abandoning");
                    return MutationOutcome::Failed(e);
                }
            }
        }

        self.edit = EditState::Viewing;
        MutationOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PostDraft, PrincipalId};

    fn owner() -> Session {
        Session::authenticated(PrincipalId::new("alice"))
    }

    fn stranger() -> Session {
        Session::authenticated(PrincipalId::new("bob"))
    }

    fn seed(collection: &PostCollection) -> Post {
        collection
            .insert(PostDraft::text(PrincipalId::new("alice"), "Alice", "hello"))
            .unwrap()
    }

    #[test]
    fn test_controls_visibility() {
        let collection = PostCollection::new();
        let item = PostItem::new(seed(&collection));

        assert!(item.owner_controls_visible(&owner()));
        assert!(!item.owner_controls_visible(&stranger()));
        assert!(!item.owner_controls_visible(&Session::anonymous()));
        assert!(!item.editor_controls_visible());
    }

    #[test]
    fn test_begin_edit_owner_only() {
        let collection = PostCollection::new();
        let mut item = PostItem::new(seed(&collection));

        assert!(!item.begin_edit(&stranger()));
        assert!(!item.is_editing());

        assert!(item.begin_edit(&owner()));
        assert!(item.is_editing());
        assert!(item.editor_controls_visible());
    }

    #[test]
    fn test_stage_media_requires_editing() {
        let collection = PostCollection::new();
        let mut item = PostItem::new(seed(&collection));

        let staged = StagedMedia {
            content: b"img".to_vec(),
            kind: MediaKind::Photo,
        };
        assert!(!item.stage_media(staged.clone()));

        item.begin_edit(&owner());
        assert!(item.stage_media(staged));
        assert!(item.staged_media().is_some());
    }

    #[test]
    fn test_cancel_discards_staged_media() {
        let collection = PostCollection::new();
        let mut item = PostItem::new(seed(&collection));

        item.begin_edit(&owner());
        item.stage_media(StagedMedia {
            content: b"img".to_vec(),
            kind: MediaKind::Photo,
        });
        item.cancel_edit();

        assert!(!item.is_editing());
        assert!(item.staged_media().is_none());

        // Staging does not survive re-entering edit mode either.
        item.begin_edit(&owner());
        assert!(item.staged_media().is_none());
    }
}

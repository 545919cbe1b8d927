//! Reconciliation sweep for orphaned media blobs.

use feedline::{
    sweep_orphaned_media, BlobPath, FeedError, MediaStorage, PostCollection, PostDraft, PostId,
    PrincipalId, SweepReport,
};
use tempfile::TempDir;

fn seed_post_with_blob(collection: &PostCollection, media: &MediaStorage) -> BlobPath {
    let post = collection
        .insert(PostDraft::text(PrincipalId::new("alice"), "Alice", "hi"))
        .unwrap();
    let path = BlobPath::new(post.author_id.clone(), post.id.clone());
    media.store(&path, b"bytes").unwrap();
    path
}

#[test]
fn test_sweep_removes_orphan_keeps_live_blob() {
    let dir = TempDir::new().unwrap();
    let collection = PostCollection::new();
    let media = MediaStorage::new(dir.path().join("media")).unwrap();

    let live = seed_post_with_blob(&collection, &media);
    let orphaned = seed_post_with_blob(&collection, &media);

    // Record deleted, blob left behind: the accepted cascade failure mode.
    collection.delete(&orphaned.post).unwrap();

    let report = sweep_orphaned_media(&collection, &media).unwrap();

    assert_eq!(
        report,
        SweepReport {
            scanned: 2,
            removed: 1
        }
    );
    assert!(media.exists(&live));
    assert!(!media.exists(&orphaned));
}

#[test]
fn test_sweep_on_empty_storage() {
    let dir = TempDir::new().unwrap();
    let collection = PostCollection::new();
    let media = MediaStorage::new(dir.path().join("media")).unwrap();

    let report = sweep_orphaned_media(&collection, &media).unwrap();
    assert_eq!(report, SweepReport::default());
}

#[test]
fn test_sweep_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let collection = PostCollection::new();
    let media = MediaStorage::new(dir.path().join("media")).unwrap();

    let orphan = BlobPath::new(PrincipalId::new("alice"), PostId("gone".into()));
    media.store(&orphan, b"bytes").unwrap();

    let first = sweep_orphaned_media(&collection, &media).unwrap();
    assert_eq!(first.removed, 1);

    let second = sweep_orphaned_media(&collection, &media).unwrap();
    assert_eq!(second, SweepReport::default());
}

#[test]
fn test_sweep_against_closed_store_errors() {
    let dir = TempDir::new().unwrap();
    let collection = PostCollection::new();
    let media = MediaStorage::new(dir.path().join("media")).unwrap();

    let orphan = BlobPath::new(PrincipalId::new("alice"), PostId("gone".into()));
    media.store(&orphan, b"bytes").unwrap();
    collection.close();

    let err = sweep_orphaned_media(&collection, &media).unwrap_err();
    assert!(matches!(err, FeedError::StoreClosed));
    assert!(media.exists(&orphan));
}

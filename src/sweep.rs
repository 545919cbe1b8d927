//! Reconciliation sweep for orphaned media blobs.
//!
//! The delete cascade removes the record before the blob, so a failure in
//! between leaves a blob with no matching record. Running this sweep
//! periodically cleans those up; cross-store atomicity is deliberately not
//! attempted.

use crate::blobs::MediaStorage;
use crate::error::Result;
use crate::store::PostCollection;
use tracing::{debug, info};

/// Outcome of one sweep pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Blobs examined.
    pub scanned: usize,
    /// Orphans removed.
    pub removed: usize,
}

/// Remove every media blob whose post no longer exists.
///
/// A blob observed mid-delete may be removed here instead of by the cascade;
/// both paths are idempotent so the race is harmless.
pub fn sweep_orphaned_media(
    collection: &PostCollection,
    media: &MediaStorage,
) -> Result<SweepReport> {
    let mut report = SweepReport::default();

    for path in media.list()? {
        report.scanned += 1;

        if collection.fetch(&path.post)?.is_some() {
            continue;
        }

        if media.remove(&path)? {
            debug!(blob = %path, "removed orphaned media blob");
            report.removed += 1;
        }
    }

    if report.removed > 0 {
        info!(
            scanned = report.scanned,
            removed = report.removed,
            "media sweep removed orphans"
        );
    }

    Ok(report)
}

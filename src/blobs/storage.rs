//! Media blob storage implementation.

use crate::error::{FeedError, Result};
use crate::types::{BlobPath, PostId, PrincipalId};
use fs2::FileExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the exclusive lock file at the media root.
const LOCK_FILE: &str = ".lock";

/// Path-addressed blob storage for post media.
///
/// One blob per post, at the deterministic path `posts/{owner}/{post}`.
/// Storing to an occupied path overwrites it (media replacement reuses the
/// same location).
pub struct MediaStorage {
    /// Base directory for media.
    root: PathBuf,

    /// Lock file for exclusive access.
    _lock_file: File,
}

impl MediaStorage {
    /// Create or open media storage at the given root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let lock_file = File::create(root.join(LOCK_FILE))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| FeedError::Locked)?;

        Ok(Self {
            root,
            _lock_file: lock_file,
        })
    }

    /// Store a blob, returning its resolved location.
    pub fn store(&self, path: &BlobPath, content: &[u8]) -> Result<String> {
        let file_path = self.file_path(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(&file_path)?;
        file.write_all(content)?;
        file.sync_all()?;

        Ok(Self::location(path))
    }

    /// Read a blob's content, or `None` if absent.
    pub fn read(&self, path: &BlobPath) -> Result<Option<Vec<u8>>> {
        let file_path = self.file_path(path);
        if !file_path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&file_path)?))
    }

    /// Check whether a blob exists.
    pub fn exists(&self, path: &BlobPath) -> bool {
        self.file_path(path).exists()
    }

    /// Remove a blob. Returns false if it was absent.
    pub fn remove(&self, path: &BlobPath) -> Result<bool> {
        let file_path = self.file_path(path);
        if file_path.exists() {
            fs::remove_file(&file_path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// List every stored blob path (for the reconciliation sweep).
    pub fn list(&self) -> Result<Vec<BlobPath>> {
        let mut paths = Vec::new();

        let posts_dir = self.root.join("posts");
        if !posts_dir.exists() {
            return Ok(paths);
        }

        for owner_entry in fs::read_dir(&posts_dir)? {
            let owner_entry = owner_entry?;
            if !owner_entry.file_type()?.is_dir() {
                continue;
            }
            let owner = PrincipalId::new(owner_entry.file_name().to_string_lossy().into_owned());

            for blob_entry in fs::read_dir(owner_entry.path())? {
                let blob_entry = blob_entry?;
                if blob_entry.file_type()?.is_file() {
                    let post = PostId(blob_entry.file_name().to_string_lossy().into_owned());
                    paths.push(BlobPath::new(owner.clone(), post));
                }
            }
        }

        Ok(paths)
    }

    /// Resolved location string for a blob path, suitable for a post's
    /// `photo_url`/`video_url` field.
    pub fn location(path: &BlobPath) -> String {
        format!("media://{path}")
    }

    fn file_path(&self, path: &BlobPath) -> PathBuf {
        self.root.join(path.relative())
    }
}

//! Path-addressed media blob storage.
//!
//! Blobs live at deterministic paths keyed by `(owner, post)`, so the
//! delete cascade and the reconciliation sweep can find a post's media
//! without consulting the record.

mod storage;

pub use storage::MediaStorage;

//! Document store for posts.
//!
//! The feed core treats the post collection as an external collaborator; the
//! implementation here is an in-process reference honoring its contract:
//! strongly-consistent point reads and writes, plus live window queries.

mod collection;

pub use collection::PostCollection;

//! Repository boundaries for the catalog revision service.
//!
//! The revision engine talks to storage through three traits, one per
//! record kind:
//!
//! - [`BucketRepository`] -- resolves buckets (lookup only)
//! - [`CatalogObjectRepository`] -- objects and their most-recent-revision view
//! - [`RevisionRepository`] -- individual immutable revisions
//!
//! # Storage Backends
//!
//! - [`InMemoryCatalogStore`] -- `BTreeMap`-based store implementing all three
//!   traits, with JSON [`CatalogSnapshot`] persistence
//!
//! # Design Rules
//!
//! 1. Revisions are immutable once written.
//! 2. `(object, revision)` is unique; a revision id is never issued twice.
//! 3. An object record exists exactly while it holds at least one revision.
//! 4. `last_revision_id` is a materialized view maintained by the store.
//! 5. All errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryCatalogStore;
pub use snapshot::CatalogSnapshot;
pub use traits::{BucketRepository, CatalogObjectRepository, RevisionRepository};

//! Foundation types for the catalog revision service.
//!
//! This crate provides the identifiers and records shared by the store and
//! the revision engine. Every other catalog crate depends on `catalog-types`.
//!
//! # Key Types
//!
//! - [`BucketId`], [`CatalogObjectId`], [`RevisionId`] -- numeric identifiers
//! - [`Bucket`] -- namespace grouping catalog objects
//! - [`CatalogObject`] -- versioned artifact with its revision id set
//! - [`CatalogObjectRevision`] -- one immutable version of an object
//! - [`CatalogObjectMetadata`] -- payload-free view of a revision
//! - [`Page`] / [`PageRequest`] -- paged listing
//! - [`RevisionPredicate`] -- filter applied before paging

pub mod error;
pub mod identity;
pub mod object;
pub mod page;
pub mod revision;

pub use error::TypeError;
pub use identity::{BucketId, CatalogObjectId, RevisionId};
pub use object::{Bucket, CatalogObject};
pub use page::{AcceptAll, Page, PageRequest, RevisionPredicate};
pub use revision::{CatalogObjectMetadata, CatalogObjectRevision, KeyValueMetadata, MetadataLabel};

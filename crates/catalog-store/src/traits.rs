use catalog_types::{
    Bucket, BucketId, CatalogObject, CatalogObjectId, CatalogObjectRevision, Page, PageRequest,
    RevisionId, RevisionPredicate,
};

use crate::error::StoreResult;

/// Read-only directory of buckets.
///
/// Buckets are managed outside the revision engine; this boundary only
/// resolves them.
pub trait BucketRepository: Send + Sync {
    /// Look up a bucket by id.
    ///
    /// Returns `Ok(None)` if the bucket does not exist.
    fn find_bucket(&self, id: BucketId) -> StoreResult<Option<Bucket>>;

    /// All known buckets, ordered by id.
    fn list_buckets(&self) -> StoreResult<Vec<Bucket>>;
}

/// Storage of catalog objects and their most-recent-revision view.
///
/// All implementations must satisfy these invariants:
/// - An object record exists only while it holds at least one revision.
/// - `last_revision_id` always names the highest revision currently stored.
/// - `delete_object` removes the object and all of its revisions as one
///   atomic step; a second delete of the same object fails with
///   `ObjectNotFound`.
pub trait CatalogObjectRepository: Send + Sync {
    /// Look up an object by id.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn find_object(&self, id: CatalogObjectId) -> StoreResult<Option<CatalogObject>>;

    /// The highest stored revision of an object inside a bucket.
    ///
    /// Returns `Ok(None)` if the object is unknown, belongs to another
    /// bucket, or holds no revision.
    fn most_recent_revision(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
    ) -> StoreResult<Option<CatalogObjectRevision>>;

    /// Exactly one revision (the most recent) per object of the bucket,
    /// ordered by object id. `filter` is applied before paging.
    fn most_recent_revisions(
        &self,
        bucket_id: BucketId,
        filter: &dyn RevisionPredicate,
        page: &PageRequest,
    ) -> StoreResult<Page<CatalogObjectRevision>>;

    /// Reserve a fresh object id.
    ///
    /// Reserving an id creates no record; the object comes into existence
    /// when its first revision is saved.
    fn allocate_object_id(&self) -> StoreResult<CatalogObjectId>;

    /// Remove an object and every revision it holds. Returns the removed
    /// object record.
    fn delete_object(&self, id: CatalogObjectId) -> StoreResult<CatalogObject>;

    /// Remove an object only if `revision_id` is its sole revision, checked
    /// and applied as one atomic step.
    ///
    /// Returns `Ok(None)` when the object holds other revisions by now, so
    /// the caller can delete the single revision instead.
    fn delete_object_if_last(
        &self,
        id: CatalogObjectId,
        revision_id: RevisionId,
    ) -> StoreResult<Option<CatalogObject>>;
}

/// Storage of individual immutable revisions.
pub trait RevisionRepository: Send + Sync {
    /// Point lookup by `(bucket, object, revision)`.
    ///
    /// Returns `Ok(None)` if no such triple exists.
    fn find_revision(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
        revision_id: RevisionId,
    ) -> StoreResult<Option<CatalogObjectRevision>>;

    /// Revision history of one object, newest first. `filter` is applied
    /// before paging.
    fn revisions(
        &self,
        object_id: CatalogObjectId,
        filter: &dyn RevisionPredicate,
        page: &PageRequest,
    ) -> StoreResult<Page<CatalogObjectRevision>>;

    /// Persist a new revision.
    ///
    /// When the owning object has no record yet, it is created in the same
    /// atomic step, provided its id was reserved with
    /// [`CatalogObjectRepository::allocate_object_id`] and not used since.
    /// Any other unknown object id (including one whose object was deleted)
    /// fails with `ObjectNotFound`. Fails with `DuplicateRevision` if the
    /// revision id was already issued for the object.
    fn save(&self, revision: CatalogObjectRevision) -> StoreResult<CatalogObjectRevision>;

    /// Remove a single revision and recompute the owner's
    /// `last_revision_id`. Returns the updated object.
    ///
    /// Fails with `LastRevision` when the revision is the object's only one;
    /// use [`CatalogObjectRepository::delete_object`] instead.
    fn delete_revision(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
        revision_id: RevisionId,
    ) -> StoreResult<CatalogObject>;
}

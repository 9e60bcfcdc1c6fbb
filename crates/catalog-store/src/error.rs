use catalog_types::{BucketId, CatalogObjectId, RevisionId};

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A revision referenced a bucket that does not exist.
    #[error("bucket not found: {0}")]
    BucketNotFound(BucketId),

    /// The catalog object has no record (never created, or already deleted).
    #[error("catalog object not found: {0}")]
    ObjectNotFound(CatalogObjectId),

    /// The object exists but does not hold this revision.
    #[error("revision {revision} not found for catalog object {object}")]
    RevisionNotFound {
        object: CatalogObjectId,
        revision: RevisionId,
    },

    /// The revision id was already issued for this object.
    #[error("revision {revision} already issued for catalog object {object}")]
    DuplicateRevision {
        object: CatalogObjectId,
        revision: RevisionId,
    },

    /// The object lives in a different bucket than the one addressed.
    #[error("catalog object {object} belongs to bucket {actual}, not {expected}")]
    BucketMismatch {
        object: CatalogObjectId,
        expected: BucketId,
        actual: BucketId,
    },

    /// Removing this revision would leave the object without revisions.
    #[error("revision {revision} is the only revision of catalog object {object}")]
    LastRevision {
        object: CatalogObjectId,
        revision: RevisionId,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

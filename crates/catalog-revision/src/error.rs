use catalog_store::StoreError;
use catalog_types::{BucketId, CatalogObjectId, RevisionId, TypeError};

/// The uploaded payload could not be turned into catalog metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("payload is missing required field `{0}`")]
    MissingField(&'static str),
}

/// A filter expression could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid query expression at position {position}: {reason}")]
pub struct QueryError {
    pub position: usize,
    pub reason: String,
}

impl QueryError {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

/// A payload representation could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepresentationError {
    #[error("unsupported representation: {0}")]
    UnsupportedFormat(String),

    #[error("conversion to {format} failed: {reason}")]
    Conversion { format: String, reason: String },
}

/// Errors produced by the revision lifecycle engine.
///
/// Every variant is reported to the caller as-is; lookups never degrade to
/// empty results.
#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    #[error("bucket not found: {0}")]
    BucketNotFound(BucketId),

    #[error("catalog object not found: {0}")]
    ObjectNotFound(CatalogObjectId),

    #[error("no matching revision for catalog object {object} (requested: {requested:?})")]
    RevisionNotFound {
        object: CatalogObjectId,
        requested: Option<RevisionId>,
    },

    #[error("revision {revision} of catalog object {object} was created concurrently")]
    DuplicateRevision {
        object: CatalogObjectId,
        revision: RevisionId,
    },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("query expression error: {0}")]
    QueryExpression(#[from] QueryError),

    #[error("representation error: {0}")]
    Representation(#[from] RepresentationError),

    #[error("invalid page request: {0}")]
    InvalidPage(String),

    #[error("invalid {kind} identifier: {input:?}")]
    InvalidId { kind: &'static str, input: String },

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RevisionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BucketNotFound(id) => RevisionError::BucketNotFound(id),
            StoreError::ObjectNotFound(id) => RevisionError::ObjectNotFound(id),
            StoreError::BucketMismatch { object, .. } => RevisionError::ObjectNotFound(object),
            StoreError::RevisionNotFound { object, revision } => RevisionError::RevisionNotFound {
                object,
                requested: Some(revision),
            },
            StoreError::DuplicateRevision { object, revision } => {
                RevisionError::DuplicateRevision { object, revision }
            }
            other => RevisionError::Store(other),
        }
    }
}

impl From<TypeError> for RevisionError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidPage(reason) => RevisionError::InvalidPage(reason),
            TypeError::InvalidId { kind, input } => RevisionError::InvalidId { kind, input },
        }
    }
}

/// Result alias for engine operations.
pub type RevisionResult<T> = Result<T, RevisionError>;

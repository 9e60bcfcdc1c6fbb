use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identity::{BucketId, CatalogObjectId, RevisionId};

/// A namespace grouping catalog objects.
///
/// Buckets are looked up by the revision engine, never created or removed by it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: BucketId,
    pub name: String,
    pub owner: String,
}

impl Bucket {
    pub fn new(id: BucketId, name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            owner: owner.into(),
        }
    }
}

/// A versioned artifact living in exactly one bucket.
///
/// The object tracks the ids of its revisions rather than the revisions
/// themselves; revision content lives in the revision store.
///
/// Two derived values are kept alongside the id set:
/// - `last_revision_id` is the most recent revision currently stored. The
///   store recomputes it whenever a revision is removed.
/// - `revision_high_water` is the highest revision id ever issued for the
///   object. It never decreases, so deleted ids are never handed out again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogObject {
    pub id: CatalogObjectId,
    pub bucket_id: BucketId,
    pub revision_ids: BTreeSet<RevisionId>,
    pub last_revision_id: RevisionId,
    pub revision_high_water: RevisionId,
}

impl CatalogObject {
    /// A fresh object holding a single revision.
    pub fn with_first_revision(
        id: CatalogObjectId,
        bucket_id: BucketId,
        revision_id: RevisionId,
    ) -> Self {
        Self {
            id,
            bucket_id,
            revision_ids: BTreeSet::from([revision_id]),
            last_revision_id: revision_id,
            revision_high_water: revision_id,
        }
    }

    pub fn revision_count(&self) -> usize {
        self.revision_ids.len()
    }

    pub fn has_single_revision(&self) -> bool {
        self.revision_ids.len() == 1
    }

    pub fn contains_revision(&self, revision_id: RevisionId) -> bool {
        self.revision_ids.contains(&revision_id)
    }

    /// The id the next created revision receives.
    pub fn next_revision_id(&self) -> RevisionId {
        self.revision_high_water.next()
    }

    /// Record a newly saved revision.
    pub fn attach_revision(&mut self, revision_id: RevisionId) {
        self.revision_ids.insert(revision_id);
        if revision_id > self.revision_high_water {
            self.revision_high_water = revision_id;
        }
        if revision_id > self.last_revision_id {
            self.last_revision_id = revision_id;
        }
    }

    /// Forget a removed revision and recompute `last_revision_id`.
    ///
    /// Returns `false` when the id was not part of this object. Callers must
    /// not detach the final revision; the object has to be removed instead.
    pub fn detach_revision(&mut self, revision_id: RevisionId) -> bool {
        if !self.revision_ids.remove(&revision_id) {
            return false;
        }
        if let Some(max) = self.revision_ids.last() {
            self.last_revision_id = *max;
        }
        true
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use catalog_types::{
    Bucket, BucketId, CatalogObject, CatalogObjectId, CatalogObjectRevision, Page, PageRequest,
    RevisionId, RevisionPredicate,
};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::snapshot::CatalogSnapshot;
use crate::traits::{BucketRepository, CatalogObjectRepository, RevisionRepository};

type RevisionKey = (CatalogObjectId, RevisionId);

/// In-memory, BTreeMap-based catalog store.
///
/// Implements all three repository boundaries over one shared state behind a
/// single `RwLock`, so every repository call is atomic: a first revision and
/// its object record appear together, and a cascading object delete removes
/// the record and its revisions in one step.
///
/// Revisions are keyed by `(object, revision)`, which keeps each object's
/// history contiguous and makes "most recent" an O(log n) range lookup.
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

#[derive(Default)]
pub(crate) struct CatalogState {
    pub(crate) buckets: BTreeMap<BucketId, Bucket>,
    pub(crate) objects: BTreeMap<CatalogObjectId, CatalogObject>,
    pub(crate) revisions: BTreeMap<RevisionKey, CatalogObjectRevision>,
    pub(crate) next_object_id: u64,
    /// Ids handed out by `allocate_object_id` whose first revision has not
    /// been saved yet. Not persisted in snapshots.
    pub(crate) reserved: BTreeSet<CatalogObjectId>,
}

impl CatalogState {
    fn history_range(
        &self,
        object_id: CatalogObjectId,
    ) -> std::collections::btree_map::Range<'_, RevisionKey, CatalogObjectRevision> {
        self.revisions
            .range((object_id, RevisionId::new(0))..=(object_id, RevisionId::new(u64::MAX)))
    }

    fn latest(&self, object_id: CatalogObjectId) -> Option<&CatalogObjectRevision> {
        self.history_range(object_id).next_back().map(|(_, rev)| rev)
    }
}

impl InMemoryCatalogStore {
    /// Create a new empty store. Object ids start at 1.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CatalogState {
                next_object_id: 1,
                ..CatalogState::default()
            }),
        }
    }

    /// Create a store pre-populated with the given buckets.
    pub fn with_buckets(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.write() {
            for bucket in buckets {
                state.buckets.insert(bucket.id, bucket);
            }
        }
        store
    }

    /// Register a bucket. Bucket management lives outside the revision
    /// engine; this exists for seeding and tests.
    pub fn insert_bucket(&self, bucket: Bucket) -> StoreResult<()> {
        let mut state = self.write()?;
        state.buckets.insert(bucket.id, bucket);
        Ok(())
    }

    /// Number of catalog objects currently stored.
    pub fn object_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.objects.len())
    }

    /// Number of revisions currently stored, across all objects.
    pub fn revision_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.revisions.len())
    }

    /// Capture the full store contents.
    pub fn snapshot(&self) -> StoreResult<CatalogSnapshot> {
        let state = self.read()?;
        Ok(CatalogSnapshot {
            buckets: state.buckets.values().cloned().collect(),
            objects: state.objects.values().cloned().collect(),
            revisions: state.revisions.values().cloned().collect(),
            next_object_id: state.next_object_id,
        })
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> StoreResult<Self> {
        let mut state = CatalogState {
            next_object_id: snapshot.next_object_id.max(1),
            ..CatalogState::default()
        };
        for bucket in snapshot.buckets {
            state.buckets.insert(bucket.id, bucket);
        }
        for object in snapshot.objects {
            if object.revision_ids.is_empty() {
                return Err(StoreError::Serialization(format!(
                    "catalog object {} has no revisions",
                    object.id
                )));
            }
            state.next_object_id = state.next_object_id.max(object.id.get() + 1);
            state.objects.insert(object.id, object);
        }
        for revision in snapshot.revisions {
            let owner = state
                .objects
                .get(&revision.object_id)
                .ok_or(StoreError::ObjectNotFound(revision.object_id))?;
            if !owner.contains_revision(revision.revision_id) {
                return Err(StoreError::Serialization(format!(
                    "revision {} is not listed by catalog object {}",
                    revision.revision_id, revision.object_id
                )));
            }
            state
                .revisions
                .insert((revision.object_id, revision.revision_id), revision);
        }
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, CatalogState>> {
        self.state
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, CatalogState>> {
        self.state
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketRepository for InMemoryCatalogStore {
    fn find_bucket(&self, id: BucketId) -> StoreResult<Option<Bucket>> {
        Ok(self.read()?.buckets.get(&id).cloned())
    }

    fn list_buckets(&self) -> StoreResult<Vec<Bucket>> {
        Ok(self.read()?.buckets.values().cloned().collect())
    }
}

impl CatalogObjectRepository for InMemoryCatalogStore {
    fn find_object(&self, id: CatalogObjectId) -> StoreResult<Option<CatalogObject>> {
        Ok(self.read()?.objects.get(&id).cloned())
    }

    fn most_recent_revision(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
    ) -> StoreResult<Option<CatalogObjectRevision>> {
        let state = self.read()?;
        match state.objects.get(&object_id) {
            Some(object) if object.bucket_id == bucket_id => Ok(state.latest(object_id).cloned()),
            _ => Ok(None),
        }
    }

    fn most_recent_revisions(
        &self,
        bucket_id: BucketId,
        filter: &dyn RevisionPredicate,
        page: &PageRequest,
    ) -> StoreResult<Page<CatalogObjectRevision>> {
        let state = self.read()?;
        let latest = state
            .objects
            .values()
            .filter(|object| object.bucket_id == bucket_id)
            .filter_map(|object| state.latest(object.id))
            .filter(|rev| filter.matches(rev))
            .cloned();
        Ok(Page::paginate(latest, page))
    }

    fn allocate_object_id(&self) -> StoreResult<CatalogObjectId> {
        let mut state = self.write()?;
        let id = CatalogObjectId::new(state.next_object_id);
        state.next_object_id += 1;
        state.reserved.insert(id);
        Ok(id)
    }

    fn delete_object(&self, id: CatalogObjectId) -> StoreResult<CatalogObject> {
        let mut state = self.write()?;
        let object = state
            .objects
            .remove(&id)
            .ok_or(StoreError::ObjectNotFound(id))?;
        for revision_id in &object.revision_ids {
            state.revisions.remove(&(id, *revision_id));
        }
        debug!(object = %id, revisions = object.revision_count(), "catalog object removed");
        Ok(object)
    }

    fn delete_object_if_last(
        &self,
        id: CatalogObjectId,
        revision_id: RevisionId,
    ) -> StoreResult<Option<CatalogObject>> {
        let mut state = self.write()?;
        let object = state.objects.get(&id).ok_or(StoreError::ObjectNotFound(id))?;
        if !object.contains_revision(revision_id) {
            return Err(StoreError::RevisionNotFound {
                object: id,
                revision: revision_id,
            });
        }
        if !object.has_single_revision() {
            debug!(object = %id, revisions = object.revision_count(), "object still holds other revisions");
            return Ok(None);
        }
        let removed = state.objects.remove(&id);
        state.revisions.remove(&(id, revision_id));
        debug!(object = %id, revision = %revision_id, "catalog object removed with its last revision");
        Ok(removed)
    }
}

impl RevisionRepository for InMemoryCatalogStore {
    fn find_revision(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
        revision_id: RevisionId,
    ) -> StoreResult<Option<CatalogObjectRevision>> {
        let state = self.read()?;
        Ok(state
            .revisions
            .get(&(object_id, revision_id))
            .filter(|rev| rev.bucket_id == bucket_id)
            .cloned())
    }

    fn revisions(
        &self,
        object_id: CatalogObjectId,
        filter: &dyn RevisionPredicate,
        page: &PageRequest,
    ) -> StoreResult<Page<CatalogObjectRevision>> {
        let state = self.read()?;
        let history = state
            .history_range(object_id)
            .rev()
            .map(|(_, rev)| rev)
            .filter(|rev| filter.matches(rev))
            .cloned();
        Ok(Page::paginate(history, page))
    }

    fn save(&self, revision: CatalogObjectRevision) -> StoreResult<CatalogObjectRevision> {
        let mut state = self.write()?;
        let key = (revision.object_id, revision.revision_id);
        let duplicate = StoreError::DuplicateRevision {
            object: revision.object_id,
            revision: revision.revision_id,
        };

        match state.objects.get_mut(&revision.object_id) {
            Some(object) => {
                if object.bucket_id != revision.bucket_id {
                    return Err(StoreError::BucketMismatch {
                        object: object.id,
                        expected: revision.bucket_id,
                        actual: object.bucket_id,
                    });
                }
                // Ids at or below the high water mark were issued before,
                // even if the revision has since been deleted.
                if revision.revision_id <= object.revision_high_water {
                    return Err(duplicate);
                }
                object.attach_revision(revision.revision_id);
            }
            None => {
                if !state.buckets.contains_key(&revision.bucket_id) {
                    return Err(StoreError::BucketNotFound(revision.bucket_id));
                }
                // Only a reserved id may gain a record here. A deleted object
                // stays deleted even if a writer still holds its id.
                if !state.reserved.remove(&revision.object_id) {
                    return Err(StoreError::ObjectNotFound(revision.object_id));
                }
                let object = CatalogObject::with_first_revision(
                    revision.object_id,
                    revision.bucket_id,
                    revision.revision_id,
                );
                state.objects.insert(object.id, object);
            }
        }

        state.revisions.insert(key, revision.clone());
        debug!(
            object = %revision.object_id,
            revision = %revision.revision_id,
            "revision stored"
        );
        Ok(revision)
    }

    fn delete_revision(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
        revision_id: RevisionId,
    ) -> StoreResult<CatalogObject> {
        let mut state = self.write()?;
        let object = state
            .objects
            .get_mut(&object_id)
            .ok_or(StoreError::ObjectNotFound(object_id))?;
        if object.bucket_id != bucket_id {
            return Err(StoreError::BucketMismatch {
                object: object_id,
                expected: bucket_id,
                actual: object.bucket_id,
            });
        }
        if !object.contains_revision(revision_id) {
            return Err(StoreError::RevisionNotFound {
                object: object_id,
                revision: revision_id,
            });
        }
        if object.has_single_revision() {
            return Err(StoreError::LastRevision {
                object: object_id,
                revision: revision_id,
            });
        }

        object.detach_revision(revision_id);
        let updated = object.clone();
        state.revisions.remove(&(object_id, revision_id));
        debug!(
            object = %object_id,
            revision = %revision_id,
            last_revision = %updated.last_revision_id,
            "revision removed"
        );
        Ok(updated)
    }
}

impl std::fmt::Debug for InMemoryCatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("InMemoryCatalogStore");
        if let Ok(state) = self.state.read() {
            out.field("bucket_count", &state.buckets.len())
                .field("object_count", &state.objects.len())
                .field("revision_count", &state.revisions.len());
        }
        out.finish()
    }
}

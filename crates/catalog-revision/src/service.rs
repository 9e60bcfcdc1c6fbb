use std::sync::Arc;

use catalog_store::{
    BucketRepository, CatalogObjectRepository, RevisionRepository, StoreError,
};
use catalog_types::{
    AcceptAll, Bucket, BucketId, CatalogObject, CatalogObjectId, CatalogObjectMetadata,
    CatalogObjectRevision, Page, PageRequest, RevisionId, RevisionPredicate,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{BatchMissPolicy, ServiceConfig};
use crate::error::{RevisionError, RevisionResult};
use crate::parser::{AutoPayloadParser, ParsedCatalogObject};
use crate::query::ExpressionQueryEvaluator;
use crate::representation::DefaultRepresentationConverter;
use crate::traits::{PayloadParser, QueryEvaluator, RepresentationConverter};

/// What a delete request removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    /// A single revision was removed; the object survives.
    RevisionDeleted {
        object_id: CatalogObjectId,
        revision_id: RevisionId,
        last_revision_id: RevisionId,
    },
    /// The object's only revision was targeted, so the whole object went.
    ObjectDeleted {
        object_id: CatalogObjectId,
        revision_id: RevisionId,
    },
}

/// The revision lifecycle engine.
///
/// Stateless business logic over three repositories and three payload
/// collaborators, all injected at construction. Existence checks always run
/// in the order bucket, object, revision, so the most specific applicable
/// error is the first one raised.
pub struct RevisionService {
    buckets: Arc<dyn BucketRepository>,
    objects: Arc<dyn CatalogObjectRepository>,
    revisions: Arc<dyn RevisionRepository>,
    parser: Arc<dyn PayloadParser>,
    query: Arc<dyn QueryEvaluator>,
    converter: Arc<dyn RepresentationConverter>,
    config: ServiceConfig,
}

impl RevisionService {
    /// Build a service with the default collaborators and configuration.
    pub fn new(
        buckets: Arc<dyn BucketRepository>,
        objects: Arc<dyn CatalogObjectRepository>,
        revisions: Arc<dyn RevisionRepository>,
    ) -> Self {
        Self {
            buckets,
            objects,
            revisions,
            parser: Arc::new(AutoPayloadParser),
            query: Arc::new(ExpressionQueryEvaluator),
            converter: Arc::new(DefaultRepresentationConverter),
            config: ServiceConfig::default(),
        }
    }

    /// Build a service over one backend implementing all three repositories.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: BucketRepository + CatalogObjectRepository + RevisionRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    pub fn with_parser(mut self, parser: Arc<dyn PayloadParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_query_evaluator(mut self, query: Arc<dyn QueryEvaluator>) -> Self {
        self.query = query;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn RepresentationConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ---- Lookups ----

    pub fn find_bucket(&self, bucket_id: BucketId) -> RevisionResult<Bucket> {
        self.buckets
            .find_bucket(bucket_id)?
            .ok_or(RevisionError::BucketNotFound(bucket_id))
    }

    pub fn find_object(&self, object_id: CatalogObjectId) -> RevisionResult<CatalogObject> {
        self.objects
            .find_object(object_id)?
            .ok_or(RevisionError::ObjectNotFound(object_id))
    }

    /// Resolve an object that must live in `bucket_id`. An object from
    /// another bucket is reported as missing.
    fn find_object_in(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
    ) -> RevisionResult<CatalogObject> {
        let object = self.find_object(object_id)?;
        if object.bucket_id != bucket_id {
            debug!(object = %object_id, bucket = %bucket_id, owner = %object.bucket_id, "object addressed through foreign bucket");
            return Err(RevisionError::ObjectNotFound(object_id));
        }
        Ok(object)
    }

    fn most_recent_revision(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
    ) -> RevisionResult<CatalogObjectRevision> {
        self.objects
            .most_recent_revision(bucket_id, object_id)?
            .ok_or(RevisionError::RevisionNotFound {
                object: object_id,
                requested: None,
            })
    }

    // ---- Creation ----

    /// Append a revision built from already parsed metadata.
    ///
    /// Without `object_id` a new object is allocated in the bucket and the
    /// revision gets the configured initial id. With `object_id` the revision
    /// is appended after the highest id ever issued for that object.
    pub fn create_revision(
        &self,
        bucket_id: BucketId,
        object_id: Option<CatalogObjectId>,
        parsed: ParsedCatalogObject,
        layout: Option<String>,
        raw: Vec<u8>,
    ) -> RevisionResult<CatalogObjectMetadata> {
        self.find_bucket(bucket_id)?;
        self.append_revision(bucket_id, object_id, parsed, layout, raw)
    }

    /// Parse an uploaded payload and append it as a new revision.
    pub fn create_revision_from_payload(
        &self,
        bucket_id: BucketId,
        object_id: Option<CatalogObjectId>,
        raw: Vec<u8>,
        layout: Option<String>,
    ) -> RevisionResult<CatalogObjectMetadata> {
        self.find_bucket(bucket_id)?;
        let parsed = self.parser.parse(&raw)?;
        self.append_revision(bucket_id, object_id, parsed, layout, raw)
    }

    /// Creation after the bucket check.
    fn append_revision(
        &self,
        bucket_id: BucketId,
        object_id: Option<CatalogObjectId>,
        parsed: ParsedCatalogObject,
        layout: Option<String>,
        raw: Vec<u8>,
    ) -> RevisionResult<CatalogObjectMetadata> {
        let (object_id, revision_id) = match object_id {
            None => (
                self.objects.allocate_object_id()?,
                self.config.initial_revision_id,
            ),
            Some(id) => {
                let object = self.find_object_in(bucket_id, id)?;
                (id, object.next_revision_id())
            }
        };

        let revision = CatalogObjectRevision {
            kind: parsed.kind,
            bucket_id,
            object_id,
            revision_id,
            name: parsed.name,
            project_name: parsed.project_name,
            created_at: Utc::now(),
            layout,
            key_values: parsed.key_values,
            payload: raw,
        };

        let saved = self.revisions.save(revision).map_err(|err| {
            if let StoreError::DuplicateRevision { object, revision } = &err {
                warn!(%object, %revision, "revision id allocated concurrently");
            }
            RevisionError::from(err)
        })?;

        info!(
            bucket = %bucket_id,
            object = %saved.object_id,
            revision = %saved.revision_id,
            name = %saved.name,
            "revision created"
        );
        Ok(saved.metadata())
    }

    // ---- Retrieval ----

    /// Fetch one revision: the requested one, or the most recent.
    ///
    /// `representation` only changes the payload of the returned copy.
    pub fn get_object(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
        revision_id: Option<RevisionId>,
        representation: Option<&str>,
    ) -> RevisionResult<CatalogObjectRevision> {
        self.find_bucket(bucket_id)?;
        self.find_object_in(bucket_id, object_id)?;

        let mut revision = match revision_id {
            Some(id) => self
                .revisions
                .find_revision(bucket_id, object_id, id)?
                .ok_or(RevisionError::RevisionNotFound {
                    object: object_id,
                    requested: Some(id),
                })?,
            None => self.most_recent_revision(bucket_id, object_id)?,
        };
        debug!(object = %object_id, revision = %revision.revision_id, "revision resolved");

        if let Some(format) = representation {
            revision.payload = self.converter.convert(&revision, format)?;
        }
        Ok(revision)
    }

    /// List revisions of a bucket.
    ///
    /// With `object_id` this is the object's history, newest first. Without
    /// it, the most recent revision of every object in the bucket.
    pub fn list_objects(
        &self,
        bucket_id: BucketId,
        object_id: Option<CatalogObjectId>,
        filter: Option<&str>,
        page: &PageRequest,
    ) -> RevisionResult<Page<CatalogObjectRevision>> {
        page.validate(self.config.max_page_size)?;
        self.find_bucket(bucket_id)?;
        if let Some(id) = object_id {
            self.find_object_in(bucket_id, id)?;
        }

        let predicate: Box<dyn RevisionPredicate> = match filter {
            Some(expression) => self.query.compile(expression)?,
            None => Box::new(AcceptAll),
        };

        let listed = match object_id {
            Some(id) => self.revisions.revisions(id, predicate.as_ref(), page)?,
            None => self
                .objects
                .most_recent_revisions(bucket_id, predicate.as_ref(), page)?,
        };
        debug!(
            bucket = %bucket_id,
            returned = listed.len(),
            total = listed.total_elements,
            "revisions listed"
        );
        Ok(listed)
    }

    /// Most recent revision for each id, in request order.
    ///
    /// The bucket is checked once up front. Ids without a revision in the
    /// bucket are handled per [`ServiceConfig::batch_miss_policy`].
    pub fn get_objects_revisions(
        &self,
        bucket_id: BucketId,
        object_ids: &[CatalogObjectId],
    ) -> RevisionResult<Vec<CatalogObjectRevision>> {
        self.find_bucket(bucket_id)?;

        let mut found = Vec::with_capacity(object_ids.len());
        for &object_id in object_ids {
            match self.objects.most_recent_revision(bucket_id, object_id)? {
                Some(revision) => found.push(revision),
                None => match self.config.batch_miss_policy {
                    BatchMissPolicy::FailFast => {
                        return Err(RevisionError::ObjectNotFound(object_id));
                    }
                    BatchMissPolicy::Skip => {
                        warn!(bucket = %bucket_id, object = %object_id, "skipping unknown object in batch");
                    }
                },
            }
        }
        Ok(found)
    }

    // ---- Deletion ----

    /// Delete a revision, or the whole object when its only revision is
    /// targeted.
    ///
    /// Without `revision_id` (or when it names the most recent revision) the
    /// latest revision is dropped and the object's most-recent marker moves
    /// back to the surviving maximum. Deleting an older revision leaves that
    /// marker untouched.
    ///
    /// Whether the object goes too is decided by the store under its lock,
    /// never from an earlier read, so a revision created concurrently is not
    /// swept away with the object.
    pub fn delete(
        &self,
        bucket_id: BucketId,
        object_id: CatalogObjectId,
        revision_id: Option<RevisionId>,
    ) -> RevisionResult<DeleteOutcome> {
        self.find_bucket(bucket_id)?;
        self.find_object_in(bucket_id, object_id)?;
        let latest = self.most_recent_revision(bucket_id, object_id)?;

        let target = match revision_id {
            None => latest.revision_id,
            Some(id) if id == latest.revision_id => id,
            Some(id) => {
                self.revisions
                    .find_revision(bucket_id, object_id, id)?
                    .ok_or(RevisionError::RevisionNotFound {
                        object: object_id,
                        requested: Some(id),
                    })?
                    .revision_id
            }
        };

        loop {
            match self.revisions.delete_revision(bucket_id, object_id, target) {
                Ok(updated) => {
                    info!(
                        object = %object_id,
                        revision = %target,
                        last_revision = %updated.last_revision_id,
                        "revision deleted"
                    );
                    return Ok(DeleteOutcome::RevisionDeleted {
                        object_id,
                        revision_id: target,
                        last_revision_id: updated.last_revision_id,
                    });
                }
                Err(StoreError::LastRevision { .. }) => {
                    if self.objects.delete_object_if_last(object_id, target)?.is_some() {
                        info!(object = %object_id, revision = %target, "catalog object deleted with its last revision");
                        return Ok(DeleteOutcome::ObjectDeleted {
                            object_id,
                            revision_id: target,
                        });
                    }
                    // A revision was added between the two store calls.
                    debug!(object = %object_id, revision = %target, "object gained a revision; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl std::fmt::Debug for RevisionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

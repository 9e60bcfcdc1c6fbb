use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{BucketId, CatalogObjectId, RevisionId};

/// Where a key/value pair was declared inside an object's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataLabel {
    GenericInformation,
    Variable,
}

impl MetadataLabel {
    /// Short prefix used by query expressions (`gi.owner`, `var.HOST`).
    pub fn prefix(&self) -> &'static str {
        match self {
            MetadataLabel::GenericInformation => "gi",
            MetadataLabel::Variable => "var",
        }
    }
}

/// One ordered key/value pair extracted from a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueMetadata {
    pub key: String,
    pub value: String,
    pub label: MetadataLabel,
}

impl KeyValueMetadata {
    pub fn generic_information(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            label: MetadataLabel::GenericInformation,
        }
    }

    pub fn variable(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            label: MetadataLabel::Variable,
        }
    }
}

/// One immutable version of a catalog object's content and metadata.
///
/// Revisions are created once and never mutated. `object_id` is a
/// navigation reference to the owning object, not ownership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogObjectRevision {
    pub kind: String,
    pub bucket_id: BucketId,
    pub object_id: CatalogObjectId,
    pub revision_id: RevisionId,
    pub name: String,
    pub project_name: String,
    pub created_at: DateTime<Utc>,
    pub layout: Option<String>,
    pub key_values: Vec<KeyValueMetadata>,
    pub payload: Vec<u8>,
}

impl CatalogObjectRevision {
    /// Key/value pairs carrying the given label, in declaration order.
    pub fn key_values_labelled(
        &self,
        label: MetadataLabel,
    ) -> impl Iterator<Item = &KeyValueMetadata> + '_ {
        self.key_values.iter().filter(move |kv| kv.label == label)
    }

    /// First value declared for `key` under `label`.
    pub fn lookup(&self, label: MetadataLabel, key: &str) -> Option<&str> {
        self.key_values_labelled(label)
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    /// The metadata view returned to callers after creation.
    pub fn metadata(&self) -> CatalogObjectMetadata {
        CatalogObjectMetadata::from(self)
    }
}

/// Metadata view of a revision, without its payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogObjectMetadata {
    pub object_id: CatalogObjectId,
    pub bucket_id: BucketId,
    pub revision_id: RevisionId,
    pub kind: String,
    pub name: String,
    pub project_name: String,
    pub layout: Option<String>,
    pub created_at: DateTime<Utc>,
    pub key_values: Vec<KeyValueMetadata>,
}

impl From<&CatalogObjectRevision> for CatalogObjectMetadata {
    fn from(revision: &CatalogObjectRevision) -> Self {
        Self {
            object_id: revision.object_id,
            bucket_id: revision.bucket_id,
            revision_id: revision.revision_id,
            kind: revision.kind.clone(),
            name: revision.name.clone(),
            project_name: revision.project_name.clone(),
            layout: revision.layout.clone(),
            created_at: revision.created_at,
            key_values: revision.key_values.clone(),
        }
    }
}

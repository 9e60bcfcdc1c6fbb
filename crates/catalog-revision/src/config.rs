use catalog_types::{PageRequest, RevisionId};
use serde::{Deserialize, Serialize};

/// What a batch lookup does with an object id that resolves to nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMissPolicy {
    /// Leave the id out of the result and keep going.
    #[default]
    Skip,
    /// Abort the whole batch with `ObjectNotFound`.
    FailFast,
}

/// Configuration for the [`RevisionService`](crate::RevisionService).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Revision id given to the first revision of a new object.
    pub initial_revision_id: RevisionId,
    /// Page size used when a caller does not pick one.
    pub default_page_size: usize,
    /// Largest page size a listing accepts.
    pub max_page_size: usize,
    /// Handling of unknown ids in batch revision lookups.
    pub batch_miss_policy: BatchMissPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            initial_revision_id: RevisionId::new(1),
            default_page_size: 20,
            max_page_size: 100,
            batch_miss_policy: BatchMissPolicy::Skip,
        }
    }
}

impl ServiceConfig {
    /// The given page, or the default-sized first page.
    pub fn page_or_default(&self, page: Option<usize>, size: Option<usize>) -> PageRequest {
        PageRequest::new(page.unwrap_or(0), size.unwrap_or(self.default_page_size))
    }
}

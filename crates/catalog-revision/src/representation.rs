use catalog_types::{CatalogObjectMetadata, CatalogObjectRevision};
use serde::Serialize;

use crate::error::RepresentationError;
use crate::traits::RepresentationConverter;

#[derive(Serialize)]
struct JsonRepresentation<'a> {
    metadata: CatalogObjectMetadata,
    payload: std::borrow::Cow<'a, str>,
}

/// Built-in representations.
///
/// - `raw` and `xml` hand back the stored payload unchanged
/// - `json` wraps the metadata view and the payload text in one document
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRepresentationConverter;

impl RepresentationConverter for DefaultRepresentationConverter {
    fn convert(
        &self,
        revision: &CatalogObjectRevision,
        format: &str,
    ) -> Result<Vec<u8>, RepresentationError> {
        match format.to_ascii_lowercase().as_str() {
            "raw" | "xml" => Ok(revision.payload.clone()),
            "json" => {
                let doc = JsonRepresentation {
                    metadata: revision.metadata(),
                    payload: String::from_utf8_lossy(&revision.payload),
                };
                serde_json::to_vec_pretty(&doc).map_err(|e| RepresentationError::Conversion {
                    format: "json".into(),
                    reason: e.to_string(),
                })
            }
            other => Err(RepresentationError::UnsupportedFormat(other.to_string())),
        }
    }
}

use catalog_types::{CatalogObjectRevision, RevisionPredicate};

use crate::error::{ParseError, QueryError, RepresentationError};
use crate::parser::ParsedCatalogObject;

/// Extracts catalog metadata from an uploaded payload.
///
/// The engine never interprets payload bytes itself; it forwards them
/// untouched as the stored revision payload.
pub trait PayloadParser: Send + Sync {
    fn parse(&self, raw: &[u8]) -> Result<ParsedCatalogObject, ParseError>;
}

/// Compiles filter expressions into revision predicates.
///
/// Compilation happens before any listing, so a malformed expression fails
/// the request instead of producing an empty page.
pub trait QueryEvaluator: Send + Sync {
    fn compile(&self, expression: &str) -> Result<Box<dyn RevisionPredicate>, QueryError>;
}

/// Renders a revision's payload in a requested representation.
///
/// Conversion only affects the bytes handed back to the caller, never the
/// stored revision.
pub trait RepresentationConverter: Send + Sync {
    fn convert(
        &self,
        revision: &CatalogObjectRevision,
        format: &str,
    ) -> Result<Vec<u8>, RepresentationError>;
}

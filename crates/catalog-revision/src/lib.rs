//! Revision lifecycle engine for the catalog.
//!
//! This crate turns uploaded payloads into immutable revisions and manages
//! their history. It provides:
//! - [`RevisionService`] for create, get, list, batch lookup, and delete
//! - `PayloadParser` / `QueryEvaluator` / `RepresentationConverter` trait
//!   boundaries, with XML/JSON, expression, and passthrough defaults
//! - [`ServiceConfig`] for revision numbering, paging, and batch behavior
//!
//! Storage is reached only through the `catalog-store` repository traits.

pub mod config;
pub mod error;
pub mod parser;
pub mod query;
pub mod representation;
pub mod service;
pub mod traits;

pub use config::{BatchMissPolicy, ServiceConfig};
pub use error::{ParseError, QueryError, RepresentationError, RevisionError, RevisionResult};
pub use parser::{
    AutoPayloadParser, JsonPayloadParser, ParsedCatalogObject, PayloadFormat, XmlWorkflowParser,
};
pub use query::{ExpressionQueryEvaluator, QueryExpression};
pub use representation::DefaultRepresentationConverter;
pub use service::{DeleteOutcome, RevisionService};
pub use traits::{PayloadParser, QueryEvaluator, RepresentationConverter};

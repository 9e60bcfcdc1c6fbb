use std::sync::Arc;

use catalog_types::KeyValueMetadata;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::traits::PayloadParser;

/// Metadata a [`PayloadParser`] extracts from a payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCatalogObject {
    pub kind: String,
    pub project_name: String,
    pub name: String,
    /// Generic information first, then variables, each in declaration order.
    pub key_values: Vec<KeyValueMetadata>,
}

impl ParsedCatalogObject {
    pub fn new(
        kind: impl Into<String>,
        project_name: impl Into<String>,
        name: impl Into<String>,
        key_values: Vec<KeyValueMetadata>,
    ) -> Self {
        Self {
            kind: kind.into(),
            project_name: project_name.into(),
            name: name.into(),
            key_values,
        }
    }
}

#[derive(Deserialize)]
struct JsonDocument {
    kind: Option<String>,
    name: Option<String>,
    #[serde(default)]
    project_name: String,
    #[serde(default)]
    generic_information: Vec<JsonEntry>,
    #[serde(default)]
    variables: Vec<JsonEntry>,
}

#[derive(Deserialize)]
struct JsonEntry {
    name: String,
    #[serde(default)]
    value: String,
}

/// Parses JSON catalog documents.
///
/// Expected shape:
///
/// ```json
/// {
///   "kind": "workflow",
///   "name": "nightly-backup",
///   "project_name": "ops",
///   "generic_information": [{ "name": "owner", "value": "ops" }],
///   "variables": [{ "name": "TARGET", "value": "/srv" }]
/// }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPayloadParser;

impl PayloadParser for JsonPayloadParser {
    fn parse(&self, raw: &[u8]) -> Result<ParsedCatalogObject, ParseError> {
        let doc: JsonDocument =
            serde_json::from_slice(raw).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let kind = doc
            .kind
            .filter(|k| !k.trim().is_empty())
            .ok_or(ParseError::MissingField("kind"))?;
        let name = doc
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(ParseError::MissingField("name"))?;

        let key_values = doc
            .generic_information
            .into_iter()
            .map(|e| KeyValueMetadata::generic_information(e.name, e.value))
            .chain(
                doc.variables
                    .into_iter()
                    .map(|e| KeyValueMetadata::variable(e.name, e.value)),
            )
            .collect();

        Ok(ParsedCatalogObject {
            kind,
            project_name: doc.project_name,
            name,
            key_values,
        })
    }
}

/// Parses workflow job descriptors.
///
/// Reads `name` and `projectName` from the root `<job>` element, then the
/// job-level `<genericInformation><info name=".." value=".."/>` and
/// `<variables><variable name=".." value=".."/>` entries. Entries nested in
/// tasks are ignored. Namespace prefixes are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlWorkflowParser;

impl XmlWorkflowParser {
    const KIND: &'static str = "workflow";
}

impl PayloadParser for XmlWorkflowParser {
    fn parse(&self, raw: &[u8]) -> Result<ParsedCatalogObject, ParseError> {
        let text = std::str::from_utf8(raw).map_err(|e| ParseError::Malformed(e.to_string()))?;
        let mut reader = Reader::from_str(text);

        let mut path: Vec<String> = Vec::new();
        let mut job: Option<(Option<String>, String)> = None;
        let mut generic_information = Vec::new();
        let mut variables = Vec::new();

        loop {
            let (element, is_start) = match reader.read_event() {
                Ok(Event::Start(e)) => (e, true),
                Ok(Event::Empty(e)) => (e, false),
                Ok(Event::End(_)) => {
                    path.pop();
                    continue;
                }
                Ok(Event::Eof) => break,
                Ok(_) => continue,
                Err(e) => {
                    return Err(ParseError::Malformed(format!(
                        "at byte {}: {e}",
                        reader.buffer_position()
                    )))
                }
            };

            let local = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
            if path.is_empty() {
                if job.is_some() || local != "job" {
                    return Err(ParseError::Malformed(format!(
                        "unexpected root element `{local}`, expected a single `job`"
                    )));
                }
                let name = attribute(&element, "name")?;
                let project_name = attribute(&element, "projectName")?.unwrap_or_default();
                job = Some((name, project_name));
            } else if path == ["job", "genericInformation"] && local == "info" {
                let (key, value) = entry(&element)?;
                generic_information.push(KeyValueMetadata::generic_information(key, value));
            } else if path == ["job", "variables"] && local == "variable" {
                let (key, value) = entry(&element)?;
                variables.push(KeyValueMetadata::variable(key, value));
            }

            if is_start {
                path.push(local);
            }
        }

        if let Some(open) = path.last() {
            return Err(ParseError::Malformed(format!("element `{open}` is not closed")));
        }
        let (name, project_name) =
            job.ok_or_else(|| ParseError::Malformed("no `job` element".into()))?;
        let name = name
            .filter(|n| !n.trim().is_empty())
            .ok_or(ParseError::MissingField("name"))?;

        generic_information.extend(variables);
        Ok(ParsedCatalogObject {
            kind: Self::KIND.to_string(),
            project_name,
            name,
            key_values: generic_information,
        })
    }
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>, ParseError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ParseError::Malformed(e.to_string()))?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| ParseError::Malformed(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn entry(element: &BytesStart<'_>) -> Result<(String, String), ParseError> {
    let key = attribute(element, "name")?.ok_or(ParseError::MissingField("name"))?;
    Ok((key, attribute(element, "value")?.unwrap_or_default()))
}

/// Payload encodings the service can ingest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// XML when the payload starts with `<`, JSON otherwise.
    #[default]
    Auto,
    Json,
    Xml,
}

impl PayloadFormat {
    pub fn parser(self) -> Arc<dyn PayloadParser> {
        match self {
            PayloadFormat::Auto => Arc::new(AutoPayloadParser),
            PayloadFormat::Json => Arc::new(JsonPayloadParser),
            PayloadFormat::Xml => Arc::new(XmlWorkflowParser),
        }
    }
}

/// Dispatches on the first non-blank byte of the payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoPayloadParser;

impl PayloadParser for AutoPayloadParser {
    fn parse(&self, raw: &[u8]) -> Result<ParsedCatalogObject, ParseError> {
        match raw.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => XmlWorkflowParser.parse(raw),
            _ => JsonPayloadParser.parse(raw),
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use catalog_revision::{PayloadFormat, ServiceConfig};
use catalog_types::Bucket;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

/// Settings for the `catalog` binary, read from TOML.
///
/// ```toml
/// store_path = "catalog.json"
/// log_level = "info"
/// payload_format = "xml"
///
/// [[buckets]]
/// id = 1
/// name = "workflows"
/// owner = "ops"
///
/// [service]
/// batch_miss_policy = "fail_fast"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// JSON snapshot the store is loaded from and saved to.
    pub store_path: PathBuf,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Buckets registered on every start.
    pub buckets: Vec<Bucket>,
    /// How pushed payloads are parsed: `auto`, `json` or `xml`.
    pub payload_format: PayloadFormat,
    pub service: ServiceConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("catalog.json"),
            log_level: "warn".to_string(),
            buckets: Vec::new(),
            payload_format: PayloadFormat::Auto,
            service: ServiceConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

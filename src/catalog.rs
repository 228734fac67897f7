//! Source catalog: the JSON description of the CLI's tools that every stage
//! reads. Parsing is deliberately tolerant; the exporter has shipped both
//! `results` and `tools` as the top-level array, both `option` and `options`
//! per entry, and metadata flags as bare booleans or objects.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

/// One tool as described by the source catalog. Immutable once parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRecord {
    /// Space-separated command tokens; the first token is the area.
    pub command: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "option")]
    pub options: Vec<ToolOption>,
    #[serde(default)]
    pub destructive: Option<MetadataFlag>,
    #[serde(default)]
    pub idempotent: Option<MetadataFlag>,
    #[serde(default, rename = "openWorld", alias = "open_world")]
    pub open_world: Option<MetadataFlag>,
    #[serde(default, rename = "readOnly", alias = "read_only")]
    pub read_only: Option<MetadataFlag>,
    #[serde(default)]
    pub secret: Option<MetadataFlag>,
    #[serde(default, rename = "localRequired", alias = "local_required")]
    pub local_required: Option<MetadataFlag>,
}

impl ToolRecord {
    /// First command token, identifying the service/namespace. Empty for a
    /// blank command.
    pub fn area(&self) -> &str {
        self.command.split_whitespace().next().unwrap_or("")
    }

    /// Present metadata flags with their display names, in a fixed order.
    pub fn flags(&self) -> Vec<(&'static str, &MetadataFlag)> {
        let all = [
            ("Destructive", &self.destructive),
            ("Idempotent", &self.idempotent),
            ("Open world", &self.open_world),
            ("Read-only", &self.read_only),
            ("Secret", &self.secret),
            ("Local required", &self.local_required),
        ];
        all.into_iter()
            .filter_map(|(name, flag)| flag.as_ref().map(|flag| (name, flag)))
            .collect()
    }
}

/// One command-line option of a tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolOption {
    pub name: String,
    #[serde(default, rename = "type")]
    pub option_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// A metadata flag: the exporter writes either a bare boolean or an object
/// with a value and a description.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MetadataFlag {
    Bool(bool),
    Detailed {
        #[serde(default)]
        value: Option<bool>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl MetadataFlag {
    pub fn value(&self) -> Option<bool> {
        match self {
            MetadataFlag::Bool(value) => Some(*value),
            MetadataFlag::Detailed { value, .. } => *value,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            MetadataFlag::Bool(_) => None,
            MetadataFlag::Detailed { description, .. } => description.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, alias = "tools")]
    results: Vec<ToolRecord>,
}

/// Why the catalog could not be loaded. Always fatal for the run.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "failed to read catalog: {e}"),
            CatalogError::Parse(e) => write!(f, "failed to parse catalog JSON: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            CatalogError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

/// Load and parse the tool catalog. An unreadable or malformed file aborts
/// the run before any generation begins.
pub fn load_catalog(path: &Path) -> Result<Vec<ToolRecord>, CatalogError> {
    info!(catalog = %path.display(), "Loading tool catalog");
    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, catalog = %path.display(), "Failed to read tool catalog");
        CatalogError::Io(e)
    })?;
    let parsed: CatalogFile = serde_json::from_str(&content).map_err(|e| {
        error!(error = ?e, catalog = %path.display(), "Failed to parse tool catalog JSON");
        CatalogError::Parse(e)
    })?;
    if parsed.results.is_empty() {
        warn!(catalog = %path.display(), "Tool catalog contains no tools");
    }
    info!(tools = parsed.results.len(), "Tool catalog loaded");
    Ok(parsed.results)
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::{GeneratorConfig, RunConfig};
use crate::llm::API_KEY_ENV;
use crate::normalize::NormalizationTables;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Deserialize)]
struct StaticConfig {
    catalog: PathBuf,
    output_dir: PathBuf,
    #[serde(default)]
    tables: Option<PathBuf>,
    #[serde(default)]
    template: Option<PathBuf>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    improve: bool,
    #[serde(default)]
    generator: Option<GeneratorSection>,
}

#[derive(Deserialize)]
struct GeneratorSection {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// CLI-provided overrides applied on top of the static file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub version: Option<String>,
    pub improve: bool,
}

/// Loads a static YAML config file (no secrets), resolves the referenced
/// normalization tables and template files, and merges environment secrets
/// and CLI overrides. Returns a fully merged RunConfig or an error; every
/// failure here is fatal for the run.
pub fn load_config<P: AsRef<Path>>(path: P, overrides: Overrides) -> Result<RunConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let tables = match &static_conf.tables {
        Some(tables_path) => load_tables(tables_path)?,
        None => {
            info!("No tables file configured, using built-in normalization tables");
            NormalizationTables::default()
        }
    };

    let template = match &static_conf.template {
        Some(template_path) => match fs::read_to_string(template_path) {
            Ok(template) => {
                info!(template = ?template_path, "Loaded tool page template");
                Some(template)
            }
            Err(e) => {
                error!(error = ?e, template = ?template_path, "Failed to read template file");
                return Err(anyhow::anyhow!(
                    "Failed to read template file {:?}: {}",
                    template_path,
                    e
                ));
            }
        },
        None => None,
    };

    let enabled = static_conf
        .generator
        .as_ref()
        .map(|g| g.enabled)
        .unwrap_or(true);
    let endpoint = static_conf
        .generator
        .as_ref()
        .and_then(|g| g.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let model = static_conf
        .generator
        .as_ref()
        .and_then(|g| g.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => {
            info!("DOCMILL_API_KEY found in env");
            Some(key)
        }
        _ => {
            if enabled {
                warn!("DOCMILL_API_KEY not set, generation requests will be unauthenticated");
            }
            None
        }
    };

    let config = RunConfig {
        catalog_path: static_conf.catalog,
        output_dir: overrides.output_dir.unwrap_or(static_conf.output_dir),
        tables,
        template,
        version: overrides
            .version
            .or(static_conf.version)
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        improve: overrides.improve || static_conf.improve,
        generator: GeneratorConfig {
            enabled,
            endpoint,
            model,
            api_key,
        },
    };
    config.trace_loaded();
    Ok(config)
}

fn load_tables(path: &Path) -> Result<NormalizationTables> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, tables = ?path, "Failed to read tables file");
            return Err(anyhow::anyhow!(
                "Failed to read tables file {:?}: {}",
                path,
                e
            ));
        }
    };
    match serde_json::from_str::<NormalizationTables>(&content) {
        Ok(tables) => {
            info!(tables = ?path, "Parsed normalization tables");
            Ok(tables)
        }
        Err(e) => {
            error!(error = ?e, tables = ?path, "Failed to parse tables JSON");
            Err(anyhow::anyhow!("Failed to parse tables JSON: {e}"))
        }
    }
}

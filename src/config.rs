use std::path::PathBuf;
use tracing::info;

use crate::normalize::NormalizationTables;

/// Fully resolved configuration for one documentation run. Built by
/// `load_config` from the YAML file, the environment, and CLI overrides.
#[derive(Debug)]
pub struct RunConfig {
    pub catalog_path: PathBuf,
    pub output_dir: PathBuf,
    pub tables: NormalizationTables,
    /// Tool page template; `None` selects the built-in default.
    pub template: Option<String>,
    /// Version string stamped into every generated frontmatter block.
    pub version: String,
    /// Run the AI improvement pass after composition.
    pub improve: bool,
    pub generator: GeneratorConfig,
}

impl RunConfig {
    pub fn trace_loaded(&self) {
        info!(
            catalog = %self.catalog_path.display(),
            output_dir = %self.output_dir.display(),
            version = %self.version,
            improve = self.improve,
            custom_template = self.template.is_some(),
            "Loaded RunConfig"
        );
        self.tables.trace_loaded();
        self.generator.trace_loaded();
    }
}

/// Text-generator settings. The API key comes only from the environment,
/// never from the config file.
#[derive(Debug)]
pub struct GeneratorConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl GeneratorConfig {
    pub fn trace_loaded(&self) {
        info!(
            enabled = self.enabled,
            endpoint = %self.endpoint,
            model = %self.model,
            api_key_len = self.api_key.as_deref().map(str::len).unwrap_or(0),
            "Loaded GeneratorConfig"
        );
    }
}

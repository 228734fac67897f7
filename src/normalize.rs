//! Normalization tables: the curated lookups that drive slug derivation and
//! family grouping. Loaded once at startup into an immutable value and passed
//! by reference; nothing in here is process-global.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::{debug, info};

/// Read-only lookup tables for one generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizationTables {
    /// Area token (case-sensitive, as it appears in commands) to canonical
    /// file prefix, e.g. "aks" -> "azure-kubernetes-service".
    pub brand_mappings: BTreeMap<String, String>,
    /// Lowercase token to hyphenated expansion, e.g. "nodepool" -> "node-pool".
    pub compound_words: BTreeMap<String, String>,
    /// Tokens dropped while cleaning the command remainder.
    pub stop_words: BTreeSet<String>,
    /// Fallback family-grouping patterns. "{area}" is substituted with the
    /// family's area token and the result is matched against slugs that have
    /// had their "azure-" prefix stripped. New service naming escapes land
    /// here, not in code.
    pub family_prefix_patterns: Vec<String>,
}

impl Default for NormalizationTables {
    fn default() -> Self {
        let brand_mappings = [
            ("acr", "acr"),
            ("aks", "azure-kubernetes-service"),
            ("appconfig", "app-configuration"),
            ("cosmos", "cosmos-db"),
            ("foundry", "ai-foundry"),
            ("keyvault", "key-vault"),
            ("monitor", "monitor"),
            ("servicebus", "service-bus"),
            ("sql", "sql"),
            ("storage", "storage"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let compound_words = [
            ("appservice", "app-service"),
            ("datadisk", "data-disk"),
            ("entraadmin", "entra-admin"),
            ("loadtesting", "load-testing"),
            ("nodepool", "node-pool"),
            ("resourcegroup", "resource-group"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let stop_words = ["a", "an", "and", "of", "or", "the"]
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            brand_mappings,
            compound_words,
            stop_words,
            family_prefix_patterns: vec!["ai-{area}".to_string(), "{area}".to_string()],
        }
    }
}

impl NormalizationTables {
    /// Resolve the canonical brand prefix for an area token, in tier order:
    /// exact brand mapping, compound expansion of the lowercased token, then
    /// the lowercased token itself. The result does not yet carry the
    /// mandatory "azure-" prefix; see [`crate::slug::ensure_azure_prefix`].
    pub fn resolve_brand_prefix(&self, area: &str) -> String {
        if let Some(mapped) = self.brand_mappings.get(area) {
            return mapped.clone();
        }
        let lowered = area.to_lowercase();
        if let Some(expansion) = self.compound_words.get(&lowered) {
            return expansion.clone();
        }
        lowered
    }

    /// Candidate grouping prefixes for an area, from the data-driven pattern
    /// list. Used by the family assembler when primary grouping matches
    /// nothing.
    pub fn candidate_family_prefixes(&self, area: &str) -> Vec<String> {
        let lowered = area.to_lowercase();
        self.family_prefix_patterns
            .iter()
            .map(|pattern| pattern.replace("{area}", &lowered))
            .collect()
    }

    pub fn trace_loaded(&self) {
        info!(
            brand_mappings = self.brand_mappings.len(),
            compound_words = self.compound_words.len(),
            stop_words = self.stop_words.len(),
            family_prefix_patterns = self.family_prefix_patterns.len(),
            "Loaded normalization tables"
        );
        debug!(?self, "Normalization tables (full debug)");
    }
}

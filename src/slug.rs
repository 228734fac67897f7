//! Slug derivation: turns a CLI command string into the canonical base file
//! name all of a tool's generated documents share. Pure and deterministic for
//! a given command and set of [`NormalizationTables`].

use crate::normalize::NormalizationTables;

/// Slug used when a command is empty or whitespace-only.
pub const FALLBACK_SLUG: &str = "unknown";

/// Every derived slug starts with this prefix.
pub const AZURE_PREFIX: &str = "azure-";

/// Prepend the mandatory prefix unless the value already carries it.
pub fn ensure_azure_prefix(prefix: &str) -> String {
    if prefix.starts_with(AZURE_PREFIX) {
        prefix.to_string()
    } else {
        format!("{AZURE_PREFIX}{prefix}")
    }
}

/// Derive the base file name for a command.
///
/// The first whitespace token is the area and resolves to a brand prefix
/// (brand mapping, else compound expansion of the lowercased token, else the
/// lowercased token). The remaining tokens are joined, lowercased and split
/// on `-`; each piece is expanded through the compound-word map and filtered
/// against the stop-word set before being appended to the prefix.
pub fn build_base_file_name(tables: &NormalizationTables, command: &str) -> String {
    let mut tokens = command.split_whitespace();
    let Some(area) = tokens.next() else {
        return FALLBACK_SLUG.to_string();
    };

    let prefix = ensure_azure_prefix(&tables.resolve_brand_prefix(area));

    let remainder: Vec<&str> = tokens.collect();
    if remainder.is_empty() {
        return prefix;
    }

    let joined = remainder.join("-").to_lowercase();
    let mut cleaned: Vec<String> = Vec::new();
    for fragment in joined.split('-').filter(|fragment| !fragment.is_empty()) {
        if let Some(expansion) = tables.compound_words.get(fragment) {
            for sub in expansion.split('-').filter(|sub| !sub.is_empty()) {
                let sub = sub.to_lowercase();
                if !tables.stop_words.contains(&sub) {
                    cleaned.push(sub);
                }
            }
        } else if !tables.stop_words.contains(fragment) {
            cleaned.push(fragment.to_string());
        }
    }

    if cleaned.is_empty() {
        prefix
    } else {
        format!("{}-{}", prefix, cleaned.join("-"))
    }
}

/// A slug with its leading "azure-" removed, the form family grouping
/// compares against.
pub fn strip_azure_prefix(slug: &str) -> &str {
    slug.strip_prefix(AZURE_PREFIX).unwrap_or(slug)
}

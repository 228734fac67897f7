use docmill::normalize::NormalizationTables;
use docmill::slug::{build_base_file_name, ensure_azure_prefix, strip_azure_prefix};

#[test]
fn brand_mapping_and_compound_expansion_combine() {
    let tables = NormalizationTables::default();
    assert_eq!(
        build_base_file_name(&tables, "aks nodepool get"),
        "azure-kubernetes-service-node-pool-get"
    );
}

#[test]
fn brand_mapping_resolves_area_token() {
    let tables = NormalizationTables::default();
    assert_eq!(
        build_base_file_name(&tables, "keyvault secret create"),
        "azure-key-vault-secret-create"
    );
}

#[test]
fn unmapped_area_falls_back_to_lowercased_token() {
    let tables = NormalizationTables::default();
    assert_eq!(
        build_base_file_name(&tables, "Widget frobnicate"),
        "azure-widget-frobnicate"
    );
}

#[test]
fn empty_and_whitespace_commands_use_fallback_slug() {
    let tables = NormalizationTables::default();
    assert_eq!(build_base_file_name(&tables, ""), "unknown");
    assert_eq!(build_base_file_name(&tables, "   \t  "), "unknown");
}

#[test]
fn stop_words_are_removed_from_the_remainder() {
    let tables = NormalizationTables::default();
    assert_eq!(
        build_base_file_name(&tables, "sql db list of the backups"),
        "azure-sql-db-list-backups"
    );
}

#[test]
fn remainder_entirely_stop_words_leaves_bare_prefix() {
    let tables = NormalizationTables::default();
    assert_eq!(build_base_file_name(&tables, "sql of the"), "azure-sql");
}

#[test]
fn area_only_command_yields_bare_prefix() {
    let tables = NormalizationTables::default();
    assert_eq!(build_base_file_name(&tables, "monitor"), "azure-monitor");
}

#[test]
fn remainder_is_case_insensitive() {
    let tables = NormalizationTables::default();
    assert_eq!(
        build_base_file_name(&tables, "aks NodePool GET"),
        build_base_file_name(&tables, "aks nodepool get")
    );
}

#[test]
fn hyphenated_remainder_tokens_are_split_and_kept() {
    let tables = NormalizationTables::default();
    assert_eq!(
        build_base_file_name(&tables, "storage account show-connection-string"),
        "azure-storage-account-show-connection-string"
    );
}

#[test]
fn derivation_is_deterministic() {
    let tables = NormalizationTables::default();
    let first = build_base_file_name(&tables, "cosmos entraadmin datadisk update");
    let second = build_base_file_name(&tables, "cosmos entraadmin datadisk update");
    assert_eq!(first, second);
    assert_eq!(first, "azure-cosmos-db-entra-admin-data-disk-update");
}

#[test]
fn every_nonempty_command_gets_the_azure_prefix() {
    let tables = NormalizationTables::default();
    for command in [
        "aks get",
        "keyvault secret show",
        "unmappedarea op",
        "foundry deploy model",
        "servicebus queue peek",
    ] {
        let slug = build_base_file_name(&tables, command);
        assert!(
            slug.starts_with("azure-"),
            "Slug for {command:?} should carry the azure- prefix, got {slug}"
        );
    }
}

#[test]
fn already_prefixed_brand_value_is_not_doubled() {
    let tables = NormalizationTables::default();
    let slug = build_base_file_name(&tables, "aks get");
    assert!(
        !slug.starts_with("azure-azure-"),
        "Prefix must not be applied twice, got {slug}"
    );
    assert_eq!(slug, "azure-kubernetes-service-get");
}

#[test]
fn ensure_azure_prefix_is_conditional() {
    assert_eq!(ensure_azure_prefix("sql"), "azure-sql");
    assert_eq!(ensure_azure_prefix("azure-sql"), "azure-sql");
}

#[test]
fn strip_azure_prefix_removes_one_layer() {
    assert_eq!(strip_azure_prefix("azure-sql-db"), "sql-db");
    assert_eq!(strip_azure_prefix("unknown"), "unknown");
    assert_eq!(strip_azure_prefix("azure-azure-x"), "azure-x");
}

#[test]
fn tables_from_partial_json_inherit_builtin_defaults() {
    // A tables file only needs the sections it overrides; the rest come from
    // the built-in defaults.
    let tables: NormalizationTables =
        serde_json::from_str(r#"{ "brand_mappings": { "box": "box-files" } }"#)
            .expect("partial tables JSON should deserialize");
    assert_eq!(
        build_base_file_name(&tables, "box nodepool sync the files"),
        "azure-box-files-node-pool-sync-files"
    );
}

#[test]
fn custom_stop_words_replace_the_defaults() {
    let tables: NormalizationTables =
        serde_json::from_str(r#"{ "stop_words": ["temporary"] }"#)
            .expect("tables JSON should deserialize");
    assert_eq!(
        build_base_file_name(&tables, "storage blob temporary copy of data"),
        "azure-storage-blob-copy-of-data"
    );
}

use std::env;
use std::fs::write;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::NamedTempFile;

use docmill::load_config::{load_config, Overrides};

/// A minimal static config resolves every optional field to its default.
#[tokio::test]
#[serial]
async fn test_load_config_minimal_file_uses_defaults() {
    let config_yaml = r#"
catalog: ./catalog.json
output_dir: ./docs
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let config =
        load_config(config_file.path(), Overrides::default()).expect("Config should load");

    assert_eq!(config.catalog_path, PathBuf::from("./catalog.json"));
    assert_eq!(config.output_dir, PathBuf::from("./docs"));
    assert_eq!(config.version, "1.0.0");
    assert!(!config.improve);
    assert!(config.template.is_none());
    assert!(config.generator.enabled);
    assert_eq!(
        config.generator.endpoint,
        "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(config.generator.model, "gpt-4o-mini");
    assert!(config.generator.api_key.is_none());
    // Built-in tables apply when no tables file is configured.
    assert_eq!(
        config.tables.resolve_brand_prefix("aks"),
        "azure-kubernetes-service"
    );
}

/// The generator section and the environment secret merge into the config.
#[tokio::test]
#[serial]
async fn test_load_config_generator_section_and_env_key() {
    let config_yaml = r#"
catalog: ./catalog.json
output_dir: ./docs
version: "2.3.0"
improve: true
generator:
  endpoint: "https://llm.internal/v1/chat"
  model: "doc-writer-large"
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::set_var("DOCMILL_API_KEY", "secret-key");

    let config =
        load_config(config_file.path(), Overrides::default()).expect("Config should load");
    env::remove_var("DOCMILL_API_KEY");

    assert_eq!(config.version, "2.3.0");
    assert!(config.improve);
    assert!(config.generator.enabled);
    assert_eq!(config.generator.endpoint, "https://llm.internal/v1/chat");
    assert_eq!(config.generator.model, "doc-writer-large");
    assert_eq!(config.generator.api_key.as_deref(), Some("secret-key"));
}

/// A missing API key is not fatal; the run degrades instead of aborting.
#[tokio::test]
#[serial]
async fn test_load_config_missing_api_key_is_not_fatal() {
    let config_yaml = r#"
catalog: ./catalog.json
output_dir: ./docs
generator:
  enabled: true
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let config =
        load_config(config_file.path(), Overrides::default()).expect("Config should load");
    assert!(config.generator.enabled);
    assert!(config.generator.api_key.is_none());
}

/// Generation can be switched off entirely from the file.
#[tokio::test]
#[serial]
async fn test_load_config_generator_can_be_disabled() {
    let config_yaml = r#"
catalog: ./catalog.json
output_dir: ./docs
generator:
  enabled: false
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let config =
        load_config(config_file.path(), Overrides::default()).expect("Config should load");
    assert!(!config.generator.enabled);
}

/// CLI overrides win over the static file; the improve flags combine.
#[tokio::test]
#[serial]
async fn test_load_config_overrides_take_precedence() {
    let config_yaml = r#"
catalog: ./catalog.json
output_dir: ./docs
version: "1.5.0"
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let overrides = Overrides {
        output_dir: Some(PathBuf::from("./elsewhere")),
        version: Some("9.0.0".to_string()),
        improve: true,
    };
    let config = load_config(config_file.path(), overrides).expect("Config should load");

    assert_eq!(config.output_dir, PathBuf::from("./elsewhere"));
    assert_eq!(config.version, "9.0.0");
    assert!(config.improve, "CLI flag enables improvement");
}

/// File-level improve survives an absent CLI flag.
#[tokio::test]
#[serial]
async fn test_load_config_file_improve_survives_overrides() {
    let config_yaml = r#"
catalog: ./catalog.json
output_dir: ./docs
improve: true
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let config =
        load_config(config_file.path(), Overrides::default()).expect("Config should load");
    assert!(config.improve);
}

/// A configured tables file replaces the built-in normalization tables.
#[tokio::test]
#[serial]
async fn test_load_config_reads_tables_file() {
    let tables_file = NamedTempFile::new().expect("temp file");
    write(
        tables_file.path(),
        r#"{ "brand_mappings": { "box": "box-files" } }"#,
    )
    .unwrap();

    let config_yaml = format!(
        r#"
catalog: ./catalog.json
output_dir: ./docs
tables: "{}"
"#,
        tables_file.path().display()
    );
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let config =
        load_config(config_file.path(), Overrides::default()).expect("Config should load");
    assert_eq!(config.tables.resolve_brand_prefix("box"), "box-files");
    // The provided map replaces the built-in one wholesale.
    assert_eq!(config.tables.resolve_brand_prefix("keyvault"), "keyvault");
    // Omitted sections keep their built-in values.
    assert_eq!(config.tables.resolve_brand_prefix("nodepool"), "node-pool");
}

/// A malformed tables file is fatal; a silently wrong table would corrupt
/// every slug in the run.
#[tokio::test]
#[serial]
async fn test_load_config_errors_on_bad_tables_json() {
    let tables_file = NamedTempFile::new().expect("temp file");
    write(tables_file.path(), b"{ not json").unwrap();

    let config_yaml = format!(
        r#"
catalog: ./catalog.json
output_dir: ./docs
tables: "{}"
"#,
        tables_file.path().display()
    );
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let err = load_config(config_file.path(), Overrides::default()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("tables"),
        "Tables error expected, got: {msg}"
    );
}

/// A configured template file is read into the config.
#[tokio::test]
#[serial]
async fn test_load_config_reads_template_file() {
    let template_file = NamedTempFile::new().expect("temp file");
    write(template_file.path(), "# {{title}}\n\n{{description}}\n").unwrap();

    let config_yaml = format!(
        r#"
catalog: ./catalog.json
output_dir: ./docs
template: "{}"
"#,
        template_file.path().display()
    );
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let config =
        load_config(config_file.path(), Overrides::default()).expect("Config should load");
    assert_eq!(
        config.template.as_deref(),
        Some("# {{title}}\n\n{{description}}\n")
    );
}

/// A template path that cannot be read is fatal.
#[tokio::test]
#[serial]
async fn test_load_config_errors_on_missing_template() {
    let config_yaml = r#"
catalog: ./catalog.json
output_dir: ./docs
template: "./no/such/template.md"
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let err = load_config(config_file.path(), Overrides::default()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("template"),
        "Template error expected, got: {msg}"
    );
}

/// This test ensures that if the config file is not valid YAML, load_config
/// errors and reports as such.
#[tokio::test]
#[serial]
async fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();
    env::remove_var("DOCMILL_API_KEY");

    let err = load_config(config_file.path(), Overrides::default()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

/// A missing config file is reported with its path.
#[tokio::test]
#[serial]
async fn test_load_config_errors_on_missing_file() {
    env::remove_var("DOCMILL_API_KEY");
    let err =
        load_config("./no/such/config.yaml", Overrides::default()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("read config file"),
        "Read error expected, got: {msg}"
    );
}

use super::*;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.extensions, vec!["sql"]);
    assert_eq!(config.materialization, Materialization::Table);
    assert_eq!(config.threads, 4);
    assert_eq!(config.database, ":memory:");
    assert!(!config.fail_fast);
    assert_eq!(config.failure_policy(), FailurePolicy::ContainAndContinue);
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
extensions: [sql, duckdb]
materialization: view
threads: 8
database: warehouse.duckdb
fail_fast: true
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.extensions, vec!["sql", "duckdb"]);
    assert_eq!(config.materialization, Materialization::View);
    assert_eq!(config.database, "warehouse.duckdb");

    let options = config.run_options();
    assert_eq!(options.concurrency, 8);
    assert_eq!(options.policy, FailurePolicy::FailFast);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config: Config = serde_yaml::from_str("threads: 2").unwrap();
    assert_eq!(config.threads, 2);
    assert_eq!(config.extensions, vec!["sql"]);
    assert_eq!(config.materialization, Materialization::Table);
}

#[test]
fn test_unknown_key_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_FILE);
    std::fs::write(&path, "name: my_project\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
    assert!(err.to_string().contains("[E006]"));
}

#[test]
fn test_invalid_materialization_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_FILE);
    std::fs::write(&path, "materialization: ephemeral\n").unwrap();

    assert!(matches!(
        Config::load(&path),
        Err(CoreError::ConfigParseError { .. })
    ));
}

#[test]
fn test_zero_threads_rejected() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILE), "threads: 0\n").unwrap();

    let err = Config::load_from_dir(temp.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_dotted_extension_rejected() {
    let config = Config {
        extensions: vec![".sql".to_string()],
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        extensions: vec![],
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load_from_dir(temp.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILE), "\n").unwrap();
    let config = Config::load_from_dir(temp.path()).unwrap();
    assert_eq!(config, Config::default());
}

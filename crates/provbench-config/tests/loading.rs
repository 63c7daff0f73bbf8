use std::io::Write;

use provbench_config::{load_config_file, parse_config, BasePaths, ConfigError};

#[tokio::test]
async fn load_valid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "project: config-test\n\
         billing_project: billing-project\n\
         user_project_override: true\n\
         region: us-central1\n\
         access_token: coolbeans\n\
         base_paths:\n  \
           sql_admin: http://localhost:8080/sql/v1beta4\n"
    )
    .unwrap();

    let mut config = load_config_file(file.path()).expect("should load without error");
    assert_eq!(config.project, "config-test");
    assert_eq!(config.billing_project.as_deref(), Some("billing-project"));
    assert!(config.user_project_override);
    assert_eq!(config.base_paths.container, BasePaths::default().container);

    config.load_and_validate().await.expect("should validate");
    assert_eq!(config.base_paths.sql_admin, "http://localhost:8080/sql/v1beta4/");
    assert_eq!(config.user_project(None), Some("billing-project"));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = parse_config("project: p\nregoin: us-central1\n", "inline").unwrap_err();
    assert!(matches!(err, ConfigError::YamlParse { path, .. } if path == "inline"));
}

#[tokio::test]
async fn empty_file_fails_validation_not_parsing() {
    let mut config = parse_config("{}", "inline").expect("empty mapping parses");
    assert!(matches!(
        config.load_and_validate().await,
        Err(ConfigError::MissingProject(_))
    ));
}

#[test]
fn missing_file_returns_error() {
    let err = load_config_file(std::path::Path::new("/nonexistent/provbench.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

//! Configuration loading and validation tests

use plume::config::Config;
use std::io::Write;

#[test]
fn test_default_config_validates() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.scheduling.spacing_days, 3);
    assert_eq!(config.scheduling.max_per_day, None);
}

#[test]
fn test_config_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[scheduling]
spacing_days = 5
max_per_day = 2

[generation]
endpoint = "http://gen.internal:9000"
timeout_secs = 60
language = "de"

[publishing]
timeout_secs = 20

[database]
sqlite_path = "/tmp/plume-test.db"

[logging]
level = "debug"
format = "json"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.scheduling.spacing_days, 5);
    assert_eq!(config.scheduling.max_per_day, Some(2));
    assert_eq!(config.scheduling.horizon_days, None);
    assert_eq!(config.generation.endpoint, "http://gen.internal:9000");
    assert_eq!(config.generation.language, "de");
    assert_eq!(config.publishing.timeout_secs, 20);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_config_from_missing_file_fails() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/plume.toml"));
    assert!(result.is_err());
}

#[test]
fn test_invalid_toml_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not valid toml [[[").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_assigner_config_from_settings() {
    let mut config = Config::default();
    config.scheduling.spacing_days = 7;
    config.scheduling.horizon_days = Some(90);

    let assigner = config.assigner_config();
    assert_eq!(assigner.spacing_days, 7);
    assert_eq!(assigner.horizon_days, Some(90));
}

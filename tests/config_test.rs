// ==========================================
// AppConfig 测试
// ==========================================
// 测试目标: 默认值、必填项、凭证完整性
// ==========================================

use hr_import::config::{AppConfig, ConfigError, LogFormat};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = load(&[("DATABASE_URL", "sqlite://./data/hr.db")]).unwrap();

    assert_eq!(config.database.path, "./data/hr.db");
    assert_eq!(config.database.busy_timeout_ms, 5_000);
    assert!(!config.strict_headers);
    assert_eq!(config.import_timeout, Duration::from_secs(300));
    assert_eq!(config.log_format, LogFormat::Text);
    assert_eq!(config.slow_sql_ms, 200);
    assert!(config.vision.is_none());
    assert!(config.upload_dir.ends_with("import_temp"));
}

#[test]
fn test_database_url_required() {
    assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    assert_eq!(
        load(&[("DATABASE_URL", "   ")]).unwrap_err(),
        ConfigError::Missing("DATABASE_URL")
    );
}

#[test]
fn test_overrides() {
    let config = load(&[
        ("DATABASE_URL", "sqlite::memory:"),
        ("DATABASE_BUSY_TIMEOUT_MS", "250"),
        ("UPLOAD_DIR", "/tmp/hr"),
        ("IMPORT_STRICT_HEADERS", "ON"),
        ("IMPORT_TIMEOUT_SECS", "30"),
        ("LOG_FORMAT", "JSON"),
        ("SLOW_SQL_MS", "0"),
    ])
    .unwrap();

    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.database.busy_timeout_ms, 250);
    assert_eq!(config.upload_dir, PathBuf::from("/tmp/hr/import_temp"));
    assert!(config.strict_headers);
    assert_eq!(config.import_timeout, Duration::from_secs(30));
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.slow_sql_ms, 0);
}

#[test]
fn test_invalid_numbers_and_formats() {
    assert!(matches!(
        load(&[("DATABASE_URL", "hr.db"), ("IMPORT_TIMEOUT_SECS", "five")]),
        Err(ConfigError::Invalid { key: "IMPORT_TIMEOUT_SECS", .. })
    ));
    assert!(matches!(
        load(&[("DATABASE_URL", "hr.db"), ("LOG_FORMAT", "xml")]),
        Err(ConfigError::Invalid { key: "LOG_FORMAT", .. })
    ));
}

#[test]
fn test_vision_credentials_all_or_nothing() {
    let config = load(&[
        ("DATABASE_URL", "hr.db"),
        ("AZURE_COMPUTER_VISION_ENDPOINT", "https://ocr.example.com"),
        ("AZURE_COMPUTER_VISION_KEY", "k-123"),
    ])
    .unwrap();
    let vision = config.vision.unwrap();
    assert_eq!(vision.api_version, "2023-02-01-preview");

    assert!(matches!(
        load(&[("DATABASE_URL", "hr.db"), ("AZURE_COMPUTER_VISION_KEY", "k-123")]),
        Err(ConfigError::Incomplete(_))
    ));
    assert!(matches!(
        load(&[("DATABASE_URL", "hr.db"), ("VISION_REQUIRED", "true")]),
        Err(ConfigError::Missing(_))
    ));
}

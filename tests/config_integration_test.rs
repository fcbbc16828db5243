// ==========================================
// 配置加载集成测试
// ==========================================
// 测试目标: 密钥文件 → 配置 → 数据源 → 报表 API
// ==========================================

mod test_helpers;

use apl_rejection_report::api::ReportApi;
use apl_rejection_report::config::{AppSettings, ConfigError, DatabaseSettings};
use apl_rejection_report::store;
use std::io::Write;
use std::time::Duration;
use test_helpers::{create_test_db, sqlite_secrets};

#[test]
fn test_load_from_explicit_file_and_connect() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let mut secrets = tempfile::NamedTempFile::new().unwrap();
    write!(secrets, "{}", sqlite_secrets(&db_path)).unwrap();

    let settings = AppSettings::load(Some(secrets.path())).expect("Failed to load settings");
    assert!(matches!(settings.database, DatabaseSettings::Sqlite { .. }));
    assert_eq!(settings.pool.recycle, Duration::from_secs(60));
    assert_eq!(settings.report.qualified_table(), "aplrejection_wip");

    let store = store::connect(&settings).expect("Failed to connect");
    assert_eq!(store.backend(), "sqlite");

    let api = ReportApi::new(store, &settings.report);
    api.ping().unwrap();
}

#[test]
fn test_explicit_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppSettings::load(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let mut secrets = tempfile::NamedTempFile::new().unwrap();
    write!(secrets, "[database\nhost = ").unwrap();

    let err = AppSettings::load(Some(secrets.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

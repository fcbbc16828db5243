// ==========================================
// APL 不良品报表系统 - 连接与报表配置
// ==========================================
// 来源: secrets.toml（[database] / [pool] / [report]）+ 环境变量覆写
// 红线: 连接凭据不得硬编码，不得出现在日志与 Debug 输出中
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::schema::{is_valid_identifier, DEFAULT_FACT_TABLE};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认 MariaDB/MySQL 端口
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// 默认连接回收周期（秒）
pub const DEFAULT_POOL_RECYCLE_SECS: u64 = 3_600;

/// 默认连接池大小
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 默认建连/取连接超时（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// 默认密钥文件名
pub const SECRETS_FILE_NAME: &str = "secrets.toml";

// ==========================================
// 环境变量键
// ==========================================
pub mod env_keys {
    /// 密钥文件路径
    pub const SECRETS_PATH: &str = "APL_REPORT_SECRETS";

    pub const DB_DRIVER: &str = "APL_REPORT_DB_DRIVER";
    pub const DB_HOST: &str = "APL_REPORT_DB_HOST";
    pub const DB_PORT: &str = "APL_REPORT_DB_PORT";
    pub const DB_USER: &str = "APL_REPORT_DB_USER";
    pub const DB_PASSWORD: &str = "APL_REPORT_DB_PASSWORD";
    pub const DB_NAME: &str = "APL_REPORT_DB_NAME";
    pub const DB_PATH: &str = "APL_REPORT_DB_PATH";
}

// ==========================================
// 配置文件原始结构（全部可选，统一在 resolve 中校验）
// ==========================================
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSecrets {
    database: RawDatabase,
    pool: RawPool,
    report: RawReport,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawDatabase {
    driver: Option<String>,
    host: Option<String>,
    port: Option<i64>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    path: Option<String>,
}

// 手写 Debug，避免 password 泄露到日志
impl fmt::Debug for RawDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDatabase")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user.as_ref().map(|_| "***"))
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("path", &self.path)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPool {
    recycle_secs: Option<u64>,
    pre_ping: Option<bool>,
    max_connections: Option<u32>,
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReport {
    schema: Option<String>,
    table: Option<String>,
    output_dir: Option<String>,
}

// ==========================================
// 校验后的配置
// ==========================================

/// 数据库服务器连接参数
#[derive(Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// 默认库（可选；未设置时依赖 [report].schema 限定表名）
    pub database: Option<String>,
}

impl fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &"***")
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// 数据库目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSettings {
    /// MySQL / MariaDB（网络协议）
    MySql(ServerSettings),
    /// 本地 SQLite 文件（测试、演示、离线抽取）
    Sqlite { path: PathBuf },
}

impl DatabaseSettings {
    pub fn driver_name(&self) -> &'static str {
        match self {
            DatabaseSettings::MySql(_) => "mysql",
            DatabaseSettings::Sqlite { .. } => "sqlite",
        }
    }

    /// 可安全写入日志的连接描述（不含凭据）
    pub fn describe(&self) -> String {
        match self {
            DatabaseSettings::MySql(s) => match &s.database {
                Some(db) => format!("mysql://{}:{}/{}", s.host, s.port, db),
                None => format!("mysql://{}:{}", s.host, s.port),
            },
            DatabaseSettings::Sqlite { path } => format!("sqlite://{}", path.display()),
        }
    }
}

/// 连接池参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// 连接存活超过该时长后回收重建
    pub recycle: Duration,
    /// 取用连接前先做存活探测
    pub pre_ping: bool,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            recycle: Duration::from_secs(DEFAULT_POOL_RECYCLE_SECS),
            pre_ping: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// 报表参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// 事实表所在库（可选）
    pub schema: Option<String>,
    pub table: String,
    /// 导出文件目录
    pub output_dir: PathBuf,
}

impl ReportSettings {
    /// 限定后的事实表名，例如 `brandix_production.aplrejection_wip`
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            schema: None,
            table: DEFAULT_FACT_TABLE.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub pool: PoolSettings,
    pub report: ReportSettings,
}

impl AppSettings {
    /// 加载配置（文件 + 进程环境变量）
    ///
    /// 查找顺序: 显式路径 → `APL_REPORT_SECRETS` → `./secrets.toml`
    /// → `<config_dir>/apl-rejection-report/secrets.toml`。
    /// 若均不存在但环境变量已给出数据库主机或路径，则仅用环境变量。
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let (content, origin) = match locate_secrets_file(explicit, env)? {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                (content, path)
            }
            None => (String::new(), PathBuf::from("<env>")),
        };

        let settings = Self::from_toml_str(&content, &origin, env)?;
        tracing::info!(
            origin = %origin.display(),
            target_db = %settings.database.describe(),
            table = %settings.report.qualified_table(),
            "配置加载完成"
        );
        Ok(settings)
    }

    /// 从 TOML 文本解析配置，`env` 提供覆写值
    pub fn from_toml_str<F>(content: &str, origin: &Path, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw: RawSecrets = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        apply_env_overrides(&mut raw.database, &env)?;

        Ok(Self {
            database: resolve_database(raw.database)?,
            pool: resolve_pool(raw.pool)?,
            report: resolve_report(raw.report)?,
        })
    }
}

/// 定位密钥文件
///
/// 返回 Ok(None) 表示未找到文件但环境变量足以构成配置。
fn locate_secrets_file<F>(explicit: Option<&Path>, env: F) -> ConfigResult<Option<PathBuf>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(ConfigError::NotFound {
            searched: path.display().to_string(),
        });
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(p) = env(env_keys::SECRETS_PATH) {
        candidates.push(PathBuf::from(p));
    }
    candidates.push(PathBuf::from(SECRETS_FILE_NAME));
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("apl-rejection-report").join(SECRETS_FILE_NAME));
    }

    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(Some(found.clone()));
    }

    if env(env_keys::DB_HOST).is_some() || env(env_keys::DB_PATH).is_some() {
        return Ok(None);
    }

    Err(ConfigError::NotFound {
        searched: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn apply_env_overrides<F>(db: &mut RawDatabase, env: &F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = env(env_keys::DB_DRIVER) {
        db.driver = Some(v);
    }
    if let Some(v) = env(env_keys::DB_HOST) {
        db.host = Some(v);
    }
    if let Some(v) = env(env_keys::DB_PORT) {
        let port = v
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::invalid("database.port", format!("无法解析端口 '{}'", v)))?;
        db.port = Some(port);
    }
    if let Some(v) = env(env_keys::DB_USER) {
        db.user = Some(v);
    }
    if let Some(v) = env(env_keys::DB_PASSWORD) {
        db.password = Some(v);
    }
    if let Some(v) = env(env_keys::DB_NAME) {
        db.database = Some(v);
    }
    if let Some(v) = env(env_keys::DB_PATH) {
        db.path = Some(v);
    }
    Ok(())
}

fn resolve_database(raw: RawDatabase) -> ConfigResult<DatabaseSettings> {
    // 未指定驱动时: 只给了 path 视为 sqlite，否则 mysql
    let driver = match raw.driver.as_deref().map(|d| d.trim().to_lowercase()) {
        Some(d) => d,
        None if raw.path.is_some() && raw.host.is_none() => "sqlite".to_string(),
        None => "mysql".to_string(),
    };

    match driver.as_str() {
        "mysql" | "mariadb" => {
            let host = required(raw.host, "database.host")?;
            let user = required(raw.user, "database.user")?;
            let password = raw
                .password
                .ok_or_else(|| ConfigError::MissingKey("database.password".to_string()))?;
            let port = match raw.port {
                None => DEFAULT_MYSQL_PORT,
                Some(p) => u16::try_from(p)
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| {
                        ConfigError::invalid("database.port", format!("端口超出范围: {}", p))
                    })?,
            };
            let database = optional_identifier(raw.database, "database.database")?;

            Ok(DatabaseSettings::MySql(ServerSettings {
                host,
                port,
                user,
                password,
                database,
            }))
        }
        "sqlite" => {
            let path = required(raw.path, "database.path")?;
            Ok(DatabaseSettings::Sqlite {
                path: PathBuf::from(path),
            })
        }
        other => Err(ConfigError::invalid(
            "database.driver",
            format!("不支持的驱动 '{}'（可选: mysql, sqlite）", other),
        )),
    }
}

fn resolve_pool(raw: RawPool) -> ConfigResult<PoolSettings> {
    let defaults = PoolSettings::default();

    let max_connections = raw.max_connections.unwrap_or(defaults.max_connections);
    if max_connections == 0 {
        return Err(ConfigError::invalid("pool.max_connections", "必须大于 0"));
    }

    let recycle_secs = raw.recycle_secs.unwrap_or(DEFAULT_POOL_RECYCLE_SECS);
    if recycle_secs == 0 {
        return Err(ConfigError::invalid("pool.recycle_secs", "必须大于 0"));
    }

    Ok(PoolSettings {
        recycle: Duration::from_secs(recycle_secs),
        pre_ping: raw.pre_ping.unwrap_or(defaults.pre_ping),
        max_connections,
        connect_timeout: raw
            .connect_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout),
    })
}

fn resolve_report(raw: RawReport) -> ConfigResult<ReportSettings> {
    let defaults = ReportSettings::default();

    let table = match raw.table {
        Some(t) => {
            let t = t.trim().to_string();
            if !is_valid_identifier(&t) {
                return Err(ConfigError::invalid("report.table", format!("非法表名 '{}'", t)));
            }
            t
        }
        None => defaults.table,
    };

    Ok(ReportSettings {
        schema: optional_identifier(raw.schema, "report.schema")?,
        table,
        output_dir: raw.output_dir.map(PathBuf::from).unwrap_or(defaults.output_dir),
    })
}

fn required(value: Option<String>, key: &str) -> ConfigResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn optional_identifier(value: Option<String>, key: &str) -> ConfigResult<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if is_valid_identifier(&v) => Ok(Some(v)),
        Some(v) => Err(ConfigError::invalid(key, format!("非法标识符 '{}'", v))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MYSQL_SECRETS: &str = r#"
        [database]
        host = "db.internal"
        port = 3307
        user = "report_ro"
        password = "s3cr3t"

        [report]
        schema = "brandix_production"
    "#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn parse(content: &str) -> ConfigResult<AppSettings> {
        AppSettings::from_toml_str(content, Path::new("secrets.toml"), no_env)
    }

    #[test]
    fn test_parse_mysql_settings() {
        let settings = parse(MYSQL_SECRETS).unwrap();

        match &settings.database {
            DatabaseSettings::MySql(s) => {
                assert_eq!(s.host, "db.internal");
                assert_eq!(s.port, 3307);
                assert_eq!(s.user, "report_ro");
                assert_eq!(s.password, "s3cr3t");
            }
            other => panic!("expected mysql, got {:?}", other),
        }
        assert_eq!(settings.pool, PoolSettings::default());
        assert_eq!(
            settings.report.qualified_table(),
            "brandix_production.aplrejection_wip"
        );
    }

    #[test]
    fn test_default_port() {
        let settings = parse(
            r#"
            [database]
            host = "h"
            user = "u"
            password = ""
            "#,
        )
        .unwrap();
        match settings.database {
            DatabaseSettings::MySql(s) => assert_eq!(s.port, DEFAULT_MYSQL_PORT),
            other => panic!("expected mysql, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_keys_are_reported() {
        let err = parse("[database]\nhost = \"h\"\npassword = \"p\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref k) if k == "database.user"));

        let err = parse("[database]\nhost = \"h\"\nuser = \"u\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref k) if k == "database.password"));
    }

    #[test]
    fn test_invalid_port() {
        let err = parse("[database]\nhost = \"h\"\nuser = \"u\"\npassword = \"p\"\nport = 70000\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "database.port"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse("[database\nhost=").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_driver() {
        let err = parse("[database]\ndriver = \"oracle\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "database.driver"));
    }

    #[test]
    fn test_sqlite_inferred_from_path() {
        let settings = parse("[database]\npath = \"/tmp/rej.db\"\n").unwrap();
        assert_eq!(
            settings.database,
            DatabaseSettings::Sqlite {
                path: PathBuf::from("/tmp/rej.db")
            }
        );
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            (env_keys::DB_HOST, "override.host"),
            (env_keys::DB_PORT, "3310"),
            (env_keys::DB_PASSWORD, "from-env"),
        ]
        .into_iter()
        .collect();

        let settings = AppSettings::from_toml_str(MYSQL_SECRETS, Path::new("secrets.toml"), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();

        match settings.database {
            DatabaseSettings::MySql(s) => {
                assert_eq!(s.host, "override.host");
                assert_eq!(s.port, 3310);
                assert_eq!(s.user, "report_ro");
                assert_eq!(s.password, "from-env");
            }
            other => panic!("expected mysql, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_env_port() {
        let err = AppSettings::from_toml_str(MYSQL_SECRETS, Path::new("secrets.toml"), |k| {
            (k == env_keys::DB_PORT).then(|| "abc".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_debug_output_redacts_credentials() {
        let settings = parse(MYSQL_SECRETS).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("report_ro"));
        assert!(debug.contains("db.internal"));
        assert!(!settings.database.describe().contains("s3cr3t"));
    }

    #[test]
    fn test_table_identifier_validation() {
        let err = parse(
            "[database]\npath = \"x.db\"\n[report]\ntable = \"t; DROP TABLE x\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "report.table"));
    }

    #[test]
    fn test_pool_settings() {
        let settings = parse(
            "[database]\npath = \"x.db\"\n[pool]\nrecycle_secs = 60\npre_ping = false\nmax_connections = 2\n",
        )
        .unwrap();
        assert_eq!(settings.pool.recycle, Duration::from_secs(60));
        assert!(!settings.pool.pre_ping);
        assert_eq!(settings.pool.max_connections, 2);

        let err = parse("[database]\npath = \"x.db\"\n[pool]\nmax_connections = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = AppSettings::load(Some(Path::new("/definitely/not/here/secrets.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}

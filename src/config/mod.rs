// ==========================================
// APL 不良品报表系统 - 配置层
// ==========================================
// 职责: 加载数据库连接、连接池与报表配置
// 存储: secrets.toml + 环境变量覆写
// ==========================================

pub mod error;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{
    env_keys, AppSettings, DatabaseSettings, PoolSettings, ReportSettings, ServerSettings,
};

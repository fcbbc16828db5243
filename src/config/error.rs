// ==========================================
// APL 不良品报表系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 错误信息中不得出现密码
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

/// 配置错误（启动期致命）
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("未找到密钥配置文件，已查找: {searched}")]
    NotFound { searched: String },

    #[error("读取配置文件失败 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 ({path}): {message}")]
    Parse { path: PathBuf, message: String },

    #[error("缺少配置项: {0}")]
    MissingKey(String),

    #[error("配置项取值无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

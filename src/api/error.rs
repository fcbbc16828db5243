// ==========================================
// APL 不良品报表系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为用户友好的错误消息
// 约束: user_message() 不暴露内部细节（SQL、主机、堆栈）
// ==========================================

use crate::config::ConfigError;
use crate::domain::{InvalidCriteria, UnknownFacility};
use crate::engine::EngineError;
use crate::export::ExportError;
use crate::store::StoreError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("数据库连接失败: {0}")]
    Connection(String),

    #[error("数据查询失败 ({operation}): {message}")]
    Query {
        operation: &'static str,
        message: String,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("导出失败: {0}")]
    Export(String),
}

impl ApiError {
    /// 面向用户的简短提示
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Configuration(_) => "配置文件缺失或有误，请检查数据库配置",
            ApiError::Connection(_) => "数据库连接失败",
            ApiError::Query { .. } => "数据查询失败，请稍后重试",
            ApiError::InvalidInput(_) => "筛选条件无效，请检查输入",
            ApiError::Export(_) => "导出文件生成失败",
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, ApiError::Connection(_))
    }
}

// ==========================================
// 从各层错误转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Configuration(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection { .. } | StoreError::Lock(_) => {
                ApiError::Connection(err.to_string())
            }
            StoreError::Unsupported(_) => ApiError::Configuration(err.to_string()),
            StoreError::Query(message) => ApiError::Query {
                operation: "query",
                message,
            },
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidCriteria(e) => ApiError::from(e),
            EngineError::Query { operation, source } => match source {
                StoreError::Query(message) => ApiError::Query { operation, message },
                other => ApiError::from(other),
            },
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Export(err.to_string())
    }
}

impl From<InvalidCriteria> for ApiError {
    fn from(err: InvalidCriteria) -> Self {
        ApiError::InvalidInput(err.0)
    }
}

impl From<UnknownFacility> for ApiError {
    fn from(err: UnknownFacility) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

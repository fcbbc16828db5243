// ==========================================
// APL 不良品报表系统 - 数据源错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 错误信息只含连接描述（主机/端口/库），不含用户名与密码
// ==========================================

use thiserror::Error;

/// 数据源错误
#[derive(Error, Debug)]
pub enum StoreError {
    /// 无法建立连接或存活探测失败（致命，终止本次流程）
    #[error("数据库连接失败 ({target_db}): {message}")]
    Connection { target_db: String, message: String },

    /// 连接已建立但语句执行失败
    #[error("数据库查询失败: {0}")]
    Query(String),

    #[error("数据库锁获取失败: {0}")]
    Lock(String),

    /// 所需驱动未编译进当前二进制
    #[error("不支持的数据库驱动: {0}")]
    Unsupported(String),
}

impl StoreError {
    pub fn connection(target_db: impl Into<String>, message: impl ToString) -> Self {
        StoreError::Connection {
            target_db: target_db.into(),
            message: message.to_string(),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection { .. })
    }
}

// 连接建立之后的 rusqlite 错误一律视为查询错误
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => StoreError::Query(msg),
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;

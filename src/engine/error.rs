// ==========================================
// APL 不良品报表系统 - 引擎层错误类型
// ==========================================

use crate::domain::criteria::InvalidCriteria;
use crate::store::StoreError;
use thiserror::Error;

/// 引擎层错误
///
/// 查询失败一律以错误返回（fail-stop），不以空结果集代替。
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    InvalidCriteria(#[from] InvalidCriteria),

    #[error("{operation} 执行失败: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    pub(crate) fn query(operation: &'static str, source: StoreError) -> Self {
        EngineError::Query { operation, source }
    }

    /// 底层是否为连接类错误
    pub fn is_connection(&self) -> bool {
        matches!(self, EngineError::Query { source, .. } if source.is_connection())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

// ==========================================
// APL 不良品报表系统 - 导出层错误类型
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 编码失败: {0}")]
    Csv(String),

    #[error("导出文件写入失败 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// 实现 From<csv::Error>
impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;

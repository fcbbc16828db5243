// ==========================================
// APL 不良品报表系统 - 导出层
// ==========================================
// 职责: 数据集 → CSV 字节（UTF-8，带表头，无索引列）
// ==========================================

pub mod csv_encoder;
pub mod error;

pub use csv_encoder::{ExportEncoder, ExportPayload, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
pub use error::{ExportError, ExportResult};

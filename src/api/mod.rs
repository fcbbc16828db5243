// ==========================================
// APL 不良品报表系统 - API 层
// ==========================================
// 职责: 对外提供报表接口，供命令行入口调用
// ==========================================

pub mod error;
pub mod report_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use report_api::ReportApi;

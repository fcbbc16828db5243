// ==========================================
// APL 不良品报表系统 - 核心库
// ==========================================
// 技术栈: Rust + MySQL/MariaDB (sqlx) + SQLite (rusqlite)
// 系统定位: 不良品明细筛选与 CSV 导出
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 密钥文件与环境变量
pub mod config;

// 数据源层 - 连接提供者
pub mod store;

// 查询层 - 参数化谓词
pub mod query;

// 记忆化缓存
pub mod cache;

// 引擎层 - 选项解析与数据加载
pub mod engine;

// 导出层 - CSV 编码
pub mod export;

// API 层 - 报表接口
pub mod api;

// 数据库基础设施（SQLite 连接初始化/PRAGMA 统一）
pub mod db;

// 性能统计
pub mod perf;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Dataset, FacetOptions, Facility, FilterCriteria, SqlValue};

// 配置
pub use config::AppSettings;

// 数据源
pub use store::{RejectionStore, StoreError};

// 查询
pub use query::{FilterExpressionBuilder, Predicate};

// 引擎
pub use engine::{DatasetLoader, FacetOptionResolver};

// 导出
pub use export::{ExportEncoder, ExportPayload};

// API
pub use api::{ApiError, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "APL 不良品报表系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

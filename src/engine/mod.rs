// ==========================================
// APL 不良品报表系统 - 引擎层
// ==========================================
// 职责: 二级筛选选项解析、明细数据加载
// 红线: 引擎只消费参数化谓词，不拼接用户输入
// ==========================================

pub mod dataset_loader;
pub mod error;
pub mod facet_resolver;

// 重导出核心引擎
pub use dataset_loader::DatasetLoader;
pub use error::{EngineError, EngineResult};
pub use facet_resolver::FacetOptionResolver;

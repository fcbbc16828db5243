// ==========================================
// APL 不良品报表系统 - 领域模型层
// ==========================================
// 职责: 定义工厂代码、筛选条件、结果集、筛选选项
// 红线: 不含数据访问逻辑
// ==========================================

pub mod criteria;
pub mod dataset;
pub mod facet;
pub mod facility;
pub mod schema;
pub mod value;

// 重导出核心类型
pub use criteria::{FilterCriteria, InvalidCriteria};
pub use dataset::Dataset;
pub use facet::FacetOptions;
pub use facility::{parse_facilities, Facility, UnknownFacility};
pub use value::SqlValue;

// ==========================================
// APL 不良品报表系统 - 查询构建层
// ==========================================
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod builder;
pub mod param;
pub mod predicate;
pub mod sql_builder;

pub use builder::FilterExpressionBuilder;
pub use param::SqlParam;
pub use predicate::{Clause, ClauseKind, Predicate};
pub use sql_builder::{BoundQuery, SqlQueryBuilder};

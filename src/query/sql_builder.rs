// ==========================================
// APL 不良品报表系统 - SQL 构建工具
// ==========================================
// 职责: 拼装 SELECT 语句骨架，值全部以 `?` 占位符绑定
// ==========================================

use crate::query::param::SqlParam;
use crate::query::predicate::{inline_params, Clause, Predicate};
use std::fmt;

/// 构建 IN 子句的 SQL 片段（调用方保证 values 非空）
pub(crate) fn build_in_clause<T>(column_name: &str, values: &[T]) -> String {
    debug_assert!(!values.is_empty());
    let placeholders = values.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    format!("{} IN ({})", column_name, placeholders)
}

// ==========================================
// BoundQuery - SQL 文本 + 绑定参数
// ==========================================
/// 完整的参数化查询
///
/// 文本与参数共同构成结果集缓存键: 文本相同、参数不同的查询互不命中。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundQuery {
    sql: String,
    params: Vec<SqlParam>,
}

impl BoundQuery {
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

/// 内联展示（仅用于日志）
impl fmt::Display for BoundQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&inline_params(&self.sql, &self.params))
    }
}

/// SQL 查询构建器（流式 API）
///
/// # 示例
/// ```
/// use apl_rejection_report::query::predicate::Clause;
/// use apl_rejection_report::query::sql_builder::SqlQueryBuilder;
///
/// let query = SqlQueryBuilder::new("SELECT * FROM aplrejection_wip aw")
///     .and_if(Clause::membership("Facility", ["AIP", "AIN"]))
///     .where_clause(Clause::not_equal("FLG", "99"))
///     .build();
///
/// assert_eq!(
///     query.sql(),
///     "SELECT * FROM aplrejection_wip aw WHERE Facility IN (?, ?) AND FLG <> ?"
/// );
/// assert_eq!(query.params().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    select_clause: String,
    where_clauses: Vec<Clause>,
}

impl SqlQueryBuilder {
    /// 创建新的 SQL 查询构建器
    pub fn new(select: &str) -> Self {
        Self {
            select_clause: select.to_string(),
            where_clauses: Vec::new(),
        }
    }

    /// 添加 WHERE 条件
    pub fn where_clause(mut self, clause: Clause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    /// 条件添加 AND 子句
    pub fn and_if(mut self, clause: Option<Clause>) -> Self {
        if let Some(c) = clause {
            self.where_clauses.push(c);
        }
        self
    }

    /// 追加整个谓词的全部子句
    pub fn where_predicate(mut self, predicate: &Predicate) -> Self {
        self.where_clauses.extend(predicate.clauses().iter().cloned());
        self
    }

    /// 构建最终的参数化查询
    pub fn build(&self) -> BoundQuery {
        let mut sql = self.select_clause.clone();
        let mut params = Vec::new();

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(
                &self
                    .where_clauses
                    .iter()
                    .map(Clause::sql)
                    .collect::<Vec<_>>()
                    .join(" AND "),
            );
            for clause in &self.where_clauses {
                params.extend(clause.params().iter().cloned());
            }
        }

        BoundQuery::new(sql, params)
    }
}

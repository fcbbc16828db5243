// ==========================================
// APL 不良品报表系统 - 查询谓词
// ==========================================
// 约束: 所有值走参数绑定，SQL 片段只含列名与 `?` 占位符
// ==========================================

use crate::query::param::SqlParam;
use crate::query::sql_builder::build_in_clause;
use chrono::NaiveDate;
use std::fmt;

/// 子句类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    /// `col BETWEEN ? AND ?`
    DateRange,
    /// `col IN (?, ...)`
    Membership,
    /// `col <> ?`
    Exclusion,
}

// ==========================================
// Clause - 单个布尔子句
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    kind: ClauseKind,
    column: &'static str,
    sql: String,
    params: Vec<SqlParam>,
}

impl Clause {
    /// 闭区间日期范围
    pub fn date_range(column: &'static str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            kind: ClauseKind::DateRange,
            column,
            sql: format!("{} BETWEEN ? AND ?", column),
            params: vec![SqlParam::Date(start), SqlParam::Date(end)],
        }
    }

    /// 成员子句；空选择返回 None（该维度不过滤）
    pub fn membership<I, V>(column: &'static str, values: I) -> Option<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlParam>,
    {
        let params: Vec<SqlParam> = values.into_iter().map(Into::into).collect();
        if params.is_empty() {
            return None;
        }
        Some(Self {
            kind: ClauseKind::Membership,
            column,
            sql: build_in_clause(column, &params),
            params,
        })
    }

    /// 不等于子句
    pub fn not_equal(column: &'static str, value: impl Into<SqlParam>) -> Self {
        Self {
            kind: ClauseKind::Exclusion,
            column,
            sql: format!("{} <> ?", column),
            params: vec![value.into()],
        }
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&inline_params(&self.sql, &self.params))
    }
}

// ==========================================
// Predicate - AND 连接的子句列表
// ==========================================
/// 查询谓词
///
/// 由 [`crate::query::FilterExpressionBuilder`] 生成，
/// 始终包含日期范围子句与产线组哨兵排除子句。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub(crate) fn from_clauses(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// WHERE 之后的 SQL 文本
    pub fn sql(&self) -> String {
        self.clauses
            .iter()
            .map(Clause::sql)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// 按占位符顺序展开的全部绑定参数
    pub fn params(&self) -> Vec<SqlParam> {
        self.clauses
            .iter()
            .flat_map(|c| c.params().iter().cloned())
            .collect()
    }

    /// 查找某列的成员子句
    pub fn membership_clause(&self, column: &str) -> Option<&Clause> {
        self.clauses
            .iter()
            .find(|c| c.kind == ClauseKind::Membership && c.column == column)
    }

    pub fn has_kind(&self, kind: ClauseKind) -> bool {
        self.clauses.iter().any(|c| c.kind == kind)
    }
}

/// 内联展示（仅用于日志，执行时一律绑定参数）
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.clauses.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(" AND "))
    }
}

/// 将 `?` 依次替换为参数的字面量形式
pub(crate) fn inline_params(sql: &str, params: &[SqlParam]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut params = params.iter();
    for ch in sql.chars() {
        if ch == '?' {
            match params.next() {
                Some(p) => out.push_str(&p.to_string()),
                None => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

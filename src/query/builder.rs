// ==========================================
// APL 不良品报表系统 - 筛选表达式构建器
// ==========================================
// 子句顺序: 日期范围 → Facility → SBU → FLG → Buyer → 哨兵排除
// 红线: 空选择不生成子句；日期范围与 FLG <> '99' 始终存在
// ==========================================

use crate::domain::criteria::{FilterCriteria, InvalidCriteria};
use crate::domain::schema::{
    BUYER_COLUMN, EXCLUDED_LINE_GROUP, FACILITY_COLUMN, FLG_COLUMN, SBU_COLUMN,
    TRANSACTION_DATE_COLUMN,
};
use crate::query::predicate::{Clause, Predicate};

/// 筛选表达式构建器
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterExpressionBuilder;

impl FilterExpressionBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 将筛选条件翻译为参数化谓词
    ///
    /// # 返回
    /// - Ok(Predicate): 至少包含日期范围子句与哨兵排除子句
    /// - Err(InvalidCriteria): 开始日期晚于结束日期
    pub fn build(&self, criteria: &FilterCriteria) -> Result<Predicate, InvalidCriteria> {
        criteria.validate()?;

        let mut clauses = vec![Clause::date_range(
            TRANSACTION_DATE_COLUMN,
            criteria.start_date,
            criteria.end_date,
        )];

        clauses.extend(Clause::membership(
            FACILITY_COLUMN,
            criteria.facilities.iter().map(|f| f.code()),
        ));
        clauses.extend(Clause::membership(
            SBU_COLUMN,
            criteria.business_units.iter().map(String::as_str),
        ));
        clauses.extend(Clause::membership(
            FLG_COLUMN,
            criteria.line_groups.iter().map(String::as_str),
        ));
        clauses.extend(Clause::membership(
            BUYER_COLUMN,
            criteria.buyers.iter().map(String::as_str),
        ));

        clauses.push(Clause::not_equal(FLG_COLUMN, EXCLUDED_LINE_GROUP));

        Ok(Predicate::from_clauses(clauses))
    }
}

// ==========================================
// APL 不良品报表系统 - 筛选条件
// ==========================================
// 生命周期: 每次界面输入变化时重建，不持久化
// ==========================================

use crate::domain::facility::Facility;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// 筛选条件校验失败
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("筛选条件无效: {0}")]
pub struct InvalidCriteria(pub String);

// ==========================================
// FilterCriteria - 用户筛选条件
// ==========================================
/// 用户筛选条件
///
/// 各维度使用有序集合: 选择顺序不影响生成的谓词，
/// 相同的选择必然得到相同的查询（缓存命中）。
/// 空集合表示该维度不过滤。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub facilities: BTreeSet<Facility>,
    pub business_units: BTreeSet<String>,
    pub line_groups: BTreeSet<String>,
    pub buyers: BTreeSet<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FilterCriteria {
    /// 只含日期范围的条件
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            facilities: BTreeSet::new(),
            business_units: BTreeSet::new(),
            line_groups: BTreeSet::new(),
            buyers: BTreeSet::new(),
            start_date,
            end_date,
        }
    }

    pub fn with_facilities(mut self, facilities: impl IntoIterator<Item = Facility>) -> Self {
        self.facilities = facilities.into_iter().collect();
        self
    }

    pub fn with_business_units<S: AsRef<str>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.business_units = collect_selection(values);
        self
    }

    pub fn with_line_groups<S: AsRef<str>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.line_groups = collect_selection(values);
        self
    }

    pub fn with_buyers<S: AsRef<str>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.buyers = collect_selection(values);
        self
    }

    /// 校验日期范围（start <= end）
    pub fn validate(&self) -> Result<(), InvalidCriteria> {
        if self.start_date > self.end_date {
            return Err(InvalidCriteria(format!(
                "开始日期 {} 晚于结束日期 {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

/// 选项值原样保留（含空串与首尾空白），只去重
///
/// 选项来自数据库，改写后可能不再匹配任何行。
fn collect_selection<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> BTreeSet<String> {
    values.into_iter().map(|v| v.as_ref().to_string()).collect()
}

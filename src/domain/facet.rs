// ==========================================
// APL 不良品报表系统 - 二级筛选选项
// ==========================================
// 派生数据: 随工厂选择变化重新计算，不落库
// ==========================================

use crate::domain::dataset::Dataset;
use crate::domain::schema::{BUYER_COLUMN, EXCLUDED_LINE_GROUP, FLG_COLUMN, SBU_COLUMN};
use serde::Serialize;
use std::collections::HashSet;

/// 二级筛选选项集合（SBU / FLG / Buyer）
///
/// 每个列表: 非空、去重、保持数据库返回的首次出现顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub business_units: Vec<String>,
    pub line_groups: Vec<String>,
    pub buyers: Vec<String>,
}

impl FacetOptions {
    /// 三个空列表（未选择工厂时）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.business_units.is_empty() && self.line_groups.is_empty() && self.buyers.is_empty()
    }

    /// 从 `SELECT DISTINCT SBU, FLG, Buyer` 的结果集提取选项
    ///
    /// 缺失的列视为没有可选值。
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            business_units: distinct_column(dataset, SBU_COLUMN),
            line_groups: distinct_column(dataset, FLG_COLUMN),
            buyers: distinct_column(dataset, BUYER_COLUMN),
        }
    }

    /// 表单中可供勾选的产线组（不含哨兵 '99'）
    pub fn selectable_line_groups(&self) -> Vec<&str> {
        self.line_groups
            .iter()
            .map(String::as_str)
            .filter(|flg| *flg != EXCLUDED_LINE_GROUP)
            .collect()
    }
}

fn distinct_column(dataset: &Dataset, column: &str) -> Vec<String> {
    let Some(values) = dataset.column_values(column) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    values
        .filter_map(|v| v.as_facet_value())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::SqlValue;

    fn row(sbu: Option<&str>, flg: Option<&str>, buyer: Option<&str>) -> Vec<SqlValue> {
        vec![sbu.into(), flg.into(), buyer.into()]
    }

    #[test]
    fn test_from_dataset_dedupes_and_drops_nulls() {
        let ds = Dataset::new(
            vec!["SBU".to_string(), "FLG".to_string(), "Buyer".to_string()],
            vec![
                row(Some("INT"), Some("10"), Some("M&S")),
                row(Some("INT"), Some("99"), None),
                row(None, Some("10"), Some("VS")),
                row(Some("BOT"), None, Some("M&S")),
            ],
        );

        let options = FacetOptions::from_dataset(&ds);
        assert_eq!(options.business_units, vec!["INT", "BOT"]);
        assert_eq!(options.line_groups, vec!["10", "99"]);
        assert_eq!(options.buyers, vec!["M&S", "VS"]);
        assert_eq!(options.selectable_line_groups(), vec!["10"]);
    }

    #[test]
    fn test_integer_line_groups_become_text() {
        let ds = Dataset::new(
            vec!["sbu".to_string(), "flg".to_string(), "buyer".to_string()],
            vec![vec![SqlValue::Null, SqlValue::Integer(12), SqlValue::Null]],
        );
        let options = FacetOptions::from_dataset(&ds);
        assert_eq!(options.line_groups, vec!["12"]);
        assert!(options.business_units.is_empty());
    }

    #[test]
    fn test_empty() {
        assert!(FacetOptions::empty().is_empty());
    }
}

// ==========================================
// APL 不良品报表系统 - 单元格值
// ==========================================

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 结果集单元格值
///
/// 与具体数据库驱动无关；日期时间类列由驱动层转换为文本。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// CSV 字段文本
    ///
    /// - NULL / NaN 输出空字段
    /// - 整数值的浮点保留 `.0`（与报表历史导出格式一致）
    pub fn to_csv_field(&self) -> Cow<'_, str> {
        match self {
            SqlValue::Null => Cow::Borrowed(""),
            SqlValue::Integer(v) => Cow::Owned(v.to_string()),
            SqlValue::Real(v) => Cow::Owned(format_real(*v)),
            SqlValue::Text(s) => Cow::Borrowed(s.as_str()),
            SqlValue::Blob(b) => String::from_utf8_lossy(b),
        }
    }

    /// 作为筛选选项的文本值（NULL 返回 None）
    pub fn as_facet_value(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Real(v) if v.is_nan() => None,
            other => Some(other.to_csv_field().into_owned()),
        }
    }
}

fn format_real(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

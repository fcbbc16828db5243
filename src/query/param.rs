// ==========================================
// APL 不良品报表系统 - 绑定参数
// ==========================================

use chrono::NaiveDate;
use std::fmt;

/// 绑定到 `?` 占位符的参数值
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlParam {
    Text(String),
    Date(NaiveDate),
}

impl SqlParam {
    /// 文本形式（SQLite 以 `YYYY-MM-DD` 文本存储日期）
    pub fn as_text(&self) -> String {
        match self {
            SqlParam::Text(s) => s.clone(),
            SqlParam::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// 以 SQL 字面量形式展示（单引号转义），仅用于日志
impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_text().replace('\'', "''"))
    }
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(s: String) -> Self {
        SqlParam::Text(s)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(d: NaiveDate) -> Self {
        SqlParam::Date(d)
    }
}

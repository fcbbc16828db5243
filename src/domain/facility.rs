// ==========================================
// APL 不良品报表系统 - 工厂代码
// ==========================================
// 闭集: AIP / AIN / A03 / S01
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ==========================================
// Facility - 工厂（顶层筛选维度）
// ==========================================
/// 工厂代码
///
/// 排序按声明顺序，`BTreeSet<Facility>` 因此与用户勾选顺序无关，
/// 可直接作为缓存键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Facility {
    #[serde(rename = "AIP")]
    Aip,
    #[serde(rename = "AIN")]
    Ain,
    #[serde(rename = "A03")]
    A03,
    #[serde(rename = "S01")]
    S01,
}

impl Facility {
    /// 全部可选工厂（表单固定选项）
    pub const ALL: [Facility; 4] = [Facility::Aip, Facility::Ain, Facility::A03, Facility::S01];

    /// 数据库中存储的代码
    pub fn code(&self) -> &'static str {
        match self {
            Facility::Aip => "AIP",
            Facility::Ain => "AIN",
            Facility::A03 => "A03",
            Facility::S01 => "S01",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 工厂代码解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的工厂代码: '{0}'（可选: AIP, AIN, A03, S01）")]
pub struct UnknownFacility(pub String);

impl FromStr for Facility {
    type Err = UnknownFacility;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AIP" => Ok(Facility::Aip),
            "AIN" => Ok(Facility::Ain),
            "A03" => Ok(Facility::A03),
            "S01" => Ok(Facility::S01),
            other => Err(UnknownFacility(other.to_string())),
        }
    }
}

/// 批量解析工厂代码，重复项自动合并
pub fn parse_facilities<I, S>(codes: I) -> Result<BTreeSet<Facility>, UnknownFacility>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|c| c.as_ref().parse::<Facility>())
        .collect()
}

// ==========================================
// APL 不良品报表系统 - 事实表结构约定
// ==========================================
// 事实表: aplrejection_wip
// 其余列原样透传到导出文件
// ==========================================

/// 默认事实表名
pub const DEFAULT_FACT_TABLE: &str = "aplrejection_wip";

/// 查询中事实表的别名
pub const FACT_TABLE_ALIAS: &str = "aw";

pub const FACILITY_COLUMN: &str = "Facility";
pub const SBU_COLUMN: &str = "SBU";
pub const FLG_COLUMN: &str = "FLG";
pub const BUYER_COLUMN: &str = "Buyer";
pub const TRANSACTION_DATE_COLUMN: &str = "transactionDate";

/// 始终排除的产线组哨兵值
pub const EXCLUDED_LINE_GROUP: &str = "99";

/// 校验配置中给出的标识符（表名/库名）
///
/// 标识符不能走参数绑定，只允许字母、数字、下划线，且不能以数字开头。
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ==========================================
// APL 不良品报表系统 - 查询结果集
// ==========================================
// 约束: 构造后不可变，内容指纹在构造时计算
// ==========================================

use crate::domain::value::SqlValue;
use sha2::{Digest, Sha256};

// ==========================================
// Dataset - 内存结果集
// ==========================================
/// 查询结果集（列名 + 行）
///
/// `fingerprint` 为列名与全部单元格的 SHA-256，
/// 内容相同的两个结果集指纹相同，用作导出缓存键。
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    fingerprint: String,
}

impl Dataset {
    /// 创建结果集
    ///
    /// 行宽不足的行以 NULL 补齐，超出的单元格截断，保证每行列数与表头一致。
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        let width = columns.len();
        let rows: Vec<Vec<SqlValue>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, SqlValue::Null);
                row
            })
            .collect();
        let fingerprint = compute_fingerprint(&columns, &rows);
        Self {
            columns,
            rows,
            fingerprint,
        }
    }

    /// 无数据行的结果集（保留列名）
    pub fn empty(columns: Vec<String>) -> Self {
        Self::new(columns, Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// 按列名查找列下标（忽略大小写，MySQL 列名默认不区分大小写）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// 取某一列的全部值
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &SqlValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

fn compute_fingerprint(columns: &[String], rows: &[Vec<SqlValue>]) -> String {
    let mut hasher = Sha256::new();

    hasher.update((columns.len() as u64).to_le_bytes());
    for col in columns {
        update_bytes(&mut hasher, col.as_bytes());
    }

    hasher.update((rows.len() as u64).to_le_bytes());
    for row in rows {
        for cell in row {
            match cell {
                SqlValue::Null => hasher.update([0u8]),
                SqlValue::Integer(v) => {
                    hasher.update([1u8]);
                    hasher.update(v.to_le_bytes());
                }
                SqlValue::Real(v) => {
                    hasher.update([2u8]);
                    hasher.update(v.to_bits().to_le_bytes());
                }
                SqlValue::Text(s) => {
                    hasher.update([3u8]);
                    update_bytes(&mut hasher, s.as_bytes());
                }
                SqlValue::Blob(b) => {
                    hasher.update([4u8]);
                    update_bytes(&mut hasher, b);
                }
            }
        }
    }

    format!("{:x}", hasher.finalize())
}

// 长度前缀，避免 ["ab","c"] 与 ["a","bc"] 碰撞
fn update_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

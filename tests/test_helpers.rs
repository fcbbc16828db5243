// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供临时 SQLite 事实表、固定测试数据与数据源构建
// ==========================================

#![allow(dead_code)]

use apl_rejection_report::config::PoolSettings;
use apl_rejection_report::db::{create_fact_table, open_sqlite_connection_rw};
use apl_rejection_report::domain::schema::DEFAULT_FACT_TABLE;
use apl_rejection_report::store::{RejectionStore, SqliteStore};
use rusqlite::{params, Connection};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 一条测试明细
#[derive(Debug, Clone)]
pub struct RejectionRow {
    pub facility: &'static str,
    pub sbu: Option<&'static str>,
    pub flg: Option<&'static str>,
    pub buyer: Option<&'static str>,
    pub qty: i64,
    pub date: &'static str,
}

impl RejectionRow {
    pub fn new(
        facility: &'static str,
        sbu: &'static str,
        flg: &'static str,
        buyer: &'static str,
        date: &'static str,
    ) -> Self {
        Self {
            facility,
            sbu: Some(sbu),
            flg: Some(flg),
            buyer: Some(buyer),
            qty: 1,
            date,
        }
    }
}

/// 固定测试数据
///
/// AIP 2024-01 非 99 线组共 3 行；另含 99 线组、其他月份、其他工厂与空值行。
pub fn fixture_rows() -> Vec<RejectionRow> {
    vec![
        RejectionRow::new("AIP", "INTIMATES", "10", "Acme", "2024-01-03"),
        RejectionRow::new("AIP", "ACTIVE", "20", "Northwind", "2024-01-15"),
        RejectionRow::new("AIP", "INTIMATES", "10", "O'Brien & Co", "2024-01-31"),
        RejectionRow::new("AIP", "INTIMATES", "99", "Acme", "2024-01-10"),
        RejectionRow::new("AIP", "ACTIVE", "20", "Acme", "2024-02-01"),
        RejectionRow::new("AIN", "SLEEP", "30", "Contoso", "2024-01-05"),
        RejectionRow::new("A03", "SLEEP", "40", "Contoso", "2024-01-20"),
        RejectionRow {
            facility: "S01",
            sbu: None,
            flg: Some("10"),
            buyer: None,
            qty: 4,
            date: "2024-01-07",
        },
    ]
}

/// 创建临时测试数据库并写入固定测试数据
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - PathBuf: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, PathBuf), Box<dyn Error>> {
    create_test_db_with(&fixture_rows())
}

pub fn create_test_db_with(rows: &[RejectionRow]) -> Result<(NamedTempFile, PathBuf), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_path_buf();

    let conn = open_sqlite_connection_rw(&db_path)?;
    create_fact_table(&conn, DEFAULT_FACT_TABLE)?;
    insert_rows(&conn, rows)?;

    Ok((temp_file, db_path))
}

/// 创建不含事实表的空库
pub fn create_empty_db() -> Result<(NamedTempFile, PathBuf), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_path_buf();
    open_sqlite_connection_rw(&db_path)?.execute_batch("CREATE TABLE unrelated (a TEXT);")?;
    Ok((temp_file, db_path))
}

pub fn insert_rows(conn: &Connection, rows: &[RejectionRow]) -> Result<(), Box<dyn Error>> {
    let sql = format!(
        "INSERT INTO {} (Facility, SBU, FLG, Buyer, RejectedQty, transactionDate) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        DEFAULT_FACT_TABLE
    );
    for row in rows {
        conn.execute(
            &sql,
            params![row.facility, row.sbu, row.flg, row.buyer, row.qty, row.date],
        )?;
    }
    Ok(())
}

/// 打开只读数据源
pub fn open_test_store(db_path: &PathBuf) -> Result<Arc<dyn RejectionStore>, Box<dyn Error>> {
    Ok(Arc::new(SqliteStore::open(db_path.clone(), PoolSettings::default())?))
}

/// 指向 SQLite 测试库的密钥文件内容
pub fn sqlite_secrets(db_path: &PathBuf) -> String {
    format!(
        "[database]\ndriver = \"sqlite\"\npath = {:?}\n\n[pool]\nrecycle_secs = 60\n",
        db_path.display().to_string()
    )
}

// ==========================================
// APL 不良品报表系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 报表连接一律只读，并统一 busy_timeout
// - 演示库/测试库的写入连接单独打开
// ==========================================

use crate::domain::schema::is_valid_identifier;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - busy_timeout 需要“每个连接”单独配置
/// - query_only 保证报表连接不会产生任何写入
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    Ok(())
}

/// 以只读方式打开 SQLite 报表库
///
/// 文件不存在时直接失败（不会静默创建空库）。
pub fn open_sqlite_connection(db_path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
    )?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开可写连接（仅供演示数据生成与测试使用）
pub fn open_sqlite_connection_rw(db_path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(conn)
}

/// 检查表是否存在
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// 创建不良品事实表（演示库/测试库）
///
/// 列顺序即导出 CSV 的列顺序。
pub fn create_fact_table(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    if !is_valid_identifier(table) {
        return Err(rusqlite::Error::InvalidParameterName(table.to_string()));
    }
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY,
            Facility TEXT NOT NULL,
            SBU TEXT,
            FLG TEXT,
            Buyer TEXT,
            Style TEXT,
            Schedule TEXT,
            Color TEXT,
            Size TEXT,
            Operation TEXT,
            RejectionReason TEXT,
            RejectedQty INTEGER,
            RejectionValue REAL,
            transactionDate TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_facility_date
            ON {table} (Facility, transactionDate);
        "#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_only_connection_rejects_writes() {
        let file = NamedTempFile::new().unwrap();
        {
            let rw = open_sqlite_connection_rw(file.path()).unwrap();
            rw.execute_batch("CREATE TABLE t (a TEXT);").unwrap();
            assert!(table_exists(&rw, "t").unwrap());
        }

        let ro = open_sqlite_connection(file.path()).unwrap();
        assert!(ro.execute("INSERT INTO t (a) VALUES ('x')", []).is_err());
        assert!(!table_exists(&ro, "missing").unwrap());
    }

    #[test]
    fn test_create_fact_table() {
        let file = NamedTempFile::new().unwrap();
        let conn = open_sqlite_connection_rw(file.path()).unwrap();
        create_fact_table(&conn, "aplrejection_wip").unwrap();
        create_fact_table(&conn, "aplrejection_wip").unwrap();
        assert!(table_exists(&conn, "aplrejection_wip").unwrap());
        assert!(create_fact_table(&conn, "x; DROP TABLE t").is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(open_sqlite_connection(Path::new("/definitely/not/here.db")).is_err());
    }
}

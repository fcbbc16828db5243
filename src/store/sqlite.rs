// ==========================================
// APL 不良品报表系统 - SQLite 数据源
// ==========================================
// 连接池: 单连接槽位 + 定期回收 + 取用前探测
// 用途: 测试、演示、离线抽取文件
// ==========================================

use crate::config::PoolSettings;
use crate::db::open_sqlite_connection;
use crate::domain::{Dataset, SqlValue};
use crate::perf::record_statement;
use crate::query::{BoundQuery, SqlParam};
use crate::store::error::{StoreError, StoreResult};
use crate::store::RejectionStore;
use rusqlite::types::{Value, ValueRef};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

struct PooledConnection {
    conn: Connection,
    opened_at: Instant,
}

// ==========================================
// SqliteStore - 只读 SQLite 数据源
// ==========================================
pub struct SqliteStore {
    path: PathBuf,
    pool: PoolSettings,
    slot: Mutex<PooledConnection>,
}

impl SqliteStore {
    /// 打开只读 SQLite 数据源
    ///
    /// # 返回
    /// - Ok(SqliteStore)
    /// - Err(StoreError::Connection): 文件不存在或无法打开
    pub fn open(path: impl Into<PathBuf>, pool: PoolSettings) -> StoreResult<Self> {
        let path = path.into();
        let pooled = Self::open_pooled(&path)?;
        Ok(Self {
            path,
            pool,
            slot: Mutex::new(pooled),
        })
    }

    fn target_db(path: &Path) -> String {
        format!("sqlite://{}", path.display())
    }

    fn open_pooled(path: &Path) -> StoreResult<PooledConnection> {
        let conn = open_sqlite_connection(path)
            .map_err(|e| StoreError::connection(Self::target_db(path), e))?;
        Ok(PooledConnection {
            conn,
            opened_at: Instant::now(),
        })
    }

    /// 取用连接
    ///
    /// - 存活超过回收周期: 重新打开
    /// - 开启 pre_ping 且探测失败: 重新打开一次，仍失败则返回连接错误
    fn checkout(&self) -> StoreResult<MutexGuard<'_, PooledConnection>> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        if slot.opened_at.elapsed() >= self.pool.recycle {
            tracing::debug!(path = %self.path.display(), "SQLite 连接达到回收周期，重新打开");
            *slot = Self::open_pooled(&self.path)?;
        }

        if self.pool.pre_ping {
            if let Err(e) = probe(&slot.conn) {
                tracing::warn!(path = %self.path.display(), error = %e, "SQLite 存活探测失败，重新打开");
                *slot = Self::open_pooled(&self.path)?;
                probe(&slot.conn)
                    .map_err(|e| StoreError::connection(Self::target_db(&self.path), e))?;
            }
        }

        Ok(slot)
    }
}

fn probe(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT 1", [], |row| row.get(0))
}

fn to_sqlite_value(param: &SqlParam) -> Value {
    Value::Text(param.as_text())
}

fn from_value_ref(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}

impl RejectionStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn ping(&self) -> StoreResult<()> {
        let slot = self.checkout()?;
        probe(&slot.conn).map_err(|e| StoreError::connection(Self::target_db(&self.path), e))?;
        Ok(())
    }

    fn fetch(&self, query: &BoundQuery) -> StoreResult<Dataset> {
        let slot = self.checkout()?;
        let started = Instant::now();

        let mut stmt = slot.conn.prepare(query.sql())?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let values: Vec<Value> = query.params().iter().map(to_sqlite_value).collect();
        let mut rows = stmt.query(rusqlite::params_from_iter(values.iter()))?;

        let mut data = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(from_value_ref(row.get_ref(idx)?));
            }
            data.push(cells);
        }

        record_statement("sqlite", query.sql(), started.elapsed());
        Ok(Dataset::new(columns, data))
    }
}

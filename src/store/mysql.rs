// ==========================================
// APL 不良品报表系统 - MySQL / MariaDB 数据源
// ==========================================
// 驱动: sqlx 连接池（max_lifetime = 回收周期，test_before_acquire = 取用前探测）
// 运行时: 自带单线程 tokio 运行时，对外提供同步接口
// 约束: 不得在其他异步运行时内部调用（block_on 会 panic）
// ==========================================

use crate::config::{PoolSettings, ServerSettings};
use crate::domain::{Dataset, SqlValue};
use crate::perf::record_statement;
use crate::query::{BoundQuery, SqlParam};
use crate::store::error::{StoreError, StoreResult};
use crate::store::RejectionStore;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Executor, Row, Statement, ValueRef};
use std::time::Instant;
use tokio::runtime::Runtime;

// ==========================================
// MySqlStore
// ==========================================
// 字段顺序: pool 必须先于 runtime 释放
pub struct MySqlStore {
    pool: MySqlPool,
    runtime: Runtime,
    target_db: String,
}

impl MySqlStore {
    /// 建立连接池（立即建连，失败即返回连接错误）
    pub fn connect(server: &ServerSettings, pool: &PoolSettings) -> StoreResult<Self> {
        let target_db = match &server.database {
            Some(db) => format!("mysql://{}:{}/{}", server.host, server.port, db),
            None => format!("mysql://{}:{}", server.host, server.port),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::connection(target_db.clone(), e))?;

        let mut options = MySqlConnectOptions::new()
            .host(&server.host)
            .port(server.port)
            .username(&server.user)
            .password(&server.password);
        if let Some(db) = &server.database {
            options = options.database(db);
        }

        let pool = runtime
            .block_on(
                MySqlPoolOptions::new()
                    .max_connections(pool.max_connections)
                    .max_lifetime(pool.recycle)
                    .test_before_acquire(pool.pre_ping)
                    .acquire_timeout(pool.connect_timeout)
                    .connect_with(options),
            )
            .map_err(|e| StoreError::connection(target_db.clone(), e))?;

        Ok(Self {
            pool,
            runtime,
            target_db,
        })
    }
}

impl Drop for MySqlStore {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

fn query_error(err: sqlx::Error) -> StoreError {
    StoreError::Query(err.to_string())
}

/// 单元格解码
///
/// 依次尝试整数、浮点、日期时间、文本；DECIMAL 等以文本传输的类型走未校验文本解码，
/// 最后退化为字节串。
fn decode_cell(row: &MySqlRow, idx: usize) -> SqlValue {
    match row.try_get_raw(idx) {
        Ok(raw) if !raw.is_null() => {}
        _ => return SqlValue::Null,
    }

    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return SqlValue::Integer(v);
    }
    if let Ok(v) = row.try_get::<u64, _>(idx) {
        return match i64::try_from(v) {
            Ok(i) => SqlValue::Integer(i),
            Err(_) => SqlValue::Text(v.to_string()),
        };
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return SqlValue::Real(v);
    }
    if let Ok(v) = row.try_get::<f32, _>(idx) {
        return SqlValue::Real(f64::from(v));
    }
    if let Ok(v) = row.try_get::<NaiveDateTime, _>(idx) {
        return SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(v) = row.try_get::<NaiveDate, _>(idx) {
        return SqlValue::Text(v.format("%Y-%m-%d").to_string());
    }
    if let Ok(v) = row.try_get::<NaiveTime, _>(idx) {
        return SqlValue::Text(v.format("%H:%M:%S").to_string());
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return SqlValue::Text(v);
    }
    if let Ok(v) = row.try_get_unchecked::<String, _>(idx) {
        return SqlValue::Text(v);
    }
    match row.try_get_unchecked::<Vec<u8>, _>(idx) {
        Ok(bytes) => SqlValue::Blob(bytes),
        Err(_) => SqlValue::Null,
    }
}

impl RejectionStore for MySqlStore {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    fn ping(&self) -> StoreResult<()> {
        self.runtime
            .block_on(sqlx::query("SELECT 1").execute(&self.pool))
            .map_err(|e| StoreError::connection(self.target_db.clone(), e))?;
        Ok(())
    }

    fn fetch(&self, query: &BoundQuery) -> StoreResult<Dataset> {
        let started = Instant::now();

        let dataset = self.runtime.block_on(async {
            let mut q = sqlx::query(query.sql());
            for param in query.params() {
                q = match param {
                    SqlParam::Text(s) => q.bind(s.clone()),
                    SqlParam::Date(d) => q.bind(*d),
                };
            }

            let rows = q.fetch_all(&self.pool).await.map_err(query_error)?;

            // 空结果集从预编译语句取列名，保证导出文件仍有表头
            let columns: Vec<String> = match rows.first() {
                Some(first) => first.columns().iter().map(|c| c.name().to_string()).collect(),
                None => {
                    let stmt = self.pool.prepare(query.sql()).await.map_err(query_error)?;
                    stmt.columns().iter().map(|c| c.name().to_string()).collect()
                }
            };

            let data: Vec<Vec<SqlValue>> = rows
                .iter()
                .map(|row| (0..columns.len()).map(|idx| decode_cell(row, idx)).collect())
                .collect();

            Ok::<_, StoreError>(Dataset::new(columns, data))
        })?;

        record_statement("mysql", query.sql(), started.elapsed());
        Ok(dataset)
    }
}

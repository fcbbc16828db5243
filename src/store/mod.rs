// ==========================================
// APL 不良品报表系统 - 数据源层（连接提供者）
// ==========================================
// 职责: 建立连接池、存活探测、执行参数化查询
// 红线: 数据源句柄显式传递，不使用进程级全局连接
// ==========================================

pub mod error;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
#[cfg(feature = "mysql")]
pub use mysql::MySqlStore;
pub use sqlite::SqliteStore;

use crate::config::{AppSettings, DatabaseSettings};
use crate::domain::Dataset;
use crate::query::BoundQuery;
use std::sync::Arc;

/// 只读数据源
///
/// 实现需保证 `Send + Sync`: 同一句柄可被多个会话并发使用。
pub trait RejectionStore: Send + Sync {
    /// 驱动名称（用于日志）
    fn backend(&self) -> &'static str;

    /// 存活探测（`SELECT 1`）
    fn ping(&self) -> StoreResult<()>;

    /// 执行参数化查询并物化结果集
    fn fetch(&self, query: &BoundQuery) -> StoreResult<Dataset>;
}

/// 按配置建立数据源并做一次存活探测
///
/// # 返回
/// - Ok(Arc<dyn RejectionStore>): 已通过探测的数据源
/// - Err(StoreError::Connection): 不可达或探测失败（调用方应终止流程）
pub fn connect(settings: &AppSettings) -> StoreResult<Arc<dyn RejectionStore>> {
    let target_db = settings.database.describe();
    tracing::info!(target_db = %target_db, "正在连接数据库");

    let store: Arc<dyn RejectionStore> = match open_store(settings) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(target_db = %target_db, error = %e, "数据库连接失败");
            return Err(e);
        }
    };

    if let Err(e) = store.ping() {
        tracing::error!(target_db = %target_db, error = %e, "数据库存活探测失败");
        return Err(match e {
            StoreError::Connection { .. } => e,
            other => StoreError::connection(target_db, other),
        });
    }

    tracing::info!(target_db = %target_db, backend = store.backend(), "数据库连接成功");
    Ok(store)
}

fn open_store(settings: &AppSettings) -> StoreResult<Arc<dyn RejectionStore>> {
    match &settings.database {
        DatabaseSettings::Sqlite { path } => {
            Ok(Arc::new(SqliteStore::open(path.clone(), settings.pool.clone())?))
        }
        #[cfg(feature = "mysql")]
        DatabaseSettings::MySql(server) => Ok(Arc::new(MySqlStore::connect(server, &settings.pool)?)),
        #[cfg(not(feature = "mysql"))]
        DatabaseSettings::MySql(_) => Err(StoreError::Unsupported(
            "mysql（编译时未启用 mysql 特性）".to_string(),
        )),
    }
}

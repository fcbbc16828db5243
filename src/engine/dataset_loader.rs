// ==========================================
// APL 不良品报表系统 - 明细数据加载器
// ==========================================
// 查询: SELECT * FROM <table> aw WHERE <predicate>
// 红线: 查询失败必须以错误返回，不得以空表代替
// 缓存: 以 (SQL 文本 + 绑定参数) 为键，失败结果不缓存
// ==========================================

use crate::cache::{CacheStats, MemoCache};
use crate::domain::schema::FACT_TABLE_ALIAS;
use crate::domain::Dataset;
use crate::engine::error::{EngineError, EngineResult};
use crate::perf::PerfGuard;
use crate::query::{BoundQuery, Predicate, SqlQueryBuilder};
use crate::store::RejectionStore;
use std::sync::Arc;
use tracing::instrument;

const OPERATION: &str = "load_data";

pub struct DatasetLoader {
    store: Arc<dyn RejectionStore>,
    table: String,
    cache: MemoCache<BoundQuery, Dataset>,
}

impl DatasetLoader {
    pub fn new(store: Arc<dyn RejectionStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            cache: MemoCache::new(OPERATION),
        }
    }

    /// 组装完整查询
    pub fn compose(&self, predicate: &Predicate) -> BoundQuery {
        let select = format!("SELECT * FROM {} {}", self.table, FACT_TABLE_ALIAS);
        SqlQueryBuilder::new(&select)
            .where_predicate(predicate)
            .build()
    }

    /// 加载明细数据
    ///
    /// # 返回
    /// - Ok(Dataset): 可能为 0 行，但列头完整
    /// - Err(EngineError::Query): 表不存在 / 语法错误 / 连接中断
    #[instrument(skip(self, predicate), fields(clauses = predicate.clauses().len()))]
    pub fn load(&self, predicate: &Predicate) -> EngineResult<Arc<Dataset>> {
        let _perf = PerfGuard::new(OPERATION);
        let query = self.compose(predicate);
        tracing::debug!(query = %query, "加载明细数据");

        let dataset = self.cache.get_or_try_insert_with(query.clone(), || {
            self.store.fetch(&query).map_err(|e| {
                tracing::error!(operation = OPERATION, error = %e, "加载明细数据失败");
                EngineError::query(OPERATION, e)
            })
        })?;

        tracing::info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "明细数据已加载"
        );
        Ok(dataset)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

// ==========================================
// APL 不良品报表系统 - 二级筛选选项解析器
// ==========================================
// 输入: 已选工厂集合
// 输出: 该工厂范围内去重的 SBU / FLG / Buyer
// 红线: 未选工厂 → 三个空列表（不是"全部选项"）
// 缓存: 以工厂集合为键，不同集合互不命中
// ==========================================

use crate::cache::{CacheStats, MemoCache};
use crate::domain::schema::{BUYER_COLUMN, FACILITY_COLUMN, FLG_COLUMN, SBU_COLUMN};
use crate::domain::{FacetOptions, Facility};
use crate::engine::error::{EngineError, EngineResult};
use crate::query::{BoundQuery, Clause, SqlQueryBuilder};
use crate::store::RejectionStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

const OPERATION: &str = "fetch_filtered_options";

// ==========================================
// FacetOptionResolver
// ==========================================
pub struct FacetOptionResolver {
    store: Arc<dyn RejectionStore>,
    table: String,
    cache: MemoCache<BTreeSet<Facility>, FacetOptions>,
}

impl FacetOptionResolver {
    /// # 参数
    /// - store: 数据源
    /// - table: 限定后的事实表名
    pub fn new(store: Arc<dyn RejectionStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            cache: MemoCache::new(OPERATION),
        }
    }

    /// 选项查询: `SELECT DISTINCT SBU, FLG, Buyer FROM <table> WHERE Facility IN (...)`
    pub fn options_query(&self, selected: &BTreeSet<Facility>) -> BoundQuery {
        let select = format!(
            "SELECT DISTINCT {}, {}, {} FROM {}",
            SBU_COLUMN, FLG_COLUMN, BUYER_COLUMN, self.table
        );
        SqlQueryBuilder::new(&select)
            .and_if(Clause::membership(
                FACILITY_COLUMN,
                selected.iter().map(|f| f.code()),
            ))
            .build()
    }

    /// 解析选项
    ///
    /// # 返回
    /// - Ok(FacetOptions): 未选工厂时为空选项，且不访问数据库
    /// - Err(EngineError::Query): 数据库查询失败
    #[instrument(skip(self), fields(facilities = selected.len()))]
    pub fn resolve(&self, selected: &BTreeSet<Facility>) -> EngineResult<Arc<FacetOptions>> {
        if selected.is_empty() {
            return Ok(Arc::new(FacetOptions::empty()));
        }

        self.cache.get_or_try_insert_with(selected.clone(), || {
            let query = self.options_query(selected);
            let dataset = self.store.fetch(&query).map_err(|e| {
                tracing::error!(operation = OPERATION, error = %e, "获取筛选选项失败");
                EngineError::query(OPERATION, e)
            })?;

            let options = FacetOptions::from_dataset(&dataset);
            tracing::info!(
                sbu = options.business_units.len(),
                flg = options.line_groups.len(),
                buyers = options.buyers.len(),
                "筛选选项已加载"
            );
            Ok(options)
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, SqlValue};
    use crate::store::{StoreError, StoreResult};
    use std::sync::Mutex;

    /// 记录查询并返回固定结果的数据源
    struct RecordingStore {
        queries: Mutex<Vec<BoundQuery>>,
        fail: bool,
    }

    impl RecordingStore {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                queries: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn call_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    impl RejectionStore for RecordingStore {
        fn backend(&self) -> &'static str {
            "recording"
        }

        fn ping(&self) -> StoreResult<()> {
            Ok(())
        }

        fn fetch(&self, query: &BoundQuery) -> StoreResult<Dataset> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(StoreError::Query("table missing".to_string()));
            }
            // 以绑定的工厂代码作为 SBU，便于区分不同集合的结果
            let rows = query
                .params()
                .iter()
                .map(|p| vec![SqlValue::from(p.as_text()), SqlValue::from("10"), SqlValue::Null])
                .collect();
            Ok(Dataset::new(
                vec!["SBU".to_string(), "FLG".to_string(), "Buyer".to_string()],
                rows,
            ))
        }
    }

    fn set(fs: &[Facility]) -> BTreeSet<Facility> {
        fs.iter().copied().collect()
    }

    #[test]
    fn test_empty_selection_returns_empty_without_query() {
        let store = RecordingStore::new(false);
        let resolver = FacetOptionResolver::new(store.clone(), "aplrejection_wip");

        let options = resolver.resolve(&BTreeSet::new()).unwrap();
        assert!(options.is_empty());
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn test_options_query_is_parameterized() {
        let resolver = FacetOptionResolver::new(RecordingStore::new(false), "aplrejection_wip");
        let q = resolver.options_query(&set(&[Facility::Ain, Facility::Aip]));
        assert_eq!(
            q.sql(),
            "SELECT DISTINCT SBU, FLG, Buyer FROM aplrejection_wip WHERE Facility IN (?, ?)"
        );
        assert_eq!(q.params().len(), 2);
    }

    #[test]
    fn test_same_set_hits_cache() {
        let store = RecordingStore::new(false);
        let resolver = FacetOptionResolver::new(store.clone(), "aplrejection_wip");

        let a = resolver.resolve(&set(&[Facility::Aip, Facility::S01])).unwrap();
        let b = resolver.resolve(&set(&[Facility::S01, Facility::Aip])).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.call_count(), 1);
        assert_eq!(resolver.cache_stats().hits, 1);
    }

    #[test]
    fn test_different_sets_resolved_independently() {
        let store = RecordingStore::new(false);
        let resolver = FacetOptionResolver::new(store.clone(), "aplrejection_wip");

        let aip = resolver.resolve(&set(&[Facility::Aip])).unwrap();
        let ain = resolver.resolve(&set(&[Facility::Ain])).unwrap();

        assert_eq!(aip.business_units, vec!["AIP"]);
        assert_eq!(ain.business_units, vec!["AIN"]);
        assert_eq!(store.call_count(), 2);
    }

    #[test]
    fn test_query_failure_is_surfaced_and_not_cached() {
        let store = RecordingStore::new(true);
        let resolver = FacetOptionResolver::new(store.clone(), "aplrejection_wip");

        let err = resolver.resolve(&set(&[Facility::Aip])).unwrap_err();
        assert!(matches!(err, EngineError::Query { operation: OPERATION, .. }));

        assert!(resolver.resolve(&set(&[Facility::Aip])).is_err());
        assert_eq!(store.call_count(), 2);
    }
}

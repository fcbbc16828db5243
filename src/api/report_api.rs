// ==========================================
// APL 不良品报表系统 - 报表 API
// ==========================================
// 流程: 选项解析 → 谓词构建 → 数据加载 → CSV 编码
// 红线: 每次运行同步顺序执行，任一步失败即终止并返回类型化错误
// ==========================================

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info_span;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::cache::CacheStats;
use crate::config::ReportSettings;
use crate::domain::{Dataset, FacetOptions, Facility, FilterCriteria};
use crate::engine::{DatasetLoader, FacetOptionResolver};
use crate::export::{ExportEncoder, ExportPayload};
use crate::query::{FilterExpressionBuilder, Predicate};
use crate::store::RejectionStore;

// ==========================================
// ReportApi - 报表 API
// ==========================================

/// 报表API
///
/// 职责：
/// 1. 按工厂解析二级筛选选项
/// 2. 将筛选条件转换为参数化谓词
/// 3. 加载明细并导出 CSV
pub struct ReportApi {
    store: Arc<dyn RejectionStore>,
    resolver: FacetOptionResolver,
    builder: FilterExpressionBuilder,
    loader: DatasetLoader,
    encoder: ExportEncoder,
}

impl ReportApi {
    /// # 参数
    /// - store: 已通过存活探测的数据源
    /// - settings: 报表配置（事实表名）
    pub fn new(store: Arc<dyn RejectionStore>, settings: &ReportSettings) -> Self {
        let table = settings.qualified_table();
        Self {
            resolver: FacetOptionResolver::new(Arc::clone(&store), table.clone()),
            builder: FilterExpressionBuilder::new(),
            loader: DatasetLoader::new(Arc::clone(&store), table),
            encoder: ExportEncoder::new(),
            store,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// 存活探测
    pub fn ping(&self) -> ApiResult<()> {
        self.store.ping()?;
        Ok(())
    }

    /// 获取二级筛选选项（未选工厂时返回空选项）
    pub fn facet_options(&self, facilities: &BTreeSet<Facility>) -> ApiResult<Arc<FacetOptions>> {
        Ok(self.resolver.resolve(facilities)?)
    }

    pub fn build_predicate(&self, criteria: &FilterCriteria) -> ApiResult<Predicate> {
        Ok(self.builder.build(criteria)?)
    }

    /// 按筛选条件加载明细
    pub fn load(&self, criteria: &FilterCriteria) -> ApiResult<Arc<Dataset>> {
        let predicate = self.build_predicate(criteria)?;
        tracing::info!(predicate = %predicate, "筛选条件");
        Ok(self.loader.load(&predicate)?)
    }

    /// 完整导出流程
    ///
    /// # 返回
    /// - Ok(ExportPayload): CSV 字节，row_count 等于匹配行数
    /// - Err(ApiError): 输入无效 / 连接失败 / 查询失败 / 编码失败
    pub fn export(&self, criteria: &FilterCriteria) -> ApiResult<Arc<ExportPayload>> {
        let run_id = Uuid::new_v4();
        let span = info_span!("export", run_id = %run_id);
        let _enter = span.enter();

        let result = self
            .load(criteria)
            .and_then(|dataset| Ok(self.encoder.encode(&dataset)?));

        match &result {
            Ok(payload) => tracing::info!(rows = payload.row_count, "导出完成"),
            Err(e) => tracing::warn!(error = %e, "导出终止"),
        }
        result
    }

    /// 各缓存统计
    pub fn cache_stats(&self) -> Vec<CacheStats> {
        vec![
            self.resolver.cache_stats(),
            self.loader.cache_stats(),
            self.encoder.cache_stats(),
        ]
    }

    /// 清空全部缓存（选项、数据集、CSV），下次请求重新查询
    pub fn clear_caches(&self) {
        self.resolver.clear_cache();
        self.loader.clear_cache();
        self.encoder.clear_cache();
    }
}

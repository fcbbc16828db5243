// ==========================================
// APL 不良品报表系统 - CSV 导出编码器
// ==========================================
// 格式: UTF-8，`,` 分隔，`\n` 换行，仅在需要时加引号，首行为列名
// 缓存: 以数据集指纹为键，同一数据集重复导出直接复用字节
// ==========================================

use crate::cache::{CacheStats, MemoCache};
use crate::domain::Dataset;
use crate::export::error::{ExportError, ExportResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv";

const OPERATION: &str = "convert_df_to_csv";

/// 导出结果（供下载）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub row_count: usize,
}

impl ExportPayload {
    /// 写入目录，返回文件完整路径
    pub fn write_to(&self, dir: &Path) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "导出文件已写入");
        Ok(path)
    }
}

// ==========================================
// ExportEncoder
// ==========================================
pub struct ExportEncoder {
    cache: MemoCache<String, ExportPayload>,
}

impl Default for ExportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportEncoder {
    pub fn new() -> Self {
        Self {
            cache: MemoCache::new(OPERATION),
        }
    }

    pub fn encode(&self, dataset: &Dataset) -> ExportResult<Arc<ExportPayload>> {
        self.cache
            .get_or_try_insert_with(dataset.fingerprint().to_string(), || {
                let bytes = encode_csv(dataset)?;
                tracing::info!(
                    rows = dataset.row_count(),
                    bytes = bytes.len(),
                    "CSV 编码完成"
                );
                Ok(ExportPayload {
                    bytes,
                    file_name: EXPORT_FILE_NAME,
                    mime_type: EXPORT_MIME_TYPE,
                    row_count: dataset.row_count(),
                })
            })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn encode_csv(dataset: &Dataset) -> ExportResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if dataset.column_count() > 0 {
        writer.write_record(dataset.columns())?;
        for row in dataset.rows() {
            writer.write_record(row.iter().map(|cell| cell.to_csv_field().into_owned()))?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

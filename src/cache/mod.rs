// ==========================================
// APL 不良品报表系统 - 记忆化缓存
// ==========================================
// 语义: (操作名 + 输入键) → 不可变结果
// 约束:
// - 计算在锁外进行，插入为 insert-if-absent，先写入者胜出
// - 条目不可原地修改，读取方不会看到半写入的值
// - 仅缓存成功结果
// - 条目数有上限，满时先淘汰任一旧条目再插入
// ==========================================

use dashmap::DashMap;
use serde::Serialize;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 默认条目上限
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// 缓存统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub name: &'static str,
    pub entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

// ==========================================
// MemoCache - 并发记忆化缓存
// ==========================================
pub struct MemoCache<K, V> {
    name: &'static str,
    entries: DashMap<K, Arc<V>>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// 创建缓存（上限 [`DEFAULT_MAX_ENTRIES`]）
    ///
    /// # 参数
    /// - name: 操作名（出现在日志与统计中）
    pub fn new(name: &'static str) -> Self {
        Self::with_max_entries(name, DEFAULT_MAX_ENTRIES)
    }

    /// 创建缓存并指定条目上限（0 视为 1）
    pub fn with_max_entries(name: &'static str, max_entries: usize) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 读取已缓存的值（不计入命中统计）
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// 命中则返回缓存值，否则计算并插入
    ///
    /// 并发未命中时各自计算，最终所有调用方拿到同一个已存储的值。
    /// 计算失败不写入缓存，错误原样返回。
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.peek(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(cache = self.name, "cache hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(cache = self.name, "cache miss");

        let computed = Arc::new(compute()?);
        if !self.entries.contains_key(&key) {
            self.make_room();
        }
        let entry = self.entries.entry(key).or_insert(computed);
        Ok(Arc::clone(entry.value()))
    }

    // 迭代器持有分片读锁，须先取出键再删除
    fn make_room(&self) {
        while self.entries.len() >= self.max_entries {
            let victim = self.entries.iter().next().map(|e| e.key().clone());
            match victim {
                Some(key) => {
                    if self.entries.remove(&key).is_some() {
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!(cache = self.name, "cache eviction");
                    }
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空缓存（统计计数保留）
    pub fn clear(&self) {
        self.entries.clear();
        tracing::info!(cache = self.name, "cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            name: self.name,
            entries: self.entries.len(),
            max_entries: self.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

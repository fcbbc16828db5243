use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// u64::MAX 表示尚未从环境变量读取
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(u64::MAX);

thread_local! {
    static PERF_DEPTH: Cell<u32> = const { Cell::new(0) };
    static SQL_COUNT: Cell<u64> = const { Cell::new(0) };
    static SLOW_SQL_COUNT: Cell<u64> = const { Cell::new(0) };
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

/// 慢 SQL 阈值（毫秒），0 表示关闭
///
/// `APL_REPORT_SLOW_SQL_MS=500` 配置阈值；未配置时 Debug 为 200，Release 为 1000。
pub fn slow_sql_threshold_ms() -> u64 {
    let cached = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if cached != u64::MAX {
        return cached;
    }

    let ms = std::env::var("APL_REPORT_SLOW_SQL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 200 } else { 1_000 });
    SLOW_SQL_THRESHOLD_MS.store(ms, Ordering::Relaxed);
    ms
}

/// 记录一次语句执行（两种驱动共用）
///
/// 超过阈值的语句以 `slow_sql` target 告警；SQL 只含占位符，不含参数值。
pub fn record_statement(backend: &'static str, sql: &str, duration: Duration) {
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if active {
        SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }

    let ms = duration.as_millis() as u64;
    let threshold = slow_sql_threshold_ms();
    if threshold > 0 && ms >= threshold {
        tracing::warn!(
            target: "slow_sql",
            backend,
            duration_ms = ms,
            sql = %truncate_sql(sql, 420),
            "slow sql"
        );
        if active {
            SLOW_SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
        }
    }
}

/// 性能统计 Guard：记录 elapsed_ms + SQL 语句数 + 慢 SQL 数
///
/// ```ignore
/// let _perf = apl_rejection_report::perf::PerfGuard::new("load_dataset");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.with(|c| c.get()),
            slow_sql_start: SLOW_SQL_COUNT.with(|c| c.get()),
        }
    }

    /// 当前 Guard 范围内已执行的语句数
    pub fn sql_count(&self) -> u64 {
        SQL_COUNT.with(|c| c.get()).saturating_sub(self.sql_start)
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let sql_count = self.sql_count();
        let slow_sql_count = SLOW_SQL_COUNT
            .with(|c| c.get())
            .saturating_sub(self.slow_sql_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

// ==========================================
// APL 不良品报表系统 - 演示库生成
// ==========================================
// 用法: seed_demo_db [DB_PATH] [ROW_COUNT]
// 生成确定性的不良品明细（2024-01-01 起 90 天），已存在的库先备份
// ==========================================

use anyhow::Context;
use apl_rejection_report::db::{create_fact_table, open_sqlite_connection_rw};
use apl_rejection_report::domain::schema::DEFAULT_FACT_TABLE;
use apl_rejection_report::domain::Facility;
use chrono::{Days, Local, NaiveDate};
use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;

const DEFAULT_DB_PATH: &str = "apl_demo.db";
const DEFAULT_ROW_COUNT: usize = 2000;
const HORIZON_DAYS: u64 = 90;

const SBUS: [&str; 3] = ["INTIMATES", "ACTIVE", "SLEEP"];
const FLGS: [&str; 5] = ["10", "20", "30", "40", "99"];
const BUYERS: [&str; 4] = ["Acme Apparel", "Northwind", "O'Brien & Co", "Contoso"];
const REASONS: [&str; 5] = ["Stain", "Broken Stitch", "Shade Variation", "Hole", "Measurement"];
const SIZES: [&str; 4] = ["S", "M", "L", "XL"];
const COLORS: [&str; 3] = ["BLACK", "WHITE", "NAVY"];

fn main() -> anyhow::Result<()> {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    let row_count = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_ROW_COUNT)
        .max(1);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection_rw(Path::new(&db_path))
        .with_context(|| format!("打开 {}", db_path))?;
    create_fact_table(&conn, DEFAULT_FACT_TABLE)?;
    seed_rows(&conn, row_count)?;
    print_quick_counts(&conn)?;

    eprintln!("Demo database ready: {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> anyhow::Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_rows(conn: &Connection, row_count: usize) -> anyhow::Result<()> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid base date")?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} (Facility, SBU, FLG, Buyer, Style, Schedule, Color, Size, Operation, \
             RejectionReason, RejectedQty, RejectionValue, transactionDate) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            DEFAULT_FACT_TABLE
        ))?;

        for idx in 0..row_count {
            let facility = Facility::ALL[idx % Facility::ALL.len()];
            let date = base_date
                .checked_add_days(Days::new((idx as u64 * 7) % HORIZON_DAYS))
                .context("date overflow")?;
            let qty = (idx % 12 + 1) as i64;

            stmt.execute(params![
                facility.code(),
                SBUS[(idx / 4) % SBUS.len()],
                FLGS[(idx / 3) % FLGS.len()],
                // 每 17 行缺失一个 Buyer，覆盖空值导出
                if idx % 17 == 0 { None } else { Some(BUYERS[(idx / 2) % BUYERS.len()]) },
                format!("ST{:04}", idx % 250),
                format!("SCH-{:05}", 10_000 + idx / 10),
                COLORS[idx % COLORS.len()],
                SIZES[(idx / 5) % SIZES.len()],
                "SEWING",
                REASONS[(idx / 7) % REASONS.len()],
                qty,
                qty as f64 * 2.5,
                date.format("%Y-%m-%d").to_string(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn print_quick_counts(conn: &Connection) -> anyhow::Result<()> {
    let sql = format!(
        "SELECT Facility, COUNT(*) FROM {} GROUP BY Facility ORDER BY Facility",
        DEFAULT_FACT_TABLE
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

    eprintln!("Row counts:");
    for row in rows {
        let (facility, count) = row?;
        eprintln!("  {:<8} {}", facility, count);
    }
    Ok(())
}

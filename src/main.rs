// ==========================================
// APL 不良品报表系统 - 命令行主入口
// ==========================================
// 用法:
//   report ping
//   report options --facility AIP --facility AIN [--json]
//   report export --facility AIP --sbu S1 --flg 10 --buyer Acme \
//                 --from 2024-01-01 --to 2024-01-31 [--out DIR]
// ==========================================

use anyhow::Context;
use apl_rejection_report::api::{ApiError, ReportApi};
use apl_rejection_report::config::AppSettings;
use apl_rejection_report::domain::{Facility, FilterCriteria};
use apl_rejection_report::{logging, store};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "report")]
#[command(about = "APL 不良品报表 - 按工厂/SBU/FLG/Buyer/日期筛选并导出 CSV")]
#[command(version)]
struct Cli {
    /// 密钥配置文件路径（默认按 APL_REPORT_SECRETS → ./secrets.toml → 用户配置目录查找）
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 检查数据库连通性
    Ping,

    /// 列出所选工厂下可用的 SBU / FLG / Buyer
    Options {
        /// 工厂代码（AIP / AIN / A03 / S01），可重复或逗号分隔
        #[arg(short, long = "facility", value_delimiter = ',')]
        facilities: Vec<Facility>,

        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 按筛选条件导出 filtered_data.csv
    Export {
        #[arg(short, long = "facility", value_delimiter = ',')]
        facilities: Vec<Facility>,

        #[arg(long = "sbu", value_delimiter = ',')]
        business_units: Vec<String>,

        #[arg(long = "flg", value_delimiter = ',')]
        line_groups: Vec<String>,

        #[arg(long = "buyer", value_delimiter = ',')]
        buyers: Vec<String>,

        /// 起始日期 YYYY-MM-DD（默认今天）
        #[arg(long)]
        from: Option<NaiveDate>,

        /// 结束日期 YYYY-MM-DD（默认今天）
        #[arg(long)]
        to: Option<NaiveDate>,

        /// 输出目录（默认取配置 report.output_dir）
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = format!("{:#}", err), "执行失败");
            match err.downcast_ref::<ApiError>() {
                Some(api_err) => eprintln!("错误: {}", api_err.user_message()),
                None => eprintln!("错误: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("{} v{}", apl_rejection_report::APP_NAME, apl_rejection_report::VERSION);

    let settings = AppSettings::load(cli.secrets.as_deref()).map_err(ApiError::from)?;
    let store = store::connect(&settings).map_err(ApiError::from)?;
    let api = ReportApi::new(store, &settings.report);

    match cli.command {
        Commands::Ping => {
            api.ping()?;
            println!("数据库连接正常 ({})", settings.database.describe());
        }
        Commands::Options { facilities, json } => {
            let selected: BTreeSet<Facility> = facilities.into_iter().collect();
            let options = api.facet_options(&selected)?;

            if json {
                let value = serde_json::json!({
                    "facilities": selected,
                    "sbu": options.business_units,
                    "flg": options.selectable_line_groups(),
                    "buyer": options.buyers,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_list("SBU", options.business_units.iter().map(String::as_str));
                print_list("FLG", options.selectable_line_groups().into_iter());
                print_list("Buyer", options.buyers.iter().map(String::as_str));
            }
        }
        Commands::Export {
            facilities,
            business_units,
            line_groups,
            buyers,
            from,
            to,
            out,
        } => {
            let today = Local::now().date_naive();
            let criteria = FilterCriteria::new(from.unwrap_or(today), to.unwrap_or(today))
                .with_facilities(facilities)
                .with_business_units(business_units)
                .with_line_groups(line_groups)
                .with_buyers(buyers);

            let payload = api.export(&criteria)?;
            let dir = out.unwrap_or_else(|| settings.report.output_dir.clone());
            let path = payload
                .write_to(&dir)
                .map_err(ApiError::from)
                .with_context(|| format!("写入 {}", dir.display()))?;

            println!("已导出 {} 行 → {}", payload.row_count, path.display());
        }
    }

    Ok(())
}

fn print_list<'a>(label: &str, values: impl Iterator<Item = &'a str>) {
    let values: Vec<&str> = values.collect();
    println!("{} ({}):", label, values.len());
    for v in values {
        println!("  {}", v);
    }
}

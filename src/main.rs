// ==========================================
// 车辆租赁库存系统 - 命令行主入口
// ==========================================
// 职责: 解析命令行参数，组装 AppState，输出 JSON 结果
// ==========================================

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use lease_inventory::app::{get_default_db_path, AppState};
use lease_inventory::importer::template_headers;
use lease_inventory::repository::OfferQuery;
use lease_inventory::Role;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "lease-inventory", version, about = "车辆租赁库存 - 表格导入与目录查询")]
struct Cli {
    /// 数据库路径（默认: 用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    /// 消息语言（ru / en）
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 导入一个或多个表格文件（.xlsx / .xls / .csv）
    Import {
        #[arg(required = true)]
        files: Vec<String>,
        #[arg(long)]
        actor: Option<String>,
    },
    /// 最近的导入批次
    Batches {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// 批次错误明细
    Errors {
        batch_id: String,
        #[arg(long, default_value_t = 100)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// 查询报价目录
    Offers {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        booking_status: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        year_from: Option<i64>,
        #[arg(long)]
        year_to: Option<i64>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
        /// admin / manager / viewer
        #[arg(long, default_value = "viewer")]
        role: String,
    },
    /// 单条报价
    Offer {
        id: i64,
        #[arg(long, default_value = "viewer")]
        role: String,
    },
    /// 品牌列表
    Brands,
    /// 清空所有导入数据
    Clear {
        #[arg(long)]
        actor: String,
    },
    /// 输出导入模板表头
    Template,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_role(raw: &str) -> Result<Role> {
    Role::parse(raw).ok_or_else(|| {
        anyhow!(lease_inventory::i18n::t_with_args(
            "api.invalid_role",
            &[("role", raw)]
        ))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    lease_inventory::logging::init(cli.json_logs);

    if let Some(locale) = cli.locale.as_deref() {
        lease_inventory::i18n::set_locale(locale);
    }

    if let Command::Template = cli.command {
        return print_json(&template_headers());
    }

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!(version = lease_inventory::VERSION, db_path = %db_path, "启动");

    let state = AppState::new(db_path)
        .await
        .map_err(|e| anyhow!(e))
        .context("无法初始化AppState")?;

    match cli.command {
        Command::Import { files, actor } => {
            let actor = actor.as_deref();
            if files.len() == 1 {
                let result = state.import_api.import_file(&files[0], actor).await?;
                print_json(&result)?;
            } else {
                let results: Vec<serde_json::Value> = state
                    .import_api
                    .import_files(files, actor)
                    .await
                    .into_iter()
                    .map(|r| match r {
                        Ok(result) => serde_json::json!({ "ok": result }),
                        Err(e) => serde_json::json!({ "error": e }),
                    })
                    .collect();
                print_json(&results)?;
            }
        }
        Command::Batches { limit } => {
            print_json(&state.import_api.list_batches(limit).await?)?;
        }
        Command::Errors {
            batch_id,
            limit,
            offset,
        } => {
            print_json(
                &state
                    .import_api
                    .list_batch_errors(&batch_id, limit, offset)
                    .await?,
            )?;
        }
        Command::Offers {
            search,
            brand,
            status,
            booking_status,
            min_price,
            max_price,
            year_from,
            year_to,
            batch,
            limit,
            offset,
            role,
        } => {
            let query = OfferQuery {
                search,
                brand,
                status,
                booking_status,
                min_price,
                max_price,
                year_from,
                year_to,
                import_batch_id: batch,
                limit,
                offset,
            };
            print_json(&state.catalog_api.list_offers(&query, parse_role(&role)?)?)?;
        }
        Command::Offer { id, role } => {
            print_json(&state.catalog_api.get_offer(id, parse_role(&role)?)?)?;
        }
        Command::Brands => {
            print_json(&state.catalog_api.list_brands()?)?;
        }
        Command::Clear { actor } => {
            print_json(&state.import_api.clear_import_data(&actor).await?)?;
        }
        Command::Template => print_json(&template_headers())?,
    }

    Ok(())
}

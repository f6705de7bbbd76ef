// ==========================================
// CRM 线索分配引擎 - 命令行入口
// ==========================================
// 用法:
//   lead-allocation [db_path] batch [limit]
//   lead-allocation [db_path] assign <lead_id>
//   lead-allocation [db_path] reset-daily
//   lead-allocation [db_path] serve
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use lead_allocation::app::{batch_job, get_default_db_path, AppState};
use lead_allocation::config::AllocationConfigReader;
use lead_allocation::logging;
use serde_json::json;
use tokio_util::sync::CancellationToken;

const COMMANDS: &[&str] = &["batch", "assign", "reset-daily", "serve"];

/// 未配置间隔时 serve 模式的默认轮询间隔（秒）
const DEFAULT_SERVE_INTERVAL_SECS: u64 = 60;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Batch(Option<usize>),
    Assign(i64),
    ResetDaily,
    Serve,
}

fn parse_args(args: &[String]) -> Result<(Option<String>, Command)> {
    let mut rest = args;
    let mut db_path = None;

    if let Some(first) = rest.first() {
        if !COMMANDS.contains(&first.as_str()) {
            db_path = Some(first.clone());
            rest = &rest[1..];
        }
    }

    let command = match rest {
        [cmd] if cmd == "batch" => Command::Batch(None),
        [cmd, limit] if cmd == "batch" => Command::Batch(Some(
            limit
                .parse()
                .with_context(|| format!("批量条数无效: {}", limit))?,
        )),
        [cmd, lead_id] if cmd == "assign" => Command::Assign(
            lead_id
                .parse()
                .with_context(|| format!("线索ID无效: {}", lead_id))?,
        ),
        [cmd] if cmd == "reset-daily" => Command::ResetDaily,
        [cmd] if cmd == "serve" => Command::Serve,
        _ => bail!(
            "用法: lead-allocation [db_path] <batch [limit] | assign <lead_id> | reset-daily | serve>"
        ),
    };

    Ok((db_path, command))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, command) = parse_args(&args)?;
    let db_path = db_path.unwrap_or_else(get_default_db_path);

    tracing::info!("{} v{}", lead_allocation::APP_NAME, lead_allocation::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match command {
        Command::Batch(limit) => {
            let summary = state.allocation_api.run_batch(limit)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Assign(lead_id) => {
            let assigned = state.allocation_api.assign_lead(lead_id)?;
            let records = state.allocation_api.list_lead_assignments(lead_id)?;
            let output = json!({
                "lead_id": lead_id,
                "assigned": assigned,
                "assignment": records.last(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::ResetDaily => {
            let reset = state.salesperson_repo.reset_daily_loads()?;
            println!("{}", serde_json::to_string_pretty(&json!({ "reset": reset }))?);
        }
        Command::Serve => {
            let config = state
                .config_manager
                .get_allocation_config()
                .await
                .map_err(|e| anyhow!("读取分配配置失败: {}", e))?;
            let secs = match config.batch_interval_secs {
                0 => DEFAULT_SERVE_INTERVAL_SECS,
                n => n,
            };

            let cancel = CancellationToken::new();
            let job = tokio::spawn(batch_job::run(
                Arc::clone(&state.allocation_api),
                Duration::from_secs(secs),
                cancel.clone(),
            ));

            tokio::signal::ctrl_c().await.context("监听退出信号失败")?;
            tracing::info!("收到退出信号，正在停止");
            cancel.cancel();
            job.await.context("定时任务退出异常")?;
        }
    }

    Ok(())
}

// ==========================================
// CRM 线索分配引擎 - 定时批量分配任务
// ==========================================
// 职责: 按固定间隔补分配未分配线索，直到收到取消信号
// 说明: 分配引擎为同步实现，每轮在阻塞线程池中执行
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::{AllocationApi, ApiError};

/// 运行定时批量分配循环
///
/// 每个 tick 以配置默认条数执行一次批量分配；单轮失败只记录日志，不终止循环。
pub async fn run(api: Arc<AllocationApi>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "定时批量分配任务启动");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("定时批量分配任务停止");
                break;
            }
            _ = ticker.tick() => {
                let api = api.clone();
                match tokio::task::spawn_blocking(move || api.run_batch(None)).await {
                    Ok(Ok(summary)) => {
                        if summary.total > 0 {
                            tracing::info!(
                                total = summary.total,
                                by_rule = summary.assigned_by_rule,
                                by_fallback = summary.assigned_by_fallback,
                                skipped = summary.skipped,
                                "定时批量分配完成"
                            );
                        } else {
                            tracing::debug!("定时批量分配: 无待分配线索");
                        }
                    }
                    Ok(Err(ApiError::NoActiveWorkers)) => {
                        tracing::warn!("定时批量分配: 无在岗销售人员，本轮跳过");
                    }
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "定时批量分配失败");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "定时批量分配任务异常退出");
                    }
                }
            }
        }
    }
}

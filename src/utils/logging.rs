/// 日志工具模块
///
/// 初始化 tracing，并提供批次开始 / 结束时的日志输出
use crate::config::Config;
use crate::models::BatchSummary;
use crate::orchestrator::ExecutionMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 日志统一写到 stderr，stdout 只留给抓取报告。
/// 设置了 `RUST_LOG` 时以它为准，否则默认 `info`，详细模式下为 `debug`。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试里可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, task_count: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📋 任务数量: {}", task_count);
    match config.max_concurrent_fetches {
        Some(n) => info!("📊 最大并发数: {}", n),
        None => info!("📊 最大并发数: 不限"),
    }
    if let Some(timeout) = config.task_timeout {
        info!("⏱ 单任务时限: {:.2}s", timeout.as_secs_f64());
    }
    if let Some(timeout) = config.batch_timeout {
        info!("⏱ 批次时限: {:.2}s", timeout.as_secs_f64());
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
pub fn log_batch_start(mode: ExecutionMode, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 开始{}抓取 ({} 个任务, 失败策略: {})",
        mode,
        total,
        mode.failure_policy()
    );
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(mode: ExecutionMode, summary: &BatchSummary) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ {}抓取完成: 成功 {}/{}，耗时 {:.2}s",
        mode,
        summary.success_count(),
        summary.len(),
        summary.total_elapsed.as_secs_f64()
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

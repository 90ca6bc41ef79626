//! CLI: 命令行参数解析
//!
//! ## 示例
//!
//! - 两种方式依次运行：`fetch_url gopl.io golang.org`
//! - 只跑并发：`fetch_url -m concurrent gopl.io https://golang.org`
//! - 限制并发并设置时限：`fetch_url -m concurrent --max-concurrent 4 --task-timeout 5 -f tasks.toml`

use crate::config::Config;
use crate::error::AppError;
use crate::orchestrator::ExecutionMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// fetch_url 命令行参数
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fetch_url",
    version = env!("CARGO_PKG_VERSION"),
    about = "抓取一组 URL，报告每个地址的状态、大小和耗时",
    long_about = "抓取一组 URL，报告每个地址的状态、大小和耗时。\n\n\
                  顺序模式逐个抓取并显示内容预览，遇到第一个失败立即终止；\n\
                  并发模式同时抓取所有地址，只统计字节数，单个失败不影响其他地址。\n\n\
                  示例：\n  fetch_url gopl.io golang.org\n  fetch_url -m concurrent --max-concurrent 4 -f tasks.toml\n"
)]
pub struct Args {
    /// 要抓取的地址，缺少协议前缀时自动补全
    pub addresses: Vec<String>,

    /// TOML 任务文件（`addresses = [...]`），追加在命令行地址之后
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// 执行方式
    #[arg(short, long, value_enum, default_value_t = RunMode::Both)]
    pub mode: RunMode,

    /// 并发模式下同时进行的请求数上限（0 表示不限）
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// 并发模式下单个任务的时限（秒）
    #[arg(long, value_name = "SECS")]
    pub task_timeout: Option<f64>,

    /// 并发模式下整个批次的时限（秒）
    #[arg(long, value_name = "SECS")]
    pub batch_timeout: Option<f64>,

    /// 报告格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// 输出详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

/// 要运行哪些执行方式
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Sequential,
    Concurrent,
    /// 先顺序、再并发
    Both,
}

impl RunMode {
    pub fn execution_modes(self) -> Vec<ExecutionMode> {
        match self {
            RunMode::Sequential => vec![ExecutionMode::Sequential],
            RunMode::Concurrent => vec![ExecutionMode::Concurrent],
            RunMode::Both => vec![ExecutionMode::Sequential, ExecutionMode::Concurrent],
        }
    }
}

/// 报告格式
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    /// 用命令行参数覆盖配置
    pub fn apply_to(&self, config: &mut Config) -> Result<(), AppError> {
        if let Some(limit) = self.max_concurrent {
            config.max_concurrent_fetches = (limit > 0).then_some(limit);
        }
        if let Some(secs) = self.task_timeout {
            config.task_timeout = Some(parse_secs("--task-timeout", secs)?);
        }
        if let Some(secs) = self.batch_timeout {
            config.batch_timeout = Some(parse_secs("--batch-timeout", secs)?);
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        Ok(())
    }
}

fn parse_secs(flag: &str, secs: f64) -> Result<Duration, AppError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(Duration::from_secs_f64(secs))
    } else {
        Err(AppError::Config(format!("{} 必须是正数，实际为 {}", flag, secs)))
    }
}

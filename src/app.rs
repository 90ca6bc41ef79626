//! 应用入口 - 编排层之上
//!
//! ## 职责
//!
//! 1. **应用初始化**：记录启动信息，创建 HTTP 传输
//! 2. **输入整理**：合并命令行地址与任务文件，规范化成任务列表
//! 3. **依次执行**：按 `RunMode` 运行顺序 / 并发两种方式
//! 4. **输出报告**：报告写入调用方给出的 writer，日志走 stderr

use crate::cli::{OutputFormat, RunMode};
use crate::config::Config;
use crate::infrastructure::{HttpTransport, Transport};
use crate::models::{build_tasks, load_task_file, BatchSummary, Task};
use crate::orchestrator::{ConcurrentOrchestrator, ExecutionMode, SequentialExecutor};
use crate::services::{reporter, FetchService};
use crate::utils::logging::{log_batch_complete, log_batch_start, log_startup};
use crate::utils::truncate_text;
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 应用主结构
pub struct App {
    config: Config,
    fetcher: FetchService,
}

impl App {
    /// 初始化应用，使用真实的 HTTP 传输
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// 使用指定的传输初始化应用
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            fetcher: FetchService::new(transport),
        }
    }

    /// 合并命令行地址与任务文件中的地址，顺序为先命令行后文件
    pub async fn collect_addresses(
        addresses: Vec<String>,
        task_file: Option<&Path>,
    ) -> Result<Vec<String>> {
        let mut all = addresses;
        if let Some(path) = task_file {
            all.extend(load_task_file(path).await?);
        }
        Ok(all)
    }

    /// 运行应用主逻辑
    ///
    /// 顺序模式遇到失败（包括被取消）时，已完成的结果照常输出，随后返回错误，
    /// 之后的执行方式（例如 `Both` 里的并发部分）不再运行。
    /// 取消信号到达后也不会再开始新的执行方式。
    pub async fn run<W: Write>(
        &self,
        raw_addresses: &[String],
        mode: RunMode,
        format: OutputFormat,
        cancel: CancellationToken,
        out: &mut W,
    ) -> Result<()> {
        let tasks = build_tasks(raw_addresses, &self.config.default_scheme)?;

        log_startup(&self.config, tasks.len());
        if tasks.is_empty() {
            warn!("⚠️ 没有任何待抓取的地址");
        } else {
            let joined = tasks
                .iter()
                .map(|t| t.address.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            debug!("任务列表: {}", truncate_text(&joined, 200));
        }

        for execution in mode.execution_modes() {
            if cancel.is_cancelled() {
                warn!("⚠️ 已取消，跳过{}抓取", execution);
                break;
            }
            log_batch_start(execution, tasks.len());

            let summary = match execution {
                ExecutionMode::Sequential => match self.run_sequential(&tasks, cancel.clone()).await {
                    Ok(summary) => summary,
                    Err(abort) => {
                        let partial = BatchSummary {
                            results: abort.completed.clone(),
                            total_elapsed: abort.total_elapsed,
                        };
                        write_report(out, &partial, execution, format)?;
                        // 错误由调用方统一输出，这里不再重复记录
                        return Err(abort.to_error().into());
                    }
                },
                ExecutionMode::Concurrent => self.run_concurrent(tasks.clone(), cancel.clone()).await,
            };

            log_batch_complete(execution, &summary);
            write_report(out, &summary, execution, format)?;
        }

        Ok(())
    }

    async fn run_sequential(
        &self,
        tasks: &[Task],
        cancel: CancellationToken,
    ) -> std::result::Result<BatchSummary, crate::orchestrator::SequentialAbort> {
        SequentialExecutor::new(self.fetcher.clone(), self.config.preview_len)
            .with_cancellation(cancel)
            .run(tasks)
            .await
    }

    async fn run_concurrent(&self, tasks: Vec<Task>, cancel: CancellationToken) -> BatchSummary {
        ConcurrentOrchestrator::from_config(self.fetcher.clone(), &self.config)
            .with_cancellation(cancel)
            .run(tasks)
            .await
    }
}

fn write_report<W: Write>(
    out: &mut W,
    summary: &BatchSummary,
    mode: ExecutionMode,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", reporter::render_text(summary))?,
        OutputFormat::Json => writeln!(out, "{}", reporter::render_json(summary, mode)?)?,
    }
    out.flush()?;
    Ok(())
}

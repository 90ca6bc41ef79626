//! 顺序执行器 - 编排层
//!
//! 一次只抓取一个任务，严格按照输入顺序；
//! 任何一个任务失败都视为整个批次失败，立即终止（fail-fast）。
//! 外部取消同样按失败处理，正在进行的请求会被放弃。

use crate::error::{AppError, FetchError};
use crate::models::{BatchSummary, FetchMode, FetchResult, Task};
use crate::orchestrator::FailurePolicy;
use crate::services::FetchService;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 顺序批次在某个任务上终止
#[derive(Debug)]
pub struct SequentialAbort {
    /// 终止前已经成功完成的结果（输入顺序）
    pub completed: Vec<FetchResult>,
    /// 导致终止的那个结果
    pub failed: FetchResult,
    pub total_elapsed: Duration,
}

impl SequentialAbort {
    pub fn to_error(&self) -> AppError {
        AppError::SequentialAborted {
            index: self.failed.index,
            address: self.failed.address.clone(),
            source: self
                .failed
                .error
                .clone()
                .unwrap_or(FetchError::WorkerLost),
        }
    }

    /// 是否因外部取消而终止
    pub fn was_cancelled(&self) -> bool {
        self.failed.error == Some(FetchError::Cancelled)
    }
}

/// 顺序执行器
pub struct SequentialExecutor {
    fetcher: FetchService,
    preview_len: usize,
    cancel: CancellationToken,
}

impl SequentialExecutor {
    pub const POLICY: FailurePolicy = FailurePolicy::FailFast;

    pub fn new(fetcher: FetchService, preview_len: usize) -> Self {
        Self {
            fetcher,
            preview_len,
            cancel: CancellationToken::new(),
        }
    }

    /// 绑定外部取消信号
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 按顺序抓取所有任务
    ///
    /// # 返回
    /// - `Ok(BatchSummary)`：全部成功，结果按输入顺序排列
    /// - `Err(SequentialAbort)`：遇到第一个失败即停止，之后的任务不会被抓取；
    ///   被取消时 `failed` 是当前任务的 `FetchError::Cancelled` 结果
    pub async fn run(&self, tasks: &[Task]) -> Result<BatchSummary, SequentialAbort> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(tasks.len());

        info!("▶ 顺序抓取 {} 个任务", tasks.len());

        for task in tasks {
            debug!("{} 开始抓取", task);

            let task_start = Instant::now();
            let fetch = self.fetcher.fetch(
                task,
                FetchMode::Retain {
                    preview_len: self.preview_len,
                },
            );

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("{} 已取消，终止剩余 {} 个任务", task, tasks.len() - results.len() - 1);
                    return Err(SequentialAbort {
                        completed: results,
                        failed: FetchResult::failure(
                            task,
                            None,
                            FetchError::Cancelled,
                            task_start.elapsed(),
                        ),
                        total_elapsed: start.elapsed(),
                    });
                }
                result = fetch => result,
            };

            if !result.succeeded() {
                error!(
                    "{} 抓取失败，终止剩余 {} 个任务",
                    task,
                    tasks.len() - results.len() - 1
                );
                return Err(SequentialAbort {
                    completed: results,
                    failed: result,
                    total_elapsed: start.elapsed(),
                });
            }

            results.push(result);
        }

        Ok(BatchSummary {
            results,
            total_elapsed: start.elapsed(),
        })
    }
}

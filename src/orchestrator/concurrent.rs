//! 并发编排器 - 编排层
//!
//! ## 职责
//!
//! 为每个任务启动一个独立的工作任务，所有结果经由同一个 mpsc 通道汇总。
//!
//! ## 核心约定
//!
//! 1. **扇出**：每个任务一个 `tokio::spawn`，工作任务之间不共享可变状态
//! 2. **扇入**：收集循环只等待通道，不直接等待工作任务
//! 3. **完成顺序**：结果按完成先后排列，`index` 是找回原始身份的唯一依据
//! 4. **失败隔离**：单个任务失败不影响其他任务，整个批次不会因此失败
//! 5. **恰好 N 个结果**：超时、取消、工作任务 panic 时由编排器代为合成结果，
//!    迟到或重复的结果会被丢弃
//!
//! ## 可选限制
//!
//! - `max_concurrent`：用 Semaphore 限制同时在途的请求数
//! - `task_timeout`：单个任务的截止时间
//! - `batch_timeout`：整个批次的截止时间，到期后协作式取消剩余工作任务
//! - `cancel`：外部取消信号（例如 Ctrl-C）

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{BatchSummary, FetchMode, FetchResult, Task};
use crate::orchestrator::FailurePolicy;
use crate::services::FetchService;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 并发编排器
#[derive(Clone)]
pub struct ConcurrentOrchestrator {
    fetcher: FetchService,
    max_concurrent: Option<usize>,
    task_timeout: Option<Duration>,
    batch_timeout: Option<Duration>,
    cancel: CancellationToken,
}

/// 收集循环每一轮等到的事件
enum Next {
    Result(usize, FetchResult),
    /// 所有发送端都已关闭（剩余工作任务异常退出）
    Closed,
    Deadline,
    Cancelled,
}

impl ConcurrentOrchestrator {
    pub const POLICY: FailurePolicy = FailurePolicy::Isolate;

    /// 不限并发、无超时、无外部取消
    pub fn new(fetcher: FetchService) -> Self {
        Self {
            fetcher,
            max_concurrent: None,
            task_timeout: None,
            batch_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// 按配置创建
    pub fn from_config(fetcher: FetchService, config: &Config) -> Self {
        Self::new(fetcher)
            .with_max_concurrent(config.max_concurrent_fetches)
            .with_task_timeout(config.task_timeout)
            .with_batch_timeout(config.batch_timeout)
    }

    pub fn with_max_concurrent(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent = limit.filter(|n| *n > 0);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.batch_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// 并发抓取所有任务
    ///
    /// 返回的 `BatchSummary` 恰好包含 `tasks.len()` 个结果，按完成顺序排列
    pub async fn run(&self, tasks: Vec<Task>) -> BatchSummary {
        let start = Instant::now();
        let total = tasks.len();

        if total == 0 {
            return BatchSummary {
                results: Vec::new(),
                total_elapsed: start.elapsed(),
            };
        }

        info!(
            "▶ 并发抓取 {} 个任务 (并发上限: {})",
            total,
            self.max_concurrent
                .map(|n| n.to_string())
                .unwrap_or_else(|| "不限".to_string())
        );

        // 容量等于任务数，工作任务交接结果时永远不会阻塞
        let (tx, mut rx) = mpsc::channel::<(usize, FetchResult)>(total);
        let limiter = self.max_concurrent.map(|n| Arc::new(Semaphore::new(n)));
        let batch_token = self.cancel.child_token();

        for (slot, task) in tasks.iter().enumerate() {
            let worker = Worker {
                fetcher: self.fetcher.clone(),
                task: task.clone(),
                limiter: limiter.clone(),
                task_timeout: self.task_timeout,
            };
            let tx = tx.clone();
            let token = batch_token.clone();

            tokio::spawn(async move {
                let result = tokio::select! {
                    biased;
                    // 批次已放弃这个任务，结果由编排器代为合成
                    _ = token.cancelled() => return,
                    result = worker.run() => result,
                };
                // 单次交接；接收端已经放弃时发送失败，直接丢弃
                let _ = tx.send((slot, result)).await;
            });
        }
        // 只留工作任务手里的发送端，全部退出后通道关闭
        drop(tx);

        let deadline = self.batch_timeout.map(|t| tokio::time::Instant::now() + t);
        let mut received = vec![false; total];
        let mut results = Vec::with_capacity(total);

        let stop_reason = loop {
            if results.len() == total {
                break None;
            }

            let next = tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Some((slot, result)) => Next::Result(slot, result),
                    None => Next::Closed,
                },
                _ = batch_token.cancelled() => Next::Cancelled,
                _ = wait_until(deadline) => Next::Deadline,
            };

            match next {
                Next::Result(slot, result) => {
                    if received[slot] {
                        warn!("任务 #{} 的结果重复，已丢弃", result.index);
                        continue;
                    }
                    received[slot] = true;
                    debug!(
                        "收到任务 #{} 的结果 ({}/{})",
                        result.index,
                        results.len() + 1,
                        total
                    );
                    results.push(result);
                }
                // 已取消的工作任务不发送结果就退出，通道同样会关闭
                Next::Closed if batch_token.is_cancelled() => break Some(FetchError::Cancelled),
                Next::Closed => break Some(FetchError::WorkerLost),
                Next::Cancelled => break Some(FetchError::Cancelled),
                Next::Deadline => {
                    break Some(FetchError::Timeout(self.batch_timeout.unwrap_or_default()))
                }
            }
        };

        if let Some(reason) = stop_reason {
            // 通知仍在运行的工作任务停止
            batch_token.cancel();

            let missing = received.iter().filter(|r| !**r).count();
            warn!("批次提前结束 ({})，为 {} 个未完成任务合成结果", reason, missing);

            let elapsed = start.elapsed();
            for (slot, task) in tasks.iter().enumerate() {
                if !received[slot] {
                    results.push(FetchResult::failure(task, None, reason.clone(), elapsed));
                }
            }
        }

        BatchSummary {
            results,
            total_elapsed: start.elapsed(),
        }
    }
}

/// 单个工作任务需要的全部输入，各自独占
struct Worker {
    fetcher: FetchService,
    task: Task,
    limiter: Option<Arc<Semaphore>>,
    task_timeout: Option<Duration>,
}

impl Worker {
    async fn run(self) -> FetchResult {
        // Semaphore 从不关闭，acquire 不会失败
        let _permit = match &self.limiter {
            Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
            None => None,
        };

        let fetch = self.fetcher.fetch(&self.task, FetchMode::Discard);

        match self.task_timeout {
            Some(limit) => {
                let start = Instant::now();
                match tokio::time::timeout(limit, fetch).await {
                    Ok(result) => result,
                    // 请求连同已收到的状态行一起丢弃，超时结果没有 status
                    Err(_) => {
                        warn!("{} 超过单任务时限 {:.2}s", self.task, limit.as_secs_f64());
                        FetchResult::failure(
                            &self.task,
                            None,
                            FetchError::Timeout(limit),
                            start.elapsed(),
                        )
                    }
                }
            }
            None => fetch.await,
        }
    }
}

async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

//! 抓取结果与批次汇总

use crate::error::FetchError;
use crate::models::task::Task;
use std::time::Duration;

/// 响应体的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// 完整读取响应体，保留开头一段作为预览（顺序模式，用于查看内容）
    Retain { preview_len: usize },
    /// 边读边丢弃，只统计字节数（并发模式，用于测吞吐）
    Discard,
}

/// 成功读取后的响应体信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Preview { total_bytes: u64, preview: String },
    Discarded { byte_count: u64 },
}

impl Payload {
    pub fn byte_count(&self) -> u64 {
        match self {
            Payload::Preview { total_bytes, .. } => *total_bytes,
            Payload::Discarded { byte_count } => *byte_count,
        }
    }
}

/// 单个任务的抓取结果
///
/// 每个任务恰好产生一个，由抓取操作（或编排层代为合成）创建，之后不再修改。
/// 只能通过 [`FetchResult::success`] / [`FetchResult::failure`] 构造，
/// 保证 `error` 存在当且仅当抓取失败。
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub index: usize,
    pub address: String,
    /// 状态行，只有建立了连接才有
    pub status: Option<String>,
    pub payload: Option<Payload>,
    pub elapsed: Duration,
    pub error: Option<FetchError>,
}

impl FetchResult {
    pub fn success(task: &Task, status: String, payload: Payload, elapsed: Duration) -> Self {
        Self {
            index: task.index,
            address: task.address.clone(),
            status: Some(status),
            payload: Some(payload),
            elapsed,
            error: None,
        }
    }

    pub fn failure(
        task: &Task,
        status: Option<String>,
        error: FetchError,
        elapsed: Duration,
    ) -> Self {
        Self {
            index: task.index,
            address: task.address.clone(),
            status,
            payload: None,
            elapsed,
            error: Some(error),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// 一次批量抓取的汇总
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// 顺序模式下按输入顺序，并发模式下按完成顺序
    pub results: Vec<FetchResult>,
    pub total_elapsed: Duration,
}

impl BatchSummary {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// 所有任务各自耗时之和
    pub fn sum_elapsed(&self) -> Duration {
        self.results.iter().map(|r| r.elapsed).sum()
    }

    /// 单个任务的最长耗时
    pub fn max_elapsed(&self) -> Duration {
        self.results
            .iter()
            .map(|r| r.elapsed)
            .max()
            .unwrap_or_default()
    }

    /// 按原始输入顺序排列的结果引用
    pub fn by_index(&self) -> Vec<&FetchResult> {
        let mut sorted: Vec<&FetchResult> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.index);
        sorted
    }
}

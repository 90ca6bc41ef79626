//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 决定"多个任务如何执行"，不关心单个任务如何抓取。
//!
//! ## 模块划分
//!
//! ### `sequential` - 顺序执行器
//! - 一次一个，严格按输入顺序
//! - 第一个失败即终止整个批次（[`FailurePolicy::FailFast`]）
//! - 完整读取响应体，保留内容预览
//!
//! ### `concurrent` - 并发编排器
//! - 每个任务一个工作任务，经由同一个通道汇总
//! - 结果按完成顺序返回，单个失败互不影响（[`FailurePolicy::Isolate`]）
//! - 丢弃响应体，只统计字节数
//! - 可选并发上限、单任务 / 批次时限、外部取消
//!
//! ## 层次关系
//!
//! ```text
//! app (解析输入、输出报告)
//!     ↓
//! orchestrator (sequential / concurrent)
//!     ↓
//! services::FetchService (抓取单个任务)
//!     ↓
//! infrastructure (Transport：HTTP 客户端)
//! ```
//!
//! 两种执行方式的失败策略刻意不同，不能互相替换，
//! 调用方需要通过 [`ExecutionMode::failure_policy`] 明确选择。

pub mod concurrent;
pub mod sequential;

use std::fmt;

pub use concurrent::ConcurrentOrchestrator;
pub use sequential::{SequentialAbort, SequentialExecutor};

/// 执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Concurrent,
}

impl ExecutionMode {
    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            ExecutionMode::Sequential => SequentialExecutor::POLICY,
            ExecutionMode::Concurrent => ConcurrentOrchestrator::POLICY,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "顺序"),
            ExecutionMode::Concurrent => write!(f, "并发"),
        }
    }
}

/// 单个任务失败时批次如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 立即终止整个批次
    FailFast,
    /// 记录失败，其余任务照常进行
    Isolate,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "遇错即停"),
            FailurePolicy::Isolate => write!(f, "失败隔离"),
        }
    }
}

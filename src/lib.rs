//! # fetch_url
//!
//! 抓取一组 URL，报告每个地址的状态、大小和耗时，以及整个批次的总耗时
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端，只暴露"打开一个响应"的能力
//! - `Transport` / `ResponseBody` - 传输抽象，`HttpTransport` 基于 reqwest
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个任务
//! - `FetchService` - 抓取单个地址，失败收敛为 `FetchResult`，响应流一定释放
//! - `reporter` - 把结果转换成文本 / JSON
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/sequential` - 顺序执行，遇错即停
//! - `orchestrator/concurrent` - 并发扇出 / 通道扇入，失败隔离
//!
//! ### ④ 应用层
//! - `app` - 输入整理、依次运行、输出报告
//! - `cli` - 命令行参数
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_helpers;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, FetchError, Result};
pub use infrastructure::{HttpTransport, ResponseBody, Transport};
pub use models::{build_tasks, normalize_address, BatchSummary, FetchMode, FetchResult, Payload, Task};
pub use orchestrator::{
    ConcurrentOrchestrator, ExecutionMode, FailurePolicy, SequentialAbort, SequentialExecutor,
};
pub use services::FetchService;

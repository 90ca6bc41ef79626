//! 抓取服务 - 业务能力层
//!
//! 只负责"抓取一个地址"的能力：一次请求/响应，返回一个 `FetchResult`。
//! 不关心任务之间的顺序，也不决定失败后是否继续。

use crate::error::FetchError;
use crate::infrastructure::{ResponseBody, Transport};
use crate::models::{FetchMode, FetchResult, Payload, Task};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// 抓取服务
///
/// 职责：
/// - 为单个任务发起请求、读取（或丢弃）响应体
/// - 任何失败都收敛为 `FetchResult`，绝不向外抛出
/// - 响应流在返回前一定被释放
#[derive(Clone)]
pub struct FetchService {
    transport: Arc<dyn Transport>,
}

impl FetchService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 抓取单个任务
    ///
    /// # 参数
    /// - `task`: 要抓取的任务
    /// - `mode`: 保留预览还是丢弃计数
    ///
    /// # 返回
    /// 总是返回一个 `FetchResult`，失败信息记录在 `error` 中
    pub async fn fetch(&self, task: &Task, mode: FetchMode) -> FetchResult {
        let start = Instant::now();

        let mut body = match self.transport.open(&task.address).await {
            Ok(body) => body,
            Err(e) => {
                warn!("{} 连接失败: {}", task, e);
                return FetchResult::failure(task, None, e, start.elapsed());
            }
        };

        let status = body.status().to_string();
        let read = read_body(body.as_mut(), mode).await;

        // 先释放连接，再计时，保证结果产生时连接已经归还
        drop(body);
        let elapsed = start.elapsed();

        match read {
            Ok(payload) => {
                debug!(
                    "{} 完成: {} ({} bytes, {:.2}s)",
                    task,
                    status,
                    payload.byte_count(),
                    elapsed.as_secs_f64()
                );
                FetchResult::success(task, status, payload, elapsed)
            }
            Err(e) => {
                warn!("{} 读取失败 (状态 {}): {}", task, status, e);
                FetchResult::failure(task, Some(status), e, elapsed)
            }
        }
    }
}

async fn read_body(body: &mut dyn ResponseBody, mode: FetchMode) -> Result<Payload, FetchError> {
    match mode {
        FetchMode::Retain { preview_len } => {
            // 只保留前 preview_len 个字节，其余只计数
            let mut head = Vec::new();
            let mut total_bytes = 0u64;
            while let Some(chunk) = body.next_chunk().await? {
                total_bytes += chunk.len() as u64;
                let room = preview_len - head.len();
                head.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
            Ok(Payload::Preview {
                total_bytes,
                preview: String::from_utf8_lossy(&head).into_owned(),
            })
        }
        FetchMode::Discard => {
            let mut byte_count = 0u64;
            while let Some(chunk) = body.next_chunk().await? {
                byte_count += chunk.len() as u64;
            }
            Ok(Payload::Discarded { byte_count })
        }
    }
}

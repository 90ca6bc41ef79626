//! 传输层抽象 - 基础设施层
//!
//! 只描述"发出请求，拿到状态行和字节流"这一能力，
//! 不认识任务，不关心结果如何汇总

use crate::error::FetchError;
use async_trait::async_trait;
use bytes::Bytes;

/// 已建立连接的响应
///
/// 持有底层连接（socket / stream），drop 即释放
#[async_trait]
pub trait ResponseBody: Send {
    /// 状态行，如 `200 OK`
    fn status(&self) -> &str;

    /// 读取下一段响应体，读完返回 `None`
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError>;
}

/// 请求/响应传输
///
/// 连接失败必须返回 [`FetchError::Connect`]，
/// 读取响应体失败必须返回 [`FetchError::Read`]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, address: &str) -> Result<Box<dyn ResponseBody>, FetchError>;
}

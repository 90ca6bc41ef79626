//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 reqwest 客户端（内部连接池），只暴露"打开一个响应"的能力

use crate::config::Config;
use crate::error::{AppError, FetchError};
use crate::infrastructure::transport::{ResponseBody, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// 基于 reqwest 的 HTTP 传输
///
/// 职责：
/// - 持有 `reqwest::Client`
/// - 把 reqwest 的错误归类为连接失败 / 读取失败
/// - 不认识 Task / FetchResult
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// 按配置创建 HTTP 传输
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// 使用现成的客户端
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, address: &str) -> Result<Box<dyn ResponseBody>, FetchError> {
        debug!("GET {}", address);

        let response = self
            .client
            .get(address)
            .send()
            .await
            .map_err(|e| FetchError::Connect(error_chain(&e)))?;

        let status = response.status().to_string();
        debug!("{} -> {}", address, status);

        Ok(Box::new(HttpBody { status, response }))
    }
}

/// 一个 HTTP 响应，drop 时连接归还或关闭
struct HttpBody {
    status: String,
    response: reqwest::Response,
}

#[async_trait]
impl ResponseBody for HttpBody {
    fn status(&self) -> &str {
        &self.status
    }

    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        self.response
            .chunk()
            .await
            .map_err(|e| FetchError::Read(error_chain(&e)))
    }
}

/// reqwest 的 Display 只有最外层描述，把 source 链拼上方便定位
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

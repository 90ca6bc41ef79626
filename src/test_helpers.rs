//! 测试用的脚本化传输
//!
//! 每个地址按预设脚本返回结果，并统计连接打开 / 释放次数以及同时在途的请求数

use crate::error::FetchError;
use crate::infrastructure::{ResponseBody, Transport};
use crate::models::Task;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 单个地址的行为
#[derive(Debug, Clone)]
pub enum Script {
    /// 延迟 `delay` 后返回状态行和响应体
    Respond {
        status: &'static str,
        chunks: Vec<&'static [u8]>,
        delay: Duration,
    },
    /// 延迟 `delay` 后连接失败
    ConnectError { delay: Duration },
    /// 返回状态行，读出 `chunks` 后读取失败
    ReadError {
        status: &'static str,
        chunks: Vec<&'static [u8]>,
        delay: Duration,
    },
    /// 返回状态行，响应体永远读不完
    StallBody { status: &'static str },
    /// 永远不返回
    Hang,
    /// 工作任务直接 panic
    Panic,
}

impl Script {
    pub fn ok(body: &'static [u8], delay_ms: u64) -> Self {
        Script::Respond {
            status: "200 OK",
            chunks: vec![body],
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn refused(delay_ms: u64) -> Self {
        Script::ConnectError {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub released: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// 在途计数守卫，drop 时减一
struct InFlight(Arc<Counters>);

impl InFlight {
    fn enter(counters: &Arc<Counters>) -> Self {
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(counters))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    pub counters: Arc<Counters>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 地址会按默认前缀规范化后再登记
    pub fn with(mut self, address: &str, script: Script) -> Self {
        self.scripts.insert(
            crate::models::normalize_address(address, crate::models::DEFAULT_SCHEME),
            script,
        );
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self, address: &str) -> Result<Box<dyn ResponseBody>, FetchError> {
        let script = self
            .scripts
            .get(address)
            .cloned()
            .unwrap_or(Script::ConnectError {
                delay: Duration::ZERO,
            });
        let guard = InFlight::enter(&self.counters);

        let (status, chunks, fail_after) = match script {
            Script::Respond {
                status,
                chunks,
                delay,
            } => {
                tokio::time::sleep(delay).await;
                (status, chunks, false)
            }
            Script::ReadError {
                status,
                chunks,
                delay,
            } => {
                tokio::time::sleep(delay).await;
                (status, chunks, true)
            }
            Script::ConnectError { delay } => {
                tokio::time::sleep(delay).await;
                return Err(FetchError::Connect(format!("{}: connection refused", address)));
            }
            Script::StallBody { status } => {
                self.counters.opened.fetch_add(1, Ordering::SeqCst);
                return Ok(Box::new(ScriptedBody {
                    status,
                    chunks: Vec::new(),
                    fail_after: false,
                    stall: true,
                    counters: Arc::clone(&self.counters),
                    _guard: guard,
                }));
            }
            Script::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Script::Panic => panic!("scripted worker panic for {}", address),
        };

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let mut chunks: Vec<Bytes> = chunks.into_iter().map(Bytes::from_static).collect();
        chunks.reverse();

        Ok(Box::new(ScriptedBody {
            status,
            chunks,
            fail_after,
            stall: false,
            counters: Arc::clone(&self.counters),
            _guard: guard,
        }))
    }
}

struct ScriptedBody {
    status: &'static str,
    /// 逆序存放，pop 即下一段
    chunks: Vec<Bytes>,
    fail_after: bool,
    stall: bool,
    counters: Arc<Counters>,
    _guard: InFlight,
}

#[async_trait]
impl ResponseBody for ScriptedBody {
    fn status(&self) -> &str {
        self.status
    }

    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        match self.chunks.pop() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.fail_after => Err(FetchError::Read("connection reset by peer".to_string())),
            None => Ok(None),
        }
    }
}

impl Drop for ScriptedBody {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// 用默认前缀构造任务列表
pub fn tasks(raw: &[&str]) -> Vec<Task> {
    crate::models::build_tasks(raw, crate::models::DEFAULT_SCHEME).expect("valid test addresses")
}

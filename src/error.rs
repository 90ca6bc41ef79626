use std::time::Duration;
use thiserror::Error;

/// 单个抓取任务的错误
///
/// 这类错误永远不会越过抓取操作的边界向外传播，
/// 而是被记录在 `FetchResult::error` 中
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 连接失败：请求没有得到任何响应（DNS 解析、连接被拒绝、连接超时）
    #[error("连接失败: {0}")]
    Connect(String),

    /// 读取失败：已经拿到响应，但响应体没有被完整读取
    #[error("读取失败: {0}")]
    Read(String),

    /// 超过任务或批次的截止时间
    ///
    /// 超时的请求整体被放弃，结果不带状态行，即使响应头已经到达
    #[error("抓取超时 (限时 {:.2}s)", .0.as_secs_f64())]
    Timeout(Duration),

    /// 批次被外部取消
    #[error("抓取被取消")]
    Cancelled,

    /// 工作任务异常退出，没有交回结果
    #[error("工作任务异常退出，未返回结果")]
    WorkerLost,
}

impl FetchError {
    /// 是否属于连接失败（没有状态行）
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, FetchError::Connect(_))
    }

    /// 是否属于读取失败（有状态行，但响应体不完整）
    pub fn is_read_failure(&self) -> bool {
        matches!(self, FetchError::Read(_))
    }

    /// 由编排层代替任务合成的错误（超时、取消、工作任务丢失）
    pub fn is_synthesized(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout(_) | FetchError::Cancelled | FetchError::WorkerLost
        )
    }
}

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 输入地址为空
    #[error("第 {index} 个地址为空")]
    EmptyAddress { index: usize },

    /// 任务文件读取或解析失败
    #[error("任务文件错误 ({path}): {message}")]
    TaskFile { path: String, message: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// HTTP 客户端构建失败
    #[error("HTTP 客户端初始化失败: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// 顺序模式遇到失败，整个批次终止
    #[error("顺序抓取在第 {index} 个任务终止 ({address}): {source}")]
    SequentialAborted {
        index: usize,
        address: String,
        #[source]
        source: FetchError,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建任务文件错误
    pub fn task_file(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::TaskFile {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;

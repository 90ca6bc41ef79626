use crate::error::Result;
use crate::models::validate_scheme;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时进行的抓取数量上限，`None` 表示每个任务一个工作任务
    pub max_concurrent_fetches: Option<usize>,
    /// 单个任务的截止时间
    pub task_timeout: Option<Duration>,
    /// 整个批次的截止时间
    pub batch_timeout: Option<Duration>,
    /// 建立连接的超时时间
    pub connect_timeout: Duration,
    /// 顺序模式下内容预览的字节数
    pub preview_len: usize,
    /// 地址缺少协议前缀时补上的默认前缀
    pub default_scheme: String,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: None,
            task_timeout: None,
            batch_timeout: None,
            connect_timeout: Duration::from_secs(10),
            preview_len: 20,
            default_scheme: "http://".to_string(),
            user_agent: format!("fetch_url/{}", env!("CARGO_PKG_VERSION")),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            // 0 与未设置等价：不限制并发
            max_concurrent_fetches: env_parse::<usize>("FETCH_MAX_CONCURRENT")
                .filter(|n| *n > 0)
                .or(default.max_concurrent_fetches),
            task_timeout: env_secs("FETCH_TASK_TIMEOUT_SECS").or(default.task_timeout),
            batch_timeout: env_secs("FETCH_BATCH_TIMEOUT_SECS").or(default.batch_timeout),
            connect_timeout: env_secs("FETCH_CONNECT_TIMEOUT_SECS").unwrap_or(default.connect_timeout),
            preview_len: env_parse("FETCH_PREVIEW_LEN").unwrap_or(default.preview_len),
            default_scheme: std::env::var("FETCH_DEFAULT_SCHEME").unwrap_or(default.default_scheme),
            user_agent: std::env::var("FETCH_USER_AGENT").unwrap_or(default.user_agent),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
        }
    }

    /// 检查环境变量和命令行合并之后的配置
    pub fn validate(&self) -> Result<()> {
        validate_scheme(&self.default_scheme)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_parse::<f64>(key)
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f64)
}

//! 抓取任务
//!
//! 把调用方给出的原始地址变成可以直接请求的任务

use crate::error::{AppError, Result};
use std::fmt::Display;

/// 默认补全的协议前缀
pub const DEFAULT_SCHEME: &str = "http://";

/// 能识别的协议前缀
const KNOWN_SCHEMES: [&str; 2] = ["http://", "https://"];

/// 一个抓取任务
///
/// 创建后不可变，`index` 是它在原始输入中的位置，
/// 并发模式下结果乱序返回时靠它找回身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub index: usize,
    pub address: String,
}

impl Task {
    /// 从原始地址创建任务，地址为空（或只有空白）时报错
    pub fn from_raw(index: usize, raw: &str, default_scheme: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::EmptyAddress { index });
        }

        Ok(Self {
            index,
            address: normalize_address(trimmed, default_scheme),
        })
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[任务 #{} {}]", self.index, self.address)
    }
}

/// 保证地址带有协议前缀
///
/// 已经带有 `http://`、`https://`（或 `default_scheme` 本身）前缀时原样返回，
/// 否则在前面补上 `default_scheme`。纯字符串变换，幂等。
pub fn normalize_address(raw: &str, default_scheme: &str) -> String {
    if has_scheme(raw, default_scheme) {
        raw.to_string()
    } else {
        format!("{}{}", default_scheme, raw)
    }
}

fn has_scheme(address: &str, default_scheme: &str) -> bool {
    KNOWN_SCHEMES
        .iter()
        .copied()
        .chain(std::iter::once(default_scheme))
        .filter(|scheme| !scheme.is_empty())
        .any(|scheme| {
            address
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
}

/// 检查默认协议前缀是否可用：非空，并以 `://` 结尾
pub fn validate_scheme(scheme: &str) -> Result<()> {
    let name = scheme.strip_suffix("://").unwrap_or_default();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
        return Err(AppError::Config(format!(
            "默认协议前缀无效: {:?}，应形如 \"http://\"",
            scheme
        )));
    }
    Ok(())
}

/// 按输入顺序把原始地址列表转换成任务列表
///
/// `default_scheme` 无效时直接报错，不会产生缺少协议前缀的任务
pub fn build_tasks<S: AsRef<str>>(raw_addresses: &[S], default_scheme: &str) -> Result<Vec<Task>> {
    validate_scheme(default_scheme)?;
    raw_addresses
        .iter()
        .enumerate()
        .map(|(index, raw)| Task::from_raw(index, raw.as_ref(), default_scheme))
        .collect()
}

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// TOML 任务文件
///
/// ```toml
/// addresses = ["gopl.io", "https://golang.org"]
/// ```
#[derive(Debug, Deserialize)]
pub struct TaskFile {
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// 从 TOML 文件加载原始地址列表（顺序与文件中一致）
pub async fn load_task_file(path: &Path) -> Result<Vec<String>> {
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::task_file(&path_str, format!("无法读取TOML文件: {}", e)))?;

    let file: TaskFile = toml::from_str(&content)
        .map_err(|e| AppError::task_file(&path_str, format!("无法解析TOML文件: {}", e)))?;

    tracing::info!("从 {} 加载了 {} 个地址", path_str, file.addresses.len());

    Ok(file.addresses)
}

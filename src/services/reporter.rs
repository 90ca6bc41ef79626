//! 结果报告 - 业务能力层
//!
//! 纯函数：把抓取结果转换成文本，不做任何恢复或重试

use crate::models::{BatchSummary, FetchResult, Payload};
use crate::orchestrator::ExecutionMode;
use serde::Serialize;
use std::time::Duration;

/// 单个结果的一行报告
///
/// ```text
/// 【0】Status: 200 OK Time: 0.32s elapsed (http://gopl.io) Count: (   4154 bytes)
/// 【1】Error: 连接失败: ... Time: 0.01s elapsed (http://unreachable.invalid)
/// ```
pub fn format_result(result: &FetchResult) -> String {
    let elapsed = result.elapsed.as_secs_f64();

    match &result.error {
        None => {
            let status = result.status.as_deref().unwrap_or("-");
            let payload = match &result.payload {
                Some(Payload::Preview { preview, .. }) => {
                    format!(" Content: {} ...", single_line(preview))
                }
                Some(Payload::Discarded { byte_count }) => {
                    format!(" Count: ({:7} bytes)", byte_count)
                }
                None => String::new(),
            };
            format!(
                "【{}】Status: {} Time: {:.2}s elapsed ({}){}",
                result.index, status, elapsed, result.address, payload
            )
        }
        Some(error) => {
            let status = result
                .status
                .as_deref()
                .map(|s| format!(" [Status: {}]", s))
                .unwrap_or_default();
            format!(
                "【{}】Error: {}{} Time: {:.2}s elapsed ({})",
                result.index, error, status, elapsed, result.address
            )
        }
    }
}

/// 批次总耗时
pub fn format_total(total_elapsed: Duration) -> String {
    format!("in total: {:.2}s elapsed", total_elapsed.as_secs_f64())
}

/// 文本报告：每个结果一行，最后一行是总耗时
pub fn render_text(summary: &BatchSummary) -> String {
    let mut lines: Vec<String> = summary.results.iter().map(format_result).collect();
    lines.push(format_total(summary.total_elapsed));
    lines.join("\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mode: &'static str,
    total: usize,
    succeeded: usize,
    total_elapsed_secs: f64,
    results: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    index: usize,
    address: &'a str,
    succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    elapsed_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// JSON 报告，字段与文本报告一致
pub fn render_json(summary: &BatchSummary, mode: ExecutionMode) -> serde_json::Result<String> {
    let results = summary
        .results
        .iter()
        .map(|r| JsonEntry {
            index: r.index,
            address: &r.address,
            succeeded: r.succeeded(),
            status: r.status.as_deref(),
            elapsed_secs: r.elapsed.as_secs_f64(),
            bytes: r.payload.as_ref().map(Payload::byte_count),
            preview: match &r.payload {
                Some(Payload::Preview { preview, .. }) => Some(preview.as_str()),
                _ => None,
            },
            error: r.error.as_ref().map(ToString::to_string),
        })
        .collect();

    let report = JsonReport {
        mode: match mode {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Concurrent => "concurrent",
        },
        total: summary.len(),
        succeeded: summary.success_count(),
        total_elapsed_secs: summary.total_elapsed.as_secs_f64(),
        results,
    };

    serde_json::to_string_pretty(&report)
}

/// 预览里的换行等控制字符换成空格，保证一个结果只占一行
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::Task;

    fn task(index: usize, address: &str) -> Task {
        Task {
            index,
            address: address.to_string(),
        }
    }

    #[test]
    fn test_format_discarded_result() {
        let result = FetchResult::success(
            &task(0, "http://gopl.io"),
            "200 OK".to_string(),
            Payload::Discarded { byte_count: 4154 },
            Duration::from_millis(321),
        );
        assert_eq!(
            format_result(&result),
            "【0】Status: 200 OK Time: 0.32s elapsed (http://gopl.io) Count: (   4154 bytes)"
        );
    }

    #[test]
    fn test_format_preview_result_is_single_line() {
        let result = FetchResult::success(
            &task(2, "https://golang.org"),
            "200 OK".to_string(),
            Payload::Preview {
                total_bytes: 100,
                preview: "<!DOCTYPE html>\n<htm".to_string(),
            },
            Duration::from_millis(1000),
        );
        assert_eq!(
            format_result(&result),
            "【2】Status: 200 OK Time: 1.00s elapsed (https://golang.org) Content: <!DOCTYPE html> <htm ..."
        );
    }

    #[test]
    fn test_format_failures() {
        let connect = FetchResult::failure(
            &task(1, "http://unreachable.invalid"),
            None,
            FetchError::Connect("dns error".to_string()),
            Duration::from_millis(12),
        );
        assert_eq!(
            format_result(&connect),
            "【1】Error: 连接失败: dns error Time: 0.01s elapsed (http://unreachable.invalid)"
        );

        let read = FetchResult::failure(
            &task(3, "http://flaky.example"),
            Some("200 OK".to_string()),
            FetchError::Read("reset".to_string()),
            Duration::from_millis(50),
        );
        assert_eq!(
            format_result(&read),
            "【3】Error: 读取失败: reset [Status: 200 OK] Time: 0.05s elapsed (http://flaky.example)"
        );
    }

    #[test]
    fn test_render_text_ends_with_total() {
        let summary = BatchSummary {
            results: vec![FetchResult::success(
                &task(0, "http://a.example"),
                "200 OK".to_string(),
                Payload::Discarded { byte_count: 1 },
                Duration::from_millis(10),
            )],
            total_elapsed: Duration::from_millis(1234),
        };

        let text = render_text(&summary);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "in total: 1.23s elapsed");
    }

    #[test]
    fn test_render_empty_summary() {
        assert_eq!(render_text(&BatchSummary::default()), "in total: 0.00s elapsed");
    }

    #[test]
    fn test_render_json() {
        let summary = BatchSummary {
            results: vec![
                FetchResult::success(
                    &task(0, "http://a.example"),
                    "200 OK".to_string(),
                    Payload::Discarded { byte_count: 7 },
                    Duration::from_millis(10),
                ),
                FetchResult::failure(
                    &task(1, "http://b.example"),
                    None,
                    FetchError::Cancelled,
                    Duration::from_millis(20),
                ),
            ],
            total_elapsed: Duration::from_millis(25),
        };

        let json: serde_json::Value =
            serde_json::from_str(&render_json(&summary, ExecutionMode::Concurrent).unwrap())
                .unwrap();

        assert_eq!(json["mode"], "concurrent");
        assert_eq!(json["total"], 2);
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["results"][0]["bytes"], 7);
        assert_eq!(json["results"][1]["succeeded"], false);
        assert_eq!(json["results"][1]["error"], "抓取被取消");
        assert!(json["results"][1].get("status").is_none());
    }
}

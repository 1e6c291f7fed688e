use std::io::Write;
use std::sync::Mutex;

use colored::Colorize;
use log::warn;
use serde::Serialize;

use crate::input::OutputFormat;
use crate::model::Hit;
use crate::state::ScanSummary;

/// 结果输出端
///
/// 每个命中结果调用一次 `emit`，可能被多个工作协程并发调用。
pub trait ResultSink: Send + Sync {
    fn emit(&self, hit: &Hit);
}

/// 按格式渲染一行结果
pub fn format_hit(hit: &Hit, format: &OutputFormat, show_size: bool) -> String {
    match format {
        OutputFormat::Text => {
            if show_size {
                format!("/{} {} {}", hit.path, hit.status, hit.size)
            } else {
                format!("/{} {}", hit.path, hit.status)
            }
        }
        OutputFormat::Json => {
            let line = JsonLine {
                path: format!("/{}", hit.path),
                status: hit.status,
                size: show_size.then_some(hit.size),
            };
            serde_json::to_string(&line).unwrap_or_default()
        }
    }
}

#[derive(Serialize)]
struct JsonLine {
    path: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

/// 输出到标准输出，每个结果一行
pub struct StdoutSink {
    format: OutputFormat,
    show_size: bool,
}

impl StdoutSink {
    pub fn new(format: OutputFormat, show_size: bool) -> Self {
        StdoutSink { format, show_size }
    }
}

impl ResultSink for StdoutSink {
    fn emit(&self, hit: &Hit) {
        let line = format_hit(hit, &self.format, self.show_size);
        // 整行一次写入，避免多个协程的输出交错在同一行
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            warn!("写入结果失败: {}", e);
        }
    }
}

/// 收集到内存中，供库调用方和测试使用
#[derive(Debug, Default)]
pub struct MemorySink {
    hits: Mutex<Vec<Hit>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> Vec<Hit> {
        match self.hits.lock() {
            Ok(hits) => hits.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ResultSink for MemorySink {
    fn emit(&self, hit: &Hit) {
        match self.hits.lock() {
            Ok(mut hits) => hits.push(hit.clone()),
            Err(poisoned) => poisoned.into_inner().push(hit.clone()),
        }
    }
}

/// 打印汇总信息（标准错误输出）
pub fn print_summary(summary: &ScanSummary) {
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("                    {}", "汇总统计".bold());
    eprintln!("{}", "=".repeat(60));

    eprintln!("开始时间: {}", summary.started_at.format("%Y-%m-%d %H:%M:%S"));
    eprintln!("耗时: {:.2}s", summary.elapsed.as_secs_f64());
    eprintln!("已探测: {}", summary.consumed);
    eprintln!("命中: {}", summary.reported.to_string().green());
    eprintln!("已过滤: {}", summary.filtered);
    if summary.failed > 0 {
        eprintln!("失败: {}", summary.failed.to_string().red());
    }
    if summary.cancelled > 0 {
        eprintln!("已取消: {}", summary.cancelled.to_string().yellow());
    }

    eprintln!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> Hit {
        Hit {
            path: "admin".to_string(),
            status: 200,
            size: 512,
        }
    }

    #[test]
    fn text_line_has_path_status_and_size() {
        assert_eq!(format_hit(&hit(), &OutputFormat::Text, true), "/admin 200 512");
        assert_eq!(format_hit(&hit(), &OutputFormat::Text, false), "/admin 200");
    }

    #[test]
    fn json_line_is_one_object() {
        let line = format_hit(&hit(), &OutputFormat::Json, true);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["path"], "/admin");
        assert_eq!(value["status"], 200);
        assert_eq!(value["size"], 512);
        assert!(!line.contains('\n'));

        let line = format_hit(&hit(), &OutputFormat::Json, false);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value.get("size").is_none());
    }

    #[test]
    fn memory_sink_keeps_every_hit() {
        let sink = MemorySink::new();
        sink.emit(&hit());
        sink.emit(&Hit {
            path: "login".to_string(),
            status: 302,
            size: 0,
        });

        let hits = sink.hits();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].path, "login");
    }
}

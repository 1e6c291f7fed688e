//! # rdiscover
//!
//! 一个基于Rust实现的高性能Web路径/文件暴破工具库。
//!
//! ## 特性
//!
//! - 🚀 **高并发**: 固定数量的异步工作协程共享一个候选词队列
//! - 🎯 **灵活过滤**: 成功状态码白名单、失败状态码黑名单
//! - 🔧 **请求定制**: 前缀、扩展名、Host覆盖、自定义请求头、Cookie、User-Agent
//! - 🛑 **可中断**: 通过取消令牌随时停止扫描
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use rdiscover::discover_paths;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hits = discover_paths("http://127.0.0.1:8080", "words.txt").await?;
//!
//!     println!("发现 {} 个路径", hits.len());
//!     for hit in hits.iter().take(5) {
//!         println!("  /{} {} {}", hit.path, hit.status, hit.size);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 高级配置
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rdiscover::{ClassificationPolicy, DiscoverConfig, DiscoverEngine, StdoutSink, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DiscoverConfig::new("https://target.local", "words.txt")
//!         .with_concurrency(32)
//!         .with_timeout(Duration::from_secs(3))
//!         .with_extension("php")
//!         .with_policy(ClassificationPolicy::new([], [404]));
//!
//!     let sink = Arc::new(StdoutSink::new(OutputFormat::Text, true));
//!     let summary = DiscoverEngine::new(config, sink)?.run().await;
//!     println!("命中 {} 个", summary.reported);
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod classify;
pub mod error;
pub mod handle;
pub mod input;
pub mod logger;
pub mod model;
pub mod pool;
pub mod probe;
pub mod request;
pub mod state;
pub mod wordlist;

// 重新导出主要的公共API
pub use api::{discover_paths, DiscoverConfig, DiscoverEngine, DEFAULT_USER_AGENT};

pub use classify::{ClassificationPolicy, COMMON_SUCCESS_CODES};
pub use error::{DiscoverError, DiscoverResult, ProbeError};
pub use handle::{MemorySink, ResultSink, StdoutSink};
pub use input::OutputFormat;
pub use model::{Hit, ProbeOutcome};
pub use state::ScanSummary;
pub use wordlist::WordSource;

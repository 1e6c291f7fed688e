//! 错误类型
//!
//! `DiscoverError` 只用于启动阶段的致命错误；单个候选词的失败使用
//! `ProbeError`，它不会离开工作协程。

use thiserror::Error;

/// 启动阶段的致命错误
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("无法打开字典文件 {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("无法读取cookie文件 {path}: {source}")]
    CookieUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("缺少必需参数 {0}")]
    MissingArgument(String),

    #[error("无效的状态码: {0}")]
    InvalidStatusCode(String),

    #[error("无效的目标URL: {0}")]
    InvalidTarget(String),

    #[error("无效的请求头: {0}")]
    InvalidHeader(String),

    #[error("HTTP客户端初始化失败: {0}")]
    Client(#[from] native_tls::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 启动阶段的结果类型
pub type DiscoverResult<T> = Result<T, DiscoverError>;

/// 单个候选词的失败原因，只会被计数和记录日志
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("构造请求失败: {0}")]
    Build(String),

    #[error("请求超时")]
    Timeout,

    #[error("传输错误: {0}")]
    Transport(hyper::Error),

    #[error("已取消")]
    Cancelled,
}

impl From<hyper::Error> for ProbeError {
    fn from(err: hyper::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Transport(err)
        }
    }
}

impl From<hyper::http::Error> for ProbeError {
    fn from(err: hyper::http::Error) -> Self {
        ProbeError::Build(err.to_string())
    }
}

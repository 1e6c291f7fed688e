use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::classify::ClassificationPolicy;
use crate::error::DiscoverResult;
use crate::handle::{MemorySink, ResultSink};
use crate::input::OutputFormat;
use crate::model::Hit;
use crate::pool::WorkerPool;
use crate::probe::Prober;
use crate::request::RequestTemplate;
use crate::state::ScanSummary;
use crate::wordlist::WordSource;

/// 默认的 User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!(
    "rdiscover/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/o0x1024/rdiscover)"
);

/// 默认的单次请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// 扫描配置，启动时构造一次，之后只读
#[derive(Debug, Clone)]
pub struct DiscoverConfig {
    /// 目标URL，缺少末尾的 `/` 时会自动补全
    pub target: String,
    /// 字典文件路径
    pub wordlist: String,
    /// 并发工作协程数量
    pub concurrency: usize,
    /// 单次请求超时
    pub timeout: Duration,
    /// 覆盖 Host 请求头
    pub host: Option<String>,
    /// 自定义请求头 (key, value)，两者都不为空时才发送
    pub custom_header: Option<(String, String)>,
    /// 文件扩展名（不带点）
    pub extension: Option<String>,
    /// 加在每个候选词前面的前缀
    pub prefix: Option<String>,
    /// Cookie 请求头的值
    pub cookie: Option<String>,
    pub user_agent: String,
    /// 跳过TLS证书校验
    pub insecure: bool,
    /// 不发送 `Connection: close`，复用连接
    pub keep_alive: bool,
    pub policy: ClassificationPolicy,
    /// 输出中是否包含响应体字节数
    pub show_size: bool,
    pub format: OutputFormat,
    pub silent: bool,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        DiscoverConfig {
            target: String::new(),
            wordlist: String::new(),
            concurrency: num_cpus::get(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            host: None,
            custom_header: None,
            extension: None,
            prefix: None,
            cookie: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            insecure: false,
            keep_alive: false,
            policy: ClassificationPolicy::report_all(),
            show_size: true,
            format: OutputFormat::Text,
            silent: false,
        }
    }
}

impl DiscoverConfig {
    pub fn new(target: impl Into<String>, wordlist: impl Into<String>) -> Self {
        DiscoverConfig {
            target: target.into(),
            wordlist: wordlist.into(),
            ..Default::default()
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// 路径暴破引擎
///
/// `new` 完成所有会导致致命错误的准备工作（打开字典、校验目标和请求头、
/// 创建HTTP客户端），`run` 只会产生单个候选词级别的失败。
pub struct DiscoverEngine {
    words: WordSource,
    pool: WorkerPool,
    base: String,
}

impl DiscoverEngine {
    pub fn new(config: DiscoverConfig, sink: Arc<dyn ResultSink>) -> DiscoverResult<Self> {
        let template = RequestTemplate::from_config(&config)?;
        let prober = Prober::new(config.timeout, config.insecure)?;
        let words = WordSource::open(&config.wordlist)?;

        if config.concurrency == 0 {
            warn!("并发数为0，使用1个工作协程");
        }
        let base = template.base().to_string();
        let pool = WorkerPool::new(config.concurrency, template, prober, config.policy, sink);

        Ok(DiscoverEngine { words, pool, base })
    }

    /// 执行扫描直到字典读完
    pub async fn run(self) -> ScanSummary {
        self.run_with_cancel(CancellationToken::new()).await
    }

    /// 执行扫描，`cancel` 被触发时尽快停止
    pub async fn run_with_cancel(self, cancel: CancellationToken) -> ScanSummary {
        info!("Discovering assets on {}", self.base);
        info!("并发数: {}", self.pool.concurrency());

        let (words, producer) = self.words.spawn(cancel.clone());
        self.pool.run(words, cancel.clone()).await;

        let produced = match producer.await {
            Ok(produced) => produced,
            Err(e) => {
                warn!("字典读取任务异常退出: {}", e);
                0
            }
        };
        if produced == 0 && !cancel.is_cancelled() {
            warn!("字典为空，没有可探测的候选词");
        }
        if cancel.is_cancelled() {
            warn!("扫描已中断");
        }

        self.pool.state().summary()
    }
}

/// 便捷的路径暴破函数，返回所有命中结果
pub async fn discover_paths(target: &str, wordlist: &str) -> DiscoverResult<Vec<Hit>> {
    let sink = Arc::new(MemorySink::new());
    let engine = DiscoverEngine::new(DiscoverConfig::new(target, wordlist), sink.clone())?;
    engine.run().await;
    Ok(sink.hits())
}

use std::sync::Arc;

use log::{debug, error};
use tokio_util::sync::CancellationToken;

use crate::classify::ClassificationPolicy;
use crate::error::ProbeError;
use crate::handle::ResultSink;
use crate::model::Hit;
use crate::probe::Prober;
use crate::request::RequestTemplate;
use crate::state::ScanState;

/// 固定数量的工作协程，共享同一个候选词队列
pub struct WorkerPool {
    concurrency: usize,
    template: Arc<RequestTemplate>,
    prober: Arc<Prober>,
    policy: Arc<ClassificationPolicy>,
    sink: Arc<dyn ResultSink>,
    state: ScanState,
}

impl WorkerPool {
    pub fn new(
        concurrency: usize,
        template: RequestTemplate,
        prober: Prober,
        policy: ClassificationPolicy,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        WorkerPool {
            concurrency: concurrency.max(1),
            template: Arc::new(template),
            prober: Arc::new(prober),
            policy: Arc::new(policy),
            sink,
            state: ScanState::new(),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// 启动所有工作协程并等待它们结束
    ///
    /// 队列关闭且所有在途请求完成后返回；取消时工作协程不再取新的候选词，
    /// 在途请求直接放弃。
    pub async fn run(&self, words: async_channel::Receiver<String>, cancel: CancellationToken) {
        let mut tasks = Vec::with_capacity(self.concurrency);
        for id in 0..self.concurrency {
            let worker = Worker {
                id,
                template: Arc::clone(&self.template),
                prober: Arc::clone(&self.prober),
                policy: Arc::clone(&self.policy),
                sink: Arc::clone(&self.sink),
                state: self.state.clone(),
            };
            tasks.push(tokio::spawn(worker.run(words.clone(), cancel.clone())));
        }
        // 只保留工作协程持有的接收端，全部退出后生产者的发送会失败
        drop(words);

        for task in tasks {
            if let Err(e) = task.await {
                error!("工作协程异常退出: {}", e);
            }
        }
    }
}

struct Worker {
    id: usize,
    template: Arc<RequestTemplate>,
    prober: Arc<Prober>,
    policy: Arc<ClassificationPolicy>,
    sink: Arc<dyn ResultSink>,
    state: ScanState,
}

impl Worker {
    async fn run(self, words: async_channel::Receiver<String>, cancel: CancellationToken) {
        loop {
            let word = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                word = words.recv() => match word {
                    Ok(word) => word,
                    Err(_) => break,
                },
            };
            self.state.record_consumed();
            self.handle_word(&word, &cancel).await;
        }
        debug!("工作协程 {} 退出", self.id);
    }

    async fn handle_word(&self, word: &str, cancel: &CancellationToken) {
        let request = match self.template.build(word) {
            Ok(request) => request,
            Err(e) => {
                debug!("跳过 {}: {}", word, e);
                self.state.record_failed();
                return;
            }
        };
        let path = request.path.clone();

        match self.prober.probe_with_cancel(request, cancel).await {
            Ok(outcome) => {
                if self.policy.should_report(outcome.status) {
                    self.sink.emit(&Hit {
                        path,
                        status: outcome.status,
                        size: outcome.size,
                    });
                    self.state.record_reported();
                } else {
                    self.state.record_filtered();
                }
            }
            Err(ProbeError::Cancelled) => self.state.record_cancelled(),
            Err(e) => {
                debug!("/{}: {}", path, e);
                self.state.record_failed();
            }
        }
    }
}

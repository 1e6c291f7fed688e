//! 扫描过程中的计数器
//!
//! 工作协程之间只共享原子计数，不保存任何单个结果。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// 扫描状态，克隆后指向同一组计数器
#[derive(Debug, Clone)]
pub struct ScanState {
    counters: Arc<Counters>,
    started: Instant,
    started_at: DateTime<Local>,
}

#[derive(Debug, Default)]
struct Counters {
    consumed: AtomicUsize,
    reported: AtomicUsize,
    filtered: AtomicUsize,
    failed: AtomicUsize,
    cancelled: AtomicUsize,
}

/// 扫描结束后的汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// 工作协程取到的候选词数量
    pub consumed: usize,
    pub reported: usize,
    /// 请求完成但被分类策略过滤
    pub filtered: usize,
    /// 构造失败、超时或传输错误
    pub failed: usize,
    pub cancelled: usize,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn completed(&self) -> usize {
        self.reported + self.filtered
    }
}

impl ScanState {
    pub fn new() -> Self {
        ScanState {
            counters: Arc::new(Counters::default()),
            started: Instant::now(),
            started_at: Local::now(),
        }
    }

    pub fn record_consumed(&self) {
        self.counters.consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reported(&self) {
        self.counters.reported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.counters.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            consumed: self.counters.consumed.load(Ordering::Relaxed),
            reported: self.counters.reported.load(Ordering::Relaxed),
            filtered: self.counters.filtered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            cancelled: self.counters.cancelled.load(Ordering::Relaxed),
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_thread_safety() {
        let state = ScanState::new();
        let mut handles = vec![];

        // 多个线程同时更新计数
        for i in 0..10 {
            let state_clone = state.clone();
            let handle = thread::spawn(move || {
                for _ in 0..100 {
                    state_clone.record_consumed();
                }
                if i % 2 == 0 {
                    state_clone.record_reported();
                } else {
                    state_clone.record_failed();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let summary = state.summary();
        assert_eq!(summary.consumed, 1000);
        assert_eq!(summary.reported, 5);
        assert_eq!(summary.failed, 5);
    }

    #[test]
    fn test_state_isolation() {
        let state1 = ScanState::new();
        let state2 = ScanState::new();

        state1.record_filtered();
        state1.record_reported();
        state2.record_cancelled();

        assert_eq!(state1.summary().completed(), 2);
        assert_eq!(state2.summary().completed(), 0);
        assert_eq!(state2.summary().cancelled, 1);
    }
}

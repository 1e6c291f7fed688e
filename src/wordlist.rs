use std::fs::File;

use log::{debug, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{DiscoverError, DiscoverResult};

/// 字典来源
///
/// 按文件顺序逐行产出去除首尾空白后的非空行，只能读取一遍。
pub struct WordSource {
    reader: Box<dyn AsyncBufRead + Send + Unpin>,
}

impl WordSource {
    /// 打开字典文件，文件无法打开时返回 `SourceUnavailable`
    pub fn open(path: &str) -> DiscoverResult<Self> {
        let file = File::open(path).map_err(|source| DiscoverError::SourceUnavailable {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(tokio::fs::File::from_std(file))))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        WordSource {
            reader: Box::new(reader),
        }
    }

    /// 读取下一个候选词，读完或读取出错时返回 `None`
    pub async fn next_word(&mut self) -> Option<String> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf).await {
                Ok(0) => return None,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let word = line.trim();
                    if !word.is_empty() {
                        return Some(word.to_string());
                    }
                }
                Err(e) => {
                    warn!("读取字典失败: {}", e);
                    return None;
                }
            }
        }
    }

    /// 启动生产者任务
    ///
    /// 队列容量为1，消费者每次只拿到一个候选词。字典读完或收到取消信号后
    /// 队列关闭，任务返回已投递的候选词数量。
    pub fn spawn(
        mut self,
        cancel: CancellationToken,
    ) -> (async_channel::Receiver<String>, JoinHandle<usize>) {
        let (tx, rx) = async_channel::bounded(1);

        let handle = tokio::spawn(async move {
            let mut produced = 0usize;
            loop {
                let word = tokio::select! {
                    _ = cancel.cancelled() => break,
                    word = self.next_word() => word,
                };
                let Some(word) = word else { break };

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = tx.send(word) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
                produced += 1;
            }
            tx.close();
            debug!("字典读取结束，共投递 {} 个候选词", produced);
            produced
        });

        (rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn source(text: &str) -> WordSource {
        WordSource::from_reader(Cursor::new(text.as_bytes().to_vec()))
    }

    #[tokio::test]
    async fn yields_trimmed_non_empty_lines_in_order() {
        let mut words = source("admin\n\n  login \r\n\t\nbackup.zip");
        assert_eq!(words.next_word().await.as_deref(), Some("admin"));
        assert_eq!(words.next_word().await.as_deref(), Some("login"));
        assert_eq!(words.next_word().await.as_deref(), Some("backup.zip"));
        assert_eq!(words.next_word().await, None);
        assert_eq!(words.next_word().await, None);
    }

    #[tokio::test]
    async fn spawned_producer_closes_queue_when_exhausted() {
        let (rx, handle) = source("a\nb\nc\n").spawn(CancellationToken::new());

        let mut received = Vec::new();
        while let Ok(word) = rx.recv().await {
            received.push(word);
        }

        assert_eq!(received, vec!["a", "b", "c"]);
        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn cancelled_producer_stops_delivering() {
        let cancel = CancellationToken::new();
        let (rx, handle) = source("a\nb\nc\nd\n").spawn(cancel.clone());

        assert_eq!(rx.recv().await.unwrap(), "a");
        cancel.cancel();

        let produced = handle.await.unwrap();
        assert!(produced <= 2);
        // 队列已关闭，最多还剩一个已缓冲的候选词
        let mut rest = 0;
        while rx.recv().await.is_ok() {
            rest += 1;
        }
        assert!(rest <= 1);
    }

    #[tokio::test]
    async fn opens_word_list_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "index.php").unwrap();
        writeln!(file, "robots.txt").unwrap();

        let mut words = WordSource::open(file.path().to_str().unwrap()).unwrap();
        assert_eq!(words.next_word().await.as_deref(), Some("index.php"));
        assert_eq!(words.next_word().await.as_deref(), Some("robots.txt"));
        assert_eq!(words.next_word().await, None);
    }

    #[test]
    fn missing_word_list_is_source_unavailable() {
        let err = WordSource::open("/nonexistent/rdiscover/words.txt").err().unwrap();
        assert!(matches!(err, DiscoverError::SourceUnavailable { .. }));
    }
}

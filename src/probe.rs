use std::time::Duration;

use hyper::body::HttpBody;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Method, Request};
use hyper_tls::HttpsConnector;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::error::{DiscoverResult, ProbeError};
use crate::model::ProbeOutcome;
use crate::request::ProbeRequest;

/// 探测执行器
///
/// 内部的 `Client` 自带连接池，可以在工作协程之间共享。客户端从不跟随重定向，
/// 请求路径按原样发送。
#[derive(Clone)]
pub struct Prober {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    timeout_duration: Option<Duration>,
}

impl Prober {
    /// 创建执行器，`insecure` 时跳过证书校验
    ///
    /// `timeout_duration` 为0表示不限制超时。
    pub fn new(timeout_duration: Duration, insecure: bool) -> DiscoverResult<Self> {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(insecure)
            .danger_accept_invalid_hostnames(insecure)
            .build()?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        let connector = HttpsConnector::from((http, tokio_native_tls::TlsConnector::from(tls)));

        Ok(Prober {
            client: Client::builder().build(connector),
            timeout_duration: (!timeout_duration.is_zero()).then_some(timeout_duration),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_duration
    }

    /// 发送一次GET请求，读完并丢弃响应体，返回状态码和字节数
    ///
    /// 超时覆盖整个过程，包括读取响应体。
    pub async fn probe(&self, request: ProbeRequest) -> Result<ProbeOutcome, ProbeError> {
        match self.timeout_duration {
            Some(limit) => timeout(limit, self.fetch(request))
                .await
                .map_err(|_| ProbeError::Timeout)?,
            None => self.fetch(request).await,
        }
    }

    /// 与 `probe` 相同，但收到取消信号时立即放弃
    pub async fn probe_with_cancel(
        &self,
        request: ProbeRequest,
        cancel: &CancellationToken,
    ) -> Result<ProbeOutcome, ProbeError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ProbeError::Cancelled),
            outcome = self.probe(request) => outcome,
        }
    }

    async fn fetch(&self, request: ProbeRequest) -> Result<ProbeOutcome, ProbeError> {
        let mut req = Request::builder()
            .method(Method::GET)
            .uri(request.url)
            .body(Body::empty())?;
        *req.headers_mut() = request.headers;

        let response = self.client.request(req).await?;

        let status = response.status().as_u16();
        let mut body = response.into_body();
        let mut size = 0u64;
        while let Some(chunk) = body.data().await {
            size += chunk?.len() as u64;
        }

        Ok(ProbeOutcome { status, size })
    }
}

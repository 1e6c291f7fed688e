use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, CONNECTION, COOKIE, HOST, USER_AGENT,
};
use hyper::Uri;

use crate::api::DiscoverConfig;
use crate::error::{DiscoverError, DiscoverResult, ProbeError};

/// 单个候选词对应的请求，构造后不再修改
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// 实际探测的路径片段，`prefix + word [+ "." + extension]`
    pub path: String,
    pub url: Uri,
    pub headers: HeaderMap,
}

/// 请求模板
///
/// 启动时由配置生成一次，所有工作协程只读共享。请求头在这里提前校验，
/// 每个候选词只需拼接路径。
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    base: String,
    prefix: String,
    extension: Option<String>,
    host: Option<HeaderValue>,
    custom_header: Option<(HeaderName, HeaderValue)>,
    cookie: Option<HeaderValue>,
    user_agent: HeaderValue,
    keep_alive: bool,
}

impl RequestTemplate {
    pub fn from_config(config: &DiscoverConfig) -> DiscoverResult<Self> {
        let base = normalize_target(&config.target)?;

        let host = config
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| header_value("Host", h))
            .transpose()?;

        let custom_header = match &config.custom_header {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                let name = HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| DiscoverError::InvalidHeader(key.clone()))?;
                Some((name, header_value(key, value)?))
            }
            _ => None,
        };

        let cookie = config
            .cookie
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|c| header_value("Cookie", c))
            .transpose()?;

        Ok(RequestTemplate {
            base,
            prefix: config.prefix.clone().unwrap_or_default(),
            extension: config.extension.clone().filter(|e| !e.is_empty()),
            host,
            custom_header,
            cookie,
            user_agent: header_value("User-Agent", &config.user_agent)?,
            keep_alive: config.keep_alive,
        })
    }

    /// 规范化后的目标URL，总是以 `/` 结尾
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn effective_path(&self, word: &str) -> String {
        match &self.extension {
            Some(ext) => format!("{}{}.{}", self.prefix, word, ext),
            None => format!("{}{}", self.prefix, word),
        }
    }

    /// 为候选词构造请求，失败时只跳过该候选词
    ///
    /// 路径原样拼接在目标后面，`.` 和 `..` 不做解析。
    pub fn build(&self, word: &str) -> Result<ProbeRequest, ProbeError> {
        let path = self.effective_path(word);
        let target = format!("{}{}", self.base, encode_path(&path));
        let url = target
            .parse::<Uri>()
            .map_err(|e| ProbeError::Build(format!("{}: {}", target, e)))?;

        let mut headers = HeaderMap::new();
        // Host 只影响请求头，不出现在URL中
        if let Some(host) = &self.host {
            headers.insert(HOST, host.clone());
        }
        if let Some((name, value)) = &self.custom_header {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, cookie.clone());
        }
        headers.insert(USER_AGENT, self.user_agent.clone());
        if !self.keep_alive {
            headers.insert(CONNECTION, HeaderValue::from_static("close"));
        }

        Ok(ProbeRequest { path, url, headers })
    }
}

/// 补全末尾的 `/` 并检查URL是否为 http/https
pub fn normalize_target(target: &str) -> DiscoverResult<String> {
    let target = target.trim();
    let mut base = target.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    let url = base
        .parse::<Uri>()
        .map_err(|e| DiscoverError::InvalidTarget(format!("{}: {}", target, e)))?;
    if url.host().map_or(true, str::is_empty) {
        return Err(DiscoverError::InvalidTarget(format!("{}: 缺少主机名", target)));
    }
    match url.scheme_str() {
        Some("http") | Some("https") => Ok(base),
        scheme => Err(DiscoverError::InvalidTarget(format!(
            "{}: 不支持的协议 {}",
            target,
            scheme.unwrap_or("")
        ))),
    }
}

/// 转义路径中URI不允许出现的字节，已有的 `%XX`、`/`、`?` 保持不变
fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => encoded.push(byte as char),
            b'-' | b'.' | b'_' | b'~' | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*'
            | b'+' | b',' | b';' | b'=' | b':' | b'@' | b'/' | b'%' | b'?' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

fn header_value(name: &str, value: &str) -> DiscoverResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| DiscoverError::InvalidHeader(format!("{}: {}", name, value)))
}

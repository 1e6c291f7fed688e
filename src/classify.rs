use std::collections::HashSet;

use crate::error::{DiscoverError, DiscoverResult};

/// 常见的成功/重定向状态码，`--common-codes` 时作为成功集合
pub const COMMON_SUCCESS_CODES: &[u16] = &[200, 204, 301, 302, 307, 401, 403];

/// 状态码分类策略
///
/// 失败集合非空时优先生效：除失败集合外的状态码全部上报；
/// 否则成功集合为空时全部上报，不为空时只上报成功集合中的状态码。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationPolicy {
    success: HashSet<u16>,
    failure: HashSet<u16>,
}

impl ClassificationPolicy {
    pub fn new<S, F>(success: S, failure: F) -> Self
    where
        S: IntoIterator<Item = u16>,
        F: IntoIterator<Item = u16>,
    {
        ClassificationPolicy {
            success: success.into_iter().collect(),
            failure: failure.into_iter().collect(),
        }
    }

    /// 上报所有结果
    pub fn report_all() -> Self {
        Self::default()
    }

    /// 以 `COMMON_SUCCESS_CODES` 作为成功集合
    pub fn common() -> Self {
        Self::new(COMMON_SUCCESS_CODES.iter().copied(), [])
    }

    /// 从命令行字符串解析，例如 `"200,301"`
    pub fn from_lists(success: &str, failure: &str) -> DiscoverResult<Self> {
        Ok(Self::new(
            parse_status_codes(success)?,
            parse_status_codes(failure)?,
        ))
    }

    /// 判断该状态码是否应当上报
    pub fn should_report(&self, status: u16) -> bool {
        if !self.failure.is_empty() {
            return !self.failure.contains(&status);
        }
        if self.success.is_empty() {
            return true;
        }
        self.success.contains(&status)
    }

    pub fn success_codes(&self) -> &HashSet<u16> {
        &self.success
    }

    pub fn failure_codes(&self) -> &HashSet<u16> {
        &self.failure
    }
}

/// 解析逗号分隔的状态码列表，空字符串得到空列表
pub fn parse_status_codes(codes: &str) -> DiscoverResult<Vec<u16>> {
    if codes.trim().is_empty() {
        return Ok(Vec::new());
    }

    codes
        .split(',')
        .map(str::trim)
        .map(|code| {
            code.parse::<u16>()
                .map_err(|_| DiscoverError::InvalidStatusCode(code.to_string()))
        })
        .collect()
}

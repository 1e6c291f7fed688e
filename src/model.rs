/// 一次成功完成的探测：状态码和响应体字节数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: u16,
    pub size: u64,
}

/// 需要上报的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub path: String,
    pub status: u16,
    pub size: u64,
}

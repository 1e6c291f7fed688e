use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::api::{DiscoverConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::classify::{parse_status_codes, ClassificationPolicy, COMMON_SUCCESS_CODES};
use crate::error::{DiscoverError, DiscoverResult};

/// 输出格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("不支持的输出格式: {}。支持的格式: text, json", s)),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rdiscover")]
#[command(author = "gelenlen")]
#[command(version)]
#[command(about = "A tool for brute-forcing paths and files on web servers", long_about = None)]
#[command(disable_help_flag = true)]
pub struct Opts {
    /// target url
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// wordlist
    #[arg(short = 'w', long = "wordlist")]
    pub wordlist: Option<String>,

    /// number of concurrent requests
    #[arg(short = 'c', long, default_value_t = num_cpus::get())]
    pub concurrency: usize,

    /// timeout in seconds
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// host header
    #[arg(short = 'h', long = "host")]
    pub host: Option<String>,

    /// add a custom header to all requests (key)
    #[arg(long = "ck")]
    pub custom_key: Option<String>,

    /// add a custom header to all requests (value)
    #[arg(long = "cv")]
    pub custom_value: Option<String>,

    /// file extension to add (without dot prefix)
    #[arg(short = 'e', long)]
    pub extension: Option<String>,

    /// status codes indicating success, separated by commas
    #[arg(short = 's', long)]
    pub success: Option<String>,

    /// status codes indicating failure, separated by commas
    #[arg(short = 'f', long)]
    pub failure: Option<String>,

    /// use the common success codes when -s is not given
    #[arg(long)]
    pub common_codes: bool,

    /// user-agent to use
    #[arg(short = 'a', long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// file containing cookies
    #[arg(long = "cookies")]
    pub cookies: Option<String>,

    /// prefix to add to word/directory
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// ignore HTTPS errors
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// reuse connections instead of sending `Connection: close`
    #[arg(long)]
    pub keep_alive: bool,

    /// do not print the response size
    #[arg(long)]
    pub hide_size: bool,

    /// output format (text, json)
    #[arg(long, default_value = "text", value_parser = OutputFormat::from_str)]
    pub format: OutputFormat,

    /// show debug logs, including failed requests
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// only print results
    #[arg(short = 'q', long)]
    pub silent: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Opts {
    /// 没有给出目标URL，空字符串同样视为未给出
    pub fn missing_url(&self) -> bool {
        is_blank(self.url.as_deref())
    }

    /// 没有给出字典文件，空字符串同样视为未给出
    pub fn missing_wordlist(&self) -> bool {
        is_blank(self.wordlist.as_deref())
    }

    /// 转换为扫描配置，校验状态码并读取cookie文件
    pub fn into_config(self) -> DiscoverResult<DiscoverConfig> {
        if self.missing_url() {
            return Err(DiscoverError::MissingArgument("-u".to_string()));
        }
        if self.missing_wordlist() {
            return Err(DiscoverError::MissingArgument("-w".to_string()));
        }
        let target = self.url.unwrap_or_default();
        let wordlist = self.wordlist.unwrap_or_default();

        let failure = parse_status_codes(self.failure.as_deref().unwrap_or_default())?;
        let policy = match self.success.as_deref() {
            Some(success) => ClassificationPolicy::new(parse_status_codes(success)?, failure),
            None if self.common_codes => {
                ClassificationPolicy::new(COMMON_SUCCESS_CODES.iter().copied(), failure)
            }
            None => ClassificationPolicy::new([], failure),
        };

        let cookie = match self.cookies.as_deref() {
            Some(path) => read_cookie_file(path)?,
            None => None,
        };

        let custom_header = match (self.custom_key, self.custom_value) {
            (Some(key), Some(value)) => Some((key, value)),
            _ => None,
        };

        Ok(DiscoverConfig {
            target,
            wordlist,
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout),
            host: self.host,
            custom_header,
            extension: self.extension,
            prefix: self.prefix,
            cookie,
            user_agent: self.user_agent,
            insecure: self.insecure,
            keep_alive: self.keep_alive,
            policy,
            show_size: !self.hide_size,
            format: self.format,
            silent: self.silent,
        })
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// 读取cookie文件，去除首尾空白，空文件视为没有cookie
pub fn read_cookie_file(path: &str) -> DiscoverResult<Option<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| DiscoverError::CookieUnavailable {
        path: path.to_string(),
        source,
    })?;
    let cookie = content.trim();
    Ok((!cookie.is_empty()).then(|| cookie.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Opts {
        let mut argv = vec!["rdiscover"];
        argv.extend_from_slice(args);
        Opts::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_the_classic_tool() {
        let opts = parse(&["-u", "http://x", "-w", "words.txt"]);
        assert_eq!(opts.timeout, 5);
        assert_eq!(opts.concurrency, num_cpus::get());
        assert_eq!(opts.user_agent, DEFAULT_USER_AGENT);
        assert!(!opts.insecure);

        let config = opts.into_config().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.policy, ClassificationPolicy::report_all());
        assert!(config.show_size);
        assert!(config.cookie.is_none());
    }

    #[test]
    fn empty_url_or_wordlist_counts_as_missing() {
        let opts = parse(&["-u", "", "-w", "words.txt"]);
        assert!(opts.missing_url());
        assert!(!opts.missing_wordlist());
        let err = opts.into_config().unwrap_err();
        assert!(matches!(err, DiscoverError::MissingArgument(flag) if flag == "-u"));

        let opts = parse(&["-u", "http://x", "-w", " "]);
        assert!(opts.missing_wordlist());
        let err = opts.into_config().unwrap_err();
        assert!(matches!(err, DiscoverError::MissingArgument(flag) if flag == "-w"));

        assert!(parse(&[]).missing_url());
    }

    #[test]
    fn short_h_is_the_host_override() {
        let opts = parse(&["-u", "http://x", "-w", "w", "-h", "vhost.local", "-k"]);
        assert_eq!(opts.host.as_deref(), Some("vhost.local"));
        assert!(opts.insecure);
    }

    #[test]
    fn custom_header_needs_both_flags() {
        let config = parse(&["-u", "http://x", "-w", "w", "--ck", "X-A"]).into_config().unwrap();
        assert!(config.custom_header.is_none());

        let config = parse(&["-u", "http://x", "-w", "w", "--ck", "X-A", "--cv", "1"])
            .into_config()
            .unwrap();
        assert_eq!(config.custom_header, Some(("X-A".to_string(), "1".to_string())));
    }

    #[test]
    fn status_code_lists_build_the_policy() {
        let config = parse(&["-u", "http://x", "-w", "w", "-s", "200,301", "-f", "404"])
            .into_config()
            .unwrap();
        assert!(config.policy.should_report(500));
        assert!(!config.policy.should_report(404));

        let config = parse(&["-u", "http://x", "-w", "w", "--common-codes"]).into_config().unwrap();
        assert!(config.policy.should_report(302));
        assert!(!config.policy.should_report(404));
    }

    #[test]
    fn invalid_failure_codes_are_fatal() {
        let err = parse(&["-u", "http://x", "-w", "w", "-f", "40x"]).into_config().unwrap_err();
        assert!(matches!(err, DiscoverError::InvalidStatusCode(code) if code == "40x"));

        let err = parse(&["-u", "http://x", "-w", "w", "-s", "ok"]).into_config().unwrap_err();
        assert!(matches!(err, DiscoverError::InvalidStatusCode(_)));
    }

    #[test]
    fn cookie_file_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  session=abc; csrf=1  ").unwrap();
        let path = file.path().to_str().unwrap();

        let config = parse(&["-u", "http://x", "-w", "w", "--cookies", path]).into_config().unwrap();
        assert_eq!(config.cookie.as_deref(), Some("session=abc; csrf=1"));
    }

    #[test]
    fn missing_cookie_file_is_fatal() {
        let err = parse(&["-u", "http://x", "-w", "w", "--cookies", "/nonexistent/cookies.txt"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, DiscoverError::CookieUnavailable { .. }));
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());

        let opts = parse(&["-u", "http://x", "-w", "w", "--format", "json", "--hide-size"]);
        let config = opts.into_config().unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.show_size);
    }
}

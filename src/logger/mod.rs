use env_logger::{Builder, Env};
use log::LevelFilter;

/// 初始化日志，输出到标准错误
///
/// 默认 info；`verbose` 为 debug，`silent` 为 warn。设置了 `RUST_LOG` 时以环境变量为准。
pub fn init_logger(verbose: bool, silent: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if silent {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let _ = Builder::new()
        .filter_level(level)
        .parse_env(Env::default())
        .format_target(false)
        .format_timestamp_secs()
        .try_init();
}

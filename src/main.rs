use std::sync::Arc;

use clap::Parser;
use log::{error, warn};
use tokio_util::sync::CancellationToken;

use rdiscover::error::DiscoverResult;
use rdiscover::handle::{self, StdoutSink};
use rdiscover::input::Opts;
use rdiscover::logger;
use rdiscover::DiscoverEngine;

#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    logger::init_logger(opts.verbose, opts.silent);

    if opts.missing_url() {
        println!("You must specify a target URL with the -u parameter.");
        return;
    }
    if opts.missing_wordlist() {
        println!("You must specify a word list with the -w parameter.");
        return;
    }

    if let Err(e) = run_discover(opts).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// 执行路径暴破主逻辑
async fn run_discover(opts: Opts) -> DiscoverResult<()> {
    let config = opts.into_config()?;
    let silent = config.silent;

    let sink = Arc::new(StdoutSink::new(config.format, config.show_size));
    let engine = DiscoverEngine::new(config, sink)?;

    let cancel = CancellationToken::new();
    start_interrupt_handler(cancel.clone());

    let summary = engine.run_with_cancel(cancel).await;

    if !silent {
        handle::print_summary(&summary);
    }
    Ok(())
}

/// Ctrl-C 时取消扫描
fn start_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("收到中断信号，正在停止...");
                cancel.cancel();
            }
            Err(e) => warn!("无法监听中断信号: {}", e),
        }
    });
}

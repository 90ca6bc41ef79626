use anyhow::Result;
use clap::Parser;
use fetch_url::cli::Args;
use fetch_url::utils::logging;
use fetch_url::{App, Config};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置，命令行参数优先
    let mut config = Config::from_env();
    args.apply_to(&mut config)?;
    config.validate()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // Ctrl-C 取消正在进行的抓取：顺序模式立即终止，并发模式未完成的任务报告为已取消
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到 Ctrl-C，正在取消未完成的任务...");
            on_signal.cancel();
        }
    });

    let addresses = App::collect_addresses(args.addresses.clone(), args.file.as_deref()).await?;

    let app = App::initialize(config)?;
    app.run(
        &addresses,
        args.mode,
        args.format,
        cancel,
        &mut std::io::stdout().lock(),
    )
    .await?;

    Ok(())
}

//! 通知中心
//!
//! 命令行入口：加载配置、初始化可观测性，然后执行子命令并输出 JSON 结果。

use anyhow::Context;
use clap::Parser;
use notification_center::cli::{Cli, CommandRunner, Commands};
use notify_shared::config::AppConfig;
use notify_shared::observability;
use tracing::info;

const SERVICE_NAME: &str = "notification-center";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;

    // 命令行指定的日志级别优先于配置文件
    let mut obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    if let Some(level) = &cli.log_level {
        obs_config.log_level = level.clone();
    }
    let guard = observability::init(&obs_config)?;

    info!(
        environment = %config.environment,
        codec = %config.codec.algorithm,
        "Starting notification-center..."
    );

    let runner = CommandRunner::new(&config)?;

    let output = match cli.command {
        Commands::NewBlock {
            crypto_code,
            height,
        } => runner.run_new_block(&crypto_code, height).await?,
        Commands::Replay { file } => runner.run_replay(&file).await?,
        Commands::Inspect { file } => runner.run_inspect(&file).await?,
    };
    println!("{output}");

    if cli.print_metrics
        && let Some(metrics) = guard.render_metrics()
    {
        println!("{metrics}");
    }

    Ok(())
}

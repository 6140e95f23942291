//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 通知中心命令行工具
#[derive(Parser, Debug)]
#[command(name = "notification-center")]
#[command(version, about = "领域事件通知的生成与还原工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，未指定时使用配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 结束前输出 Prometheus 指标快照
    #[arg(long)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 发布一个新区块事件并输出生成的通知视图
    NewBlock {
        /// 币种代码
        #[arg(short, long)]
        crypto_code: String,

        /// 区块高度
        #[arg(long)]
        height: u64,
    },

    /// 回放事件文件（每行一个 JSON 领域事件）并输出全部通知视图
    Replay {
        /// 事件文件路径
        #[arg(short, long)]
        file: PathBuf,
    },

    /// 还原导出的通知记录（JSON 数组）并输出视图与失败明细
    Inspect {
        /// 记录文件路径
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_block() {
        let cli = Cli::parse_from([
            "notification-center",
            "new-block",
            "--crypto-code",
            "BTC",
            "--height",
            "700000",
        ]);

        assert!(cli.log_level.is_none());
        match cli.command {
            Commands::NewBlock {
                crypto_code,
                height,
            } => {
                assert_eq!(crypto_code, "BTC");
                assert_eq!(height, 700_000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from([
            "notification-center",
            "--log-level",
            "debug",
            "--print-metrics",
            "replay",
            "--file",
            "events.jsonl",
        ]);

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.print_metrics);
        assert!(matches!(cli.command, Commands::Replay { .. }));
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

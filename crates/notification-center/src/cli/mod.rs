//! CLI 模块
//!
//! 命令行入口：发布事件、回放事件文件、检查导出的通知记录。

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;

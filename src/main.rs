//! # 电商后台管理 — 命令行入口
//!
//! 本文件仅负责日志初始化与运行时启动。
//! 业务逻辑分布在库的各子模块中，详见 `lib.rs` 架构文档。

mod cli;

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::CliArgs::parse();
    cli::run(args).await
}

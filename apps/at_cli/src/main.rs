// apps/at_cli/src/main.rs

//! AtmoTrace 命令行界面
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：读取 `RunConfig`，构建
//! `TrajectoryEngine`，以 JSON 输出内存中的轨迹结果。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// AtmoTrace 气团轨迹计算命令行工具
#[derive(Parser)]
#[command(name = "at_cli")]
#[command(author = "AtmoTrace Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AtmoTrace air parcel trajectory engine", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 在均匀风场中运行轨迹
    Run(commands::run::RunArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
    /// 生成默认配置
    Template(commands::template::TemplateArgs),
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Template(args) => commands::template::execute(args),
    }
}

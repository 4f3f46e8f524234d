// apps/fp_cli/src/main.rs

//! FieldPost 命令行界面
//!
//! 提供字段后处理管线的命令行工具：对字段快照执行声明式管线，
//! 把聚合结果追加到表格文件。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// FieldPost 字段后处理命令行工具
#[derive(Parser)]
#[command(name = "fp_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FieldPost field post-processing pipeline", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行管线
    Run(commands::run::RunArgs),
    /// 校验管线文档
    Validate(commands::validate::ValidateArgs),
    /// 显示已注册节点类型
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 节点变体注册必须先于首次联合构建
    fp_pipeline::registry::init_builtin_nodes();

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}

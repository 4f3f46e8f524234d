// apps/fp_cli/src/commands/info.rs

//! 注册表信息命令

use anyhow::{Context, Result};
use clap::Args;

use fp_pipeline::registry::global_union;

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {}

/// 执行信息命令
pub fn execute(_args: InfoArgs) -> Result<()> {
    let union = global_union().context("节点注册表未初始化")?;

    println!("已注册节点类型 ({}):", union.tags().len());
    for tag in union.tags() {
        println!("  - {}", tag);
    }

    Ok(())
}

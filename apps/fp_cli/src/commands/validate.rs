// apps/fp_cli/src/commands/validate.rs

//! 管线文档校验命令
//!
//! 在不执行任何计算的情况下，对照已注册的节点联合校验管线文档。

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use fp_pipeline::registry::global_union;

use super::PipelineDoc;

/// 校验参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 管线文档文件 (JSON)
    #[arg(short, long)]
    pub pipeline: PathBuf,
}

/// 执行校验命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    println!("检查管线文档: {}", args.pipeline.display());

    let union = global_union().context("节点注册表未初始化")?;
    let doc = PipelineDoc::from_file(&args.pipeline)?;

    let mut errors = Vec::new();
    for (i, step) in doc.steps.iter().enumerate() {
        match union.decode_step(step) {
            Ok(node) => println!("  ✓ 步骤 {}: {}", i, node.kind_name()),
            Err(e) => {
                println!("  ✗ 步骤 {}: {}", i, e);
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        println!("\n✓ 校验通过 ({} 个步骤)", doc.steps.len());
        Ok(())
    } else {
        bail!("校验失败：{} 个步骤无效", errors.len())
    }
}

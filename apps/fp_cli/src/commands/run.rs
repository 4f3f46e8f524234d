// apps/fp_cli/src/commands/run.rs

//! 管线执行命令
//!
//! 加载字段快照和管线文档，执行工作流，把聚合结果追加到表格文件。

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use fp_io::snapshot::FieldSnapshot;
use fp_io::table::TableWriter;
use fp_pipeline::registry::global_union;
use fp_pipeline::workflow::Workflow;
use fp_core::dataset::DataSet;

use super::PipelineDoc;

/// 执行参数
#[derive(Args)]
pub struct RunArgs {
    /// 字段快照文件 (JSON)
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// 管线文档文件 (JSON)
    #[arg(short, long)]
    pub pipeline: PathBuf,

    /// 输出表格文件
    #[arg(short, long)]
    pub output: PathBuf,

    /// 覆盖输出文件（默认续写）
    #[arg(long)]
    pub truncate: bool,
}

/// 执行管线命令
pub fn execute(args: RunArgs) -> Result<()> {
    let union = global_union().context("节点注册表未初始化")?;

    let snapshot = FieldSnapshot::from_file(&args.snapshot)
        .with_context(|| format!("无法加载快照: {}", args.snapshot.display()))?;
    let time = snapshot.time;
    let dataset = snapshot.into_dataset().context("快照转换失败")?;
    info!(
        name = %dataset.name,
        n_samples = dataset.n_samples(),
        "loaded field snapshot"
    );

    let doc = PipelineDoc::from_file(&args.pipeline)
        .with_context(|| format!("无法加载管线文档: {}", args.pipeline.display()))?;

    // 所有步骤在执行前经联合校验
    let workflow = Workflow::from_document(&union, DataSet::Field(dataset), &doc.steps)
        .context("管线文档校验失败")?;
    info!(n_steps = workflow.n_steps(), "pipeline validated");

    let result = workflow.compute().context("管线执行失败")?;

    let aggregated = match result.as_aggregated() {
        Some(agg) => agg,
        None => bail!("管线未以聚合步骤结束，无法写出表格"),
    };

    let mut writer = if args.truncate {
        TableWriter::create(&args.output)?
    } else {
        TableWriter::append_to(&args.output)?
    };
    writer.write(time, aggregated)?;

    println!(
        "✓ t={} 已写出 {} 条聚合结果到 {}",
        time,
        aggregated.values.len(),
        args.output.display()
    );

    Ok(())
}

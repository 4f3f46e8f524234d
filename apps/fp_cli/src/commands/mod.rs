// apps/fp_cli/src/commands/mod.rs

//! 命令实现模块

pub mod info;
pub mod run;
pub mod validate;

use serde::Deserialize;

/// 管线文档：有序步骤列表
#[derive(Debug, Deserialize)]
pub struct PipelineDoc {
    /// 声明式步骤，按 `type` 判别
    pub steps: Vec<serde_json::Value>,
}

impl PipelineDoc {
    /// 从 JSON 文件加载管线文档
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let doc = serde_json::from_str(&content)?;
        Ok(doc)
    }
}

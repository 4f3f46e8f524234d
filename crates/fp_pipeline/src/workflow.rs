// crates/fp_pipeline/src/workflow.rs

//! 工作流引擎
//!
//! 将有序的节点列表从左到右应用到初始数据集，产出最终数据集
//! （标量、过滤后或聚合后）。执行严格顺序、同步、无悬挂点：
//! 每步消费完整数据集并产出完整的新数据集，下一步才开始。
//!
//! 工作流构造一次，通过 [`Workflow::then`] 追加步骤，然后执行
//! [`Workflow::compute`]。重复执行会从同一初始数据集重新开始。

use fp_foundation::error::FpResult;
use fp_core::dataset::DataSet;
use serde_json::Value;
use tracing::debug;

use crate::node::Node;
use crate::registry::{NodeUnion, RegistryError};

/// 工作流：初始数据集 + 有序步骤列表
#[derive(Debug, Clone)]
pub struct Workflow {
    initial: DataSet,
    steps: Vec<Node>,
}

impl Workflow {
    /// 从初始数据集创建空工作流
    pub fn new(initial: DataSet) -> Self {
        Self {
            initial,
            steps: Vec::new(),
        }
    }

    /// 从声明式步骤文档创建工作流
    ///
    /// 所有步骤先经联合校验解码，任何判别不匹配都在执行前报错。
    pub fn from_document(
        union: &NodeUnion,
        initial: DataSet,
        steps: &[Value],
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            initial,
            steps: union.decode_steps(steps)?,
        })
    }

    /// 追加步骤（构造器风格）
    pub fn then(mut self, step: Node) -> Self {
        self.steps.push(step);
        self
    }

    /// 步骤数
    pub fn n_steps(&self) -> usize {
        self.steps.len()
    }

    /// 执行工作流
    ///
    /// 克隆初始数据集并按序折叠所有步骤；任一步骤出错立即中止，
    /// 不产出部分结果。
    pub fn compute(&self) -> FpResult<DataSet> {
        let mut dataset = self.initial.clone();
        for (i, step) in self.steps.iter().enumerate() {
            debug!(step = i, kind = step.kind_name(), "applying pipeline step");
            dataset = step.compute(dataset)?;
        }
        Ok(dataset)
    }
}

impl std::ops::BitOr<Node> for Workflow {
    type Output = Workflow;

    /// 管道风格追加步骤：`workflow | node` 等价于 `workflow.then(node)`
    fn bitor(self, step: Node) -> Workflow {
        self.then(step)
    }
}

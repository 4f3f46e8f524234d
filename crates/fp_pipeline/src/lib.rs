// crates/fp_pipeline/src/lib.rs

//! FieldPost 管线引擎
//!
//! 提供声明式、可序列化的后处理管线：空间选择、方向分箱、统计聚合，
//! 由工作流引擎按序应用到初始数据集。
//!
//! # 模块结构
//!
//! - [`node`]: 节点和类型（显式 sum type，match 分发）
//! - [`registry`]: 进程级节点注册表与判别联合解码器
//! - [`selector`]: 可组合的空间区域谓词代数
//! - [`binning`]: 方向投影分箱
//! - [`aggregate`]: 掩码∩分组分区的逐分量归约
//! - [`workflow`]: 有序步骤列表的顺序执行
//!
//! # 示例
//!
//! ```rust,ignore
//! use fp_pipeline::{
//!     registry::{global_union, init_builtin_nodes},
//!     workflow::Workflow,
//! };
//!
//! init_builtin_nodes();
//! let union = global_union()?;
//! let workflow = Workflow::from_document(&union, initial, &steps)?;
//! let result = workflow.compute()?;
//! ```

#![warn(clippy::all)]

pub mod aggregate;
pub mod binning;
pub mod node;
pub mod registry;
pub mod selector;
pub mod workflow;

pub use aggregate::{AggregateNode, AggregateOp};
pub use binning::DirectionalBin;
pub use node::Node;
pub use registry::{
    global_union, init_builtin_nodes, NodeRegistry, NodeUnion, RegistryError,
};
pub use selector::Selector;
pub use workflow::Workflow;

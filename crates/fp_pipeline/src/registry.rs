// crates/fp_pipeline/src/registry.rs

//! 节点注册表与判别联合
//!
//! 进程级注册表把节点的判别标签映射到解码实现，使得独立定义的步骤实现
//! 无需集中枚举即可参与同一个经校验的联合类型。
//!
//! # 正确性关键的顺序约束
//!
//! 联合必须在所有参与模块注册完毕**之后**构建：过早构建的联合会静默
//! 排除后注册的变体。注册因此通过显式初始化阶段
//! （[`init_builtin_nodes`]）完成，而不是依赖加载顺序。
//!
//! # 示例
//!
//! ```
//! use fp_pipeline::registry::{NodeRegistry, register_builtin_nodes};
//!
//! let mut registry = NodeRegistry::new();
//! register_builtin_nodes(&mut registry);
//! let union = registry.build_union().unwrap();
//! assert!(union.tags().contains(&"box"));
//! ```

use std::collections::HashMap;
use std::sync::Once;

use fp_foundation::error::FpError;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::aggregate::{AggregateNode, AggregateOp};
use crate::binning::DirectionalBin;
use crate::node::Node;
use crate::selector::Selector;

/// 注册表错误
#[derive(Debug, Error)]
pub enum RegistryError {
    /// 未注册任何变体就请求构建联合
    #[error("no node variants registered; load variant modules before building the union")]
    Empty,

    /// 两个变体共享同一判别标签
    #[error("duplicate node type tag '{tag}'")]
    DuplicateTag {
        /// 冲突的标签
        tag: &'static str,
    },

    /// 步骤文档缺少 `type` 判别字段
    #[error("step document has no 'type' discriminator")]
    MissingTag,

    /// 声明的 `type` 不匹配任何已注册变体
    #[error("unknown node type '{tag}' (registered: {known:?})")]
    UnknownTag {
        /// 未知标签
        tag: String,
        /// 已注册标签列表
        known: Vec<&'static str>,
    },

    /// 标签匹配但文档内容解码失败
    #[error("failed to decode '{tag}' step: {message}")]
    Decode {
        /// 标签
        tag: &'static str,
        /// 失败原因
        message: String,
    },
}

impl From<RegistryError> for FpError {
    fn from(err: RegistryError) -> Self {
        FpError::validation(err.to_string())
    }
}

/// 解码函数：从声明式文档构造节点
pub type DecodeFn = fn(&Value) -> Result<Node, RegistryError>;

/// 一个已注册的节点变体
#[derive(Clone, Copy)]
pub struct NodeVariant {
    /// 判别标签，序列化稳定
    pub tag: &'static str,
    /// 文档解码函数
    pub decode: DecodeFn,
}

/// 节点注册表
///
/// 按声明顺序追加变体；不去重、不注销。重复标签在联合构建时报错。
pub struct NodeRegistry {
    variants: Vec<NodeVariant>,
}

impl NodeRegistry {
    /// 创建空注册表
    pub const fn new() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    /// 注册变体（追加，不去重）
    pub fn register(&mut self, variant: NodeVariant) {
        self.variants.push(variant);
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// 已注册变体数
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// 从当前已注册的变体构建判别联合
    ///
    /// 每次调用都重新构建；无新注册时两次构建的联合结构等价。
    pub fn build_union(&self) -> Result<NodeUnion, RegistryError> {
        if self.variants.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut decoders: HashMap<&'static str, DecodeFn> = HashMap::new();
        let mut tags = Vec::with_capacity(self.variants.len());
        for variant in &self.variants {
            if decoders.insert(variant.tag, variant.decode).is_some() {
                return Err(RegistryError::DuplicateTag { tag: variant.tag });
            }
            tags.push(variant.tag);
        }
        Ok(NodeUnion { tags, decoders })
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// 判别联合
///
/// 标签到解码器的只读映射，用于在执行前声明、校验和反序列化任意步骤序列。
pub struct NodeUnion {
    tags: Vec<&'static str>,
    decoders: HashMap<&'static str, DecodeFn>,
}

impl NodeUnion {
    /// 按注册顺序的标签列表
    pub fn tags(&self) -> &[&'static str] {
        &self.tags
    }

    /// 解码单个步骤文档
    ///
    /// 在任何 `compute` 之前的模式校验期调用；未知标签返回
    /// [`RegistryError::UnknownTag`]。
    pub fn decode_step(&self, doc: &Value) -> Result<Node, RegistryError> {
        let tag = doc
            .get("type")
            .and_then(Value::as_str)
            .ok_or(RegistryError::MissingTag)?;
        let decode = self
            .decoders
            .get(tag)
            .ok_or_else(|| RegistryError::UnknownTag {
                tag: tag.to_string(),
                known: self.tags.clone(),
            })?;
        decode(doc)
    }

    /// 校验并解码整个步骤列表
    pub fn decode_steps(&self, docs: &[Value]) -> Result<Vec<Node>, RegistryError> {
        docs.iter().map(|doc| self.decode_step(doc)).collect()
    }
}

// ========================================================================
// 内置变体解码器
// ========================================================================

fn decode_selector(doc: &Value) -> Result<Node, RegistryError> {
    serde_json::from_value::<Selector>(doc.clone())
        .map(Node::Select)
        .map_err(|e| RegistryError::Decode {
            tag: "selector",
            message: e.to_string(),
        })
}

fn decode_directional(doc: &Value) -> Result<Node, RegistryError> {
    let bin: DirectionalBin =
        serde_json::from_value(doc.clone()).map_err(|e| RegistryError::Decode {
            tag: "directional",
            message: e.to_string(),
        })?;
    bin.validate().map_err(|e| RegistryError::Decode {
        tag: "directional",
        message: e.to_string(),
    })?;
    Ok(Node::Bin(bin))
}

#[derive(Deserialize)]
struct AggregateDoc {
    #[serde(default)]
    name: Option<String>,
}

fn decode_aggregate(op: AggregateOp, doc: &Value) -> Result<Node, RegistryError> {
    let params: AggregateDoc =
        serde_json::from_value(doc.clone()).map_err(|e| RegistryError::Decode {
            tag: op.tag(),
            message: e.to_string(),
        })?;
    Ok(Node::Aggregate(AggregateNode {
        op,
        name: params.name,
    }))
}

fn decode_sum(doc: &Value) -> Result<Node, RegistryError> {
    decode_aggregate(AggregateOp::Sum, doc)
}

fn decode_mean(doc: &Value) -> Result<Node, RegistryError> {
    decode_aggregate(AggregateOp::Mean, doc)
}

fn decode_min(doc: &Value) -> Result<Node, RegistryError> {
    decode_aggregate(AggregateOp::Min, doc)
}

fn decode_max(doc: &Value) -> Result<Node, RegistryError> {
    decode_aggregate(AggregateOp::Max, doc)
}

fn decode_volume_integral(doc: &Value) -> Result<Node, RegistryError> {
    decode_aggregate(AggregateOp::VolumeIntegral, doc)
}

/// 将全部内置变体注册到给定注册表
pub fn register_builtin_nodes(registry: &mut NodeRegistry) {
    for tag in ["box", "sphere", "not", "and", "or"] {
        registry.register(NodeVariant {
            tag,
            decode: decode_selector,
        });
    }
    registry.register(NodeVariant {
        tag: "directional",
        decode: decode_directional,
    });
    registry.register(NodeVariant {
        tag: "sum",
        decode: decode_sum,
    });
    registry.register(NodeVariant {
        tag: "mean",
        decode: decode_mean,
    });
    registry.register(NodeVariant {
        tag: "min",
        decode: decode_min,
    });
    registry.register(NodeVariant {
        tag: "max",
        decode: decode_max,
    });
    registry.register(NodeVariant {
        tag: "volume_integral",
        decode: decode_volume_integral,
    });
}

// ========================================================================
// 进程级注册表
// ========================================================================

static GLOBAL_REGISTRY: RwLock<NodeRegistry> = RwLock::new(NodeRegistry::new());
static BUILTIN_INIT: Once = Once::new();

/// 进程级注册表
///
/// 仅在初始化阶段写入，之后只读；不支持多线程并发注册。
pub fn global_registry() -> &'static RwLock<NodeRegistry> {
    &GLOBAL_REGISTRY
}

/// 显式初始化阶段：注册全部内置变体（幂等）
pub fn init_builtin_nodes() {
    BUILTIN_INIT.call_once(|| {
        register_builtin_nodes(&mut GLOBAL_REGISTRY.write());
    });
}

/// 从进程级注册表的当前状态构建联合
pub fn global_union() -> Result<NodeUnion, RegistryError> {
    GLOBAL_REGISTRY.read().build_union()
}

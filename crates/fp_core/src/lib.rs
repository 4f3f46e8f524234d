// crates/fp_core/src/lib.rs

//! FieldPost 数据模型层
//!
//! 提供后处理管线的数据模型：字段数组、几何能力契约和数据集。
//!
//! # 模块概览
//!
//! - [`field`]: 标量/向量/张量字段的扁平存储与聚合值类型
//! - [`geometry`]: 几何能力契约（位置、体积、面积）及具体适配器
//! - [`dataset`]: 数据集变体（internal/patch/surface）与聚合结果
//!
//! # 设计原则
//!
//! 1. **形状不变量**: `len(field) == len(mask) == len(groups) == len(positions)`，
//!    在构造点急切校验
//! 2. **函数式流动**: 每个管线步骤返回新数据集，几何通过 `Arc` 共享
//! 3. **显式变体**: 不依赖结构化鸭子类型，几何契约用 trait 表达

#![warn(clippy::all)]

pub mod dataset;
pub mod field;
pub mod geometry;

pub use dataset::{
    AggregatedData, AggregatedDataSet, DataSet, DataSetKind, FieldDataSet,
};
pub use field::{AggregatedValue, FieldArity, FieldArray};
pub use geometry::{
    BoundaryMeshAdapter, InternalMeshAdapter, SampleGeometry, SampledSurfaceAdapter,
};

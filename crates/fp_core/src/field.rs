// crates/fp_core/src/field.rs

//! 字段数组与聚合值类型
//!
//! 字段是扁平的 `f64` 数组，每个逻辑样本占用 `k` 个连续分量
//! （标量 k=1，向量 k=3，对称张量 k=6，全张量 k=9）。
//! 所有位置数组（mask、groups、positions）与字段共享同一样本数 `N`。
//!
//! # 示例
//!
//! ```
//! use fp_core::field::{FieldArity, FieldArray};
//!
//! let field = FieldArray::new(FieldArity::Vector, vec![1.0, 0.0, 0.0, 2.0, 0.0, 0.0]).unwrap();
//! assert_eq!(field.len(), 2);
//! assert_eq!(field.sample(1), &[2.0, 0.0, 0.0]);
//! ```

use fp_foundation::error::{FpError, FpResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 字段元数（每样本分量数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldArity {
    /// 标量场（如：密度、相分数）
    Scalar,
    /// 三维向量场（如：速度）
    Vector,
    /// 对称张量场（如：应力）
    SymmTensor,
    /// 全张量场（如：速度梯度）
    Tensor,
}

impl FieldArity {
    /// 每样本分量数
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            FieldArity::Scalar => 1,
            FieldArity::Vector => 3,
            FieldArity::SymmTensor => 6,
            FieldArity::Tensor => 9,
        }
    }
}

/// 字段数组
///
/// 扁平存储的数值场，样本视图通过 [`FieldArray::sample`] 访问。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldArray {
    arity: FieldArity,
    data: Vec<f64>,
}

impl FieldArray {
    /// 从扁平数据创建字段
    ///
    /// 数据长度必须是分量数的整数倍，否则返回 [`FpError::ShapeMismatch`]。
    pub fn new(arity: FieldArity, data: Vec<f64>) -> FpResult<Self> {
        let k = arity.components();
        if data.len() % k != 0 {
            return Err(FpError::shape_mismatch(
                "field",
                (data.len() / k + 1) * k,
                data.len(),
            ));
        }
        Ok(Self { arity, data })
    }

    /// 从标量列表创建
    pub fn scalars(values: Vec<f64>) -> Self {
        Self {
            arity: FieldArity::Scalar,
            data: values,
        }
    }

    /// 从向量列表创建
    pub fn vectors(values: &[DVec3]) -> Self {
        let mut data = Vec::with_capacity(values.len() * 3);
        for v in values {
            data.extend_from_slice(&v.to_array());
        }
        Self {
            arity: FieldArity::Vector,
            data,
        }
    }

    /// 字段元数
    #[inline]
    pub fn arity(&self) -> FieldArity {
        self.arity
    }

    /// 逻辑样本数 N
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.arity.components()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 第 i 个样本的分量切片
    #[inline]
    pub fn sample(&self, i: usize) -> &[f64] {
        let k = self.arity.components();
        &self.data[i * k..(i + 1) * k]
    }

    /// 按样本迭代
    pub fn iter_samples(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.arity.components())
    }

    /// 底层扁平数据
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// 聚合值
///
/// 一次归约的结果：按字段元数逐分量计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatedValue {
    /// 标量结果
    Scalar(f64),
    /// 向量结果
    Vector(DVec3),
    /// 对称张量结果
    SymmTensor([f64; 6]),
    /// 全张量结果
    Tensor([f64; 9]),
}

impl AggregatedValue {
    /// 从分量切片构造
    ///
    /// 切片长度必须等于元数的分量数。
    pub fn from_components(arity: FieldArity, comps: &[f64]) -> FpResult<Self> {
        FpError::check_size("aggregated value", arity.components(), comps.len())?;
        Ok(match arity {
            FieldArity::Scalar => AggregatedValue::Scalar(comps[0]),
            FieldArity::Vector => AggregatedValue::Vector(DVec3::from_slice(comps)),
            FieldArity::SymmTensor => {
                let mut t = [0.0; 6];
                t.copy_from_slice(comps);
                AggregatedValue::SymmTensor(t)
            }
            FieldArity::Tensor => {
                let mut t = [0.0; 9];
                t.copy_from_slice(comps);
                AggregatedValue::Tensor(t)
            }
        })
    }

    /// 元数
    pub fn arity(&self) -> FieldArity {
        match self {
            AggregatedValue::Scalar(_) => FieldArity::Scalar,
            AggregatedValue::Vector(_) => FieldArity::Vector,
            AggregatedValue::SymmTensor(_) => FieldArity::SymmTensor,
            AggregatedValue::Tensor(_) => FieldArity::Tensor,
        }
    }

    /// 展平为分量列表
    pub fn components(&self) -> Vec<f64> {
        match self {
            AggregatedValue::Scalar(s) => vec![*s],
            AggregatedValue::Vector(v) => v.to_array().to_vec(),
            AggregatedValue::SymmTensor(t) => t.to_vec(),
            AggregatedValue::Tensor(t) => t.to_vec(),
        }
    }
}

// crates/fp_core/src/dataset.rs

//! 数据集模型
//!
//! 数据集是每步不可变的值对象：命名字段数组 + 几何适配器 + 可选布尔掩码 +
//! 可选整数分组标签。三种结构变体共享同一契约：
//!
//! - `internal`: 体网格内部样本（有单元体积）
//! - `patch`: 边界面样本
//! - `surface`: 派生采样面样本
//!
//! 下游步骤以函数式方式变换数据集（返回新值），掩码/分组的长度不变量在
//! 赋值点急切校验，不推迟到聚合阶段。

use std::sync::Arc;

use fp_foundation::error::{FpError, FpResult};
use serde::{Deserialize, Serialize};

use crate::field::{AggregatedValue, FieldArray};
use crate::geometry::SampleGeometry;

/// 数据集结构变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSetKind {
    /// 体网格内部样本
    Internal,
    /// 边界面样本
    Patch,
    /// 派生采样面样本
    Surface,
}

/// 字段数据集
///
/// 一次管线调用从字段快照和几何适配器创建，随后在管线中函数式流动。
#[derive(Clone)]
pub struct FieldDataSet {
    /// 来源标签，会传播到输出列名
    pub name: String,
    /// 被分析的量
    pub field: FieldArray,
    /// 空间与加权上下文
    pub geometry: Arc<dyn SampleGeometry>,
    /// 布尔包含掩码，缺省表示全部包含
    pub mask: Option<Vec<bool>>,
    /// 整数分组标签；0 表示"未分组"，正整数索引分箱
    pub groups: Option<Vec<i64>>,
    kind: DataSetKind,
}

impl std::fmt::Debug for FieldDataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDataSet")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("n_samples", &self.field.len())
            .field("has_mask", &self.mask.is_some())
            .field("has_groups", &self.groups.is_some())
            .finish()
    }
}

impl FieldDataSet {
    fn with_kind(
        kind: DataSetKind,
        name: impl Into<String>,
        field: FieldArray,
        geometry: Arc<dyn SampleGeometry>,
    ) -> FpResult<Self> {
        FpError::check_size("positions", field.len(), geometry.positions().len())?;
        Ok(Self {
            name: name.into(),
            field,
            geometry,
            mask: None,
            groups: None,
            kind,
        })
    }

    /// 创建内部体数据集
    ///
    /// 几何必须提供单元体积（体积加权聚合的前提）。
    pub fn internal(
        name: impl Into<String>,
        field: FieldArray,
        geometry: Arc<dyn SampleGeometry>,
    ) -> FpResult<Self> {
        if geometry.volumes().is_none() {
            return Err(FpError::invalid_input(
                "internal 数据集的几何必须提供单元体积",
            ));
        }
        Self::with_kind(DataSetKind::Internal, name, field, geometry)
    }

    /// 创建边界面数据集
    pub fn patch(
        name: impl Into<String>,
        field: FieldArray,
        geometry: Arc<dyn SampleGeometry>,
    ) -> FpResult<Self> {
        Self::with_kind(DataSetKind::Patch, name, field, geometry)
    }

    /// 创建采样面数据集
    pub fn surface(
        name: impl Into<String>,
        field: FieldArray,
        geometry: Arc<dyn SampleGeometry>,
    ) -> FpResult<Self> {
        Self::with_kind(DataSetKind::Surface, name, field, geometry)
    }

    /// 结构变体
    pub fn kind(&self) -> DataSetKind {
        self.kind
    }

    /// 逻辑样本数 N
    pub fn n_samples(&self) -> usize {
        self.field.len()
    }

    /// 替换掩码，返回新数据集
    ///
    /// 长度不匹配立即返回 [`FpError::ShapeMismatch`]。
    pub fn with_mask(mut self, mask: Vec<bool>) -> FpResult<Self> {
        FpError::check_size("mask", self.n_samples(), mask.len())?;
        self.mask = Some(mask);
        Ok(self)
    }

    /// 替换分组标签，返回新数据集
    pub fn with_groups(mut self, groups: Vec<i64>) -> FpResult<Self> {
        FpError::check_size("groups", self.n_samples(), groups.len())?;
        self.groups = Some(groups);
        Ok(self)
    }
}

/// 单条聚合结果
///
/// `group` 为产生该结果的分组键（可多维）；无分组时为 `None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedData {
    /// 归约值
    pub value: AggregatedValue,
    /// 分组键
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<i64>>,
}

/// 聚合结果集
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDataSet {
    /// 结果集名称，默认 `"{dataset.name}_{op}"`
    pub name: String,
    /// 按分区迭代顺序排列的聚合结果
    pub values: Vec<AggregatedData>,
}

impl AggregatedDataSet {
    /// 推导列名
    ///
    /// 每条结果展开为逐分量列（标量一列，向量/张量每分量一列），
    /// 分组结果末尾附加分组键列。多条结果时以下标区分前缀。
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::new();
        for (i, entry) in self.values.iter().enumerate() {
            let prefix = if self.values.len() == 1 {
                self.name.clone()
            } else {
                format!("{}_{}", self.name, i)
            };
            let k = entry.value.arity().components();
            if k == 1 {
                headers.push(prefix.clone());
            } else {
                for c in 0..k {
                    headers.push(format!("{}_{}", prefix, c));
                }
            }
            if let Some(group) = &entry.group {
                if group.len() == 1 {
                    headers.push(format!("{}_group", prefix));
                } else {
                    for d in 0..group.len() {
                        headers.push(format!("{}_group_{}", prefix, d));
                    }
                }
            }
        }
        headers
    }

    /// 展平为一行数值
    ///
    /// 每条结果先是值分量，后跟分组键（转为 f64），顺序与 `values` 一致。
    pub fn grouped_values(&self) -> Vec<f64> {
        let mut row = Vec::new();
        for entry in &self.values {
            row.extend(entry.value.components());
            if let Some(group) = &entry.group {
                row.extend(group.iter().map(|&g| g as f64));
            }
        }
        row
    }
}

/// 管线中流动的数据集
///
/// 选择器和分箱步骤消费并产出 `Field`，聚合步骤产出 `Aggregated`。
#[derive(Debug, Clone)]
pub enum DataSet {
    /// 字段数据集（internal/patch/surface 变体之一）
    Field(FieldDataSet),
    /// 聚合结果集
    Aggregated(AggregatedDataSet),
}

impl DataSet {
    /// 数据集名称
    pub fn name(&self) -> &str {
        match self {
            DataSet::Field(ds) => &ds.name,
            DataSet::Aggregated(ds) => &ds.name,
        }
    }

    /// 作为聚合结果集访问
    pub fn as_aggregated(&self) -> Option<&AggregatedDataSet> {
        match self {
            DataSet::Aggregated(ds) => Some(ds),
            DataSet::Field(_) => None,
        }
    }
}

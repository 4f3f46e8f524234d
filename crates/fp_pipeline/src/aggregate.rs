// crates/fp_pipeline/src/aggregate.rs

//! 聚合引擎
//!
//! 将数据集字段归约为每分区一个值。分区规则：仅 `mask[i]` 为真的样本参与
//! （掩码缺省视为全部参与）；在此之上若存在分组标签，再按标签划分。
//! 标签 0 是"未分组"哨兵（分箱的下越界收集桶），不进入任何分组键输出；
//! 其余标签按升序产出。
//!
//! 归约对向量/张量字段逐分量进行（向量求和即三个分量各自求和，
//! min/max 同样逐分量，不按模比较）。
//!
//! 零合格样本的聚合立即报 [`FpError::EmptyPartition`]，
//! 不产出 0/NaN 哨兵值。

use std::collections::BTreeMap;

use fp_foundation::error::{FpError, FpResult};
use fp_core::dataset::{AggregatedData, AggregatedDataSet, FieldDataSet};
use fp_core::field::AggregatedValue;
use serde::{Deserialize, Serialize};

/// 归约操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOp {
    /// 逐分量求和
    Sum,
    /// 逐分量算术平均
    Mean,
    /// 逐分量最小值
    Min,
    /// 逐分量最大值
    Max,
    /// 体积加权求和 Σ vᵢ·fᵢ（需要几何提供单元体积）
    VolumeIntegral,
}

impl AggregateOp {
    /// 判别标签，同时用作默认输出名后缀
    pub const fn tag(self) -> &'static str {
        match self {
            AggregateOp::Sum => "sum",
            AggregateOp::Mean => "mean",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::VolumeIntegral => "volume_integral",
        }
    }
}

/// 聚合步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateNode {
    /// 归约操作
    pub op: AggregateOp,
    /// 显式输出名，缺省为 `"{dataset.name}_{op}"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AggregateNode {
    /// 创建聚合步骤
    pub fn new(op: AggregateOp) -> Self {
        Self { op, name: None }
    }

    /// 指定输出名
    pub fn named(op: AggregateOp, name: impl Into<String>) -> Self {
        Self {
            op,
            name: Some(name.into()),
        }
    }

    /// 对数据集执行归约
    pub fn apply(&self, dataset: &FieldDataSet) -> FpResult<AggregatedDataSet> {
        let arity = dataset.field.arity();
        let k = arity.components();
        let n = dataset.n_samples();

        let weights: Option<&[f64]> = match self.op {
            AggregateOp::VolumeIntegral => Some(dataset.geometry.volumes().ok_or_else(|| {
                FpError::invalid_input("volume_integral 需要几何提供单元体积")
            })?),
            _ => None,
        };

        // 标签 None 表示无分组（单一分区）
        let mut partitions: BTreeMap<Option<i64>, Accumulator> = BTreeMap::new();

        for i in 0..n {
            if let Some(mask) = &dataset.mask {
                if !mask[i] {
                    continue;
                }
            }
            let key = match &dataset.groups {
                Some(groups) => {
                    // 标签 0 不进入任何分组键输出
                    if groups[i] == 0 {
                        continue;
                    }
                    Some(groups[i])
                }
                None => None,
            };
            let sample = dataset.field.sample(i);
            let weight = weights.map(|w| w[i]);
            partitions
                .entry(key)
                .or_insert_with(|| Accumulator::new(k))
                .push(self.op, sample, weight);
        }

        if partitions.is_empty() {
            return Err(FpError::empty_partition(dataset.name.clone()));
        }

        let values = partitions
            .into_iter()
            .map(|(key, acc)| {
                let value = AggregatedValue::from_components(arity, &acc.finish(self.op))?;
                Ok(AggregatedData {
                    value,
                    group: key.map(|g| vec![g]),
                })
            })
            .collect::<FpResult<Vec<_>>>()?;

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", dataset.name, self.op.tag()));

        Ok(AggregatedDataSet { name, values })
    }
}

/// 单分区累加器，逐分量工作
struct Accumulator {
    comps: Vec<f64>,
    count: usize,
}

impl Accumulator {
    fn new(k: usize) -> Self {
        Self {
            comps: vec![0.0; k],
            count: 0,
        }
    }

    fn push(&mut self, op: AggregateOp, sample: &[f64], weight: Option<f64>) {
        if self.count == 0 {
            match op {
                AggregateOp::Min | AggregateOp::Max => self.comps.copy_from_slice(sample),
                AggregateOp::VolumeIntegral => {
                    let w = weight.unwrap_or(1.0);
                    for (c, s) in self.comps.iter_mut().zip(sample) {
                        *c = w * s;
                    }
                }
                _ => self.comps.copy_from_slice(sample),
            }
            self.count = 1;
            return;
        }
        match op {
            AggregateOp::Sum | AggregateOp::Mean => {
                for (c, s) in self.comps.iter_mut().zip(sample) {
                    *c += s;
                }
            }
            AggregateOp::Min => {
                for (c, s) in self.comps.iter_mut().zip(sample) {
                    *c = c.min(*s);
                }
            }
            AggregateOp::Max => {
                for (c, s) in self.comps.iter_mut().zip(sample) {
                    *c = c.max(*s);
                }
            }
            AggregateOp::VolumeIntegral => {
                let w = weight.unwrap_or(1.0);
                for (c, s) in self.comps.iter_mut().zip(sample) {
                    *c += w * s;
                }
            }
        }
        self.count += 1;
    }

    fn finish(mut self, op: AggregateOp) -> Vec<f64> {
        if op == AggregateOp::Mean && self.count > 0 {
            let inv = 1.0 / self.count as f64;
            for c in &mut self.comps {
                *c *= inv;
            }
        }
        self.comps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::dataset::FieldDataSet;
    use fp_core::field::{AggregatedValue, FieldArray};
    use fp_core::geometry::{InternalMeshAdapter, SampledSurfaceAdapter};
    use glam::DVec3;
    use std::sync::Arc;

    fn surface_dataset(field: FieldArray) -> FieldDataSet {
        let n = field.len();
        let positions = (0..n).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
        let geo = Arc::new(SampledSurfaceAdapter::new(positions, None).unwrap());
        FieldDataSet::surface("internal", field, geo).unwrap()
    }

    fn vector_field() -> FieldArray {
        FieldArray::vectors(&[
            DVec3::splat(1.0),
            DVec3::splat(2.0),
            DVec3::splat(3.0),
        ])
    }

    #[test]
    fn test_sum_vector_componentwise() {
        let ds = surface_dataset(vector_field());
        let res = AggregateNode::new(AggregateOp::Sum).apply(&ds).unwrap();
        assert_eq!(res.name, "internal_sum");
        assert_eq!(res.values.len(), 1);
        assert_eq!(res.values[0].value, AggregatedValue::Vector(DVec3::splat(6.0)));
        assert!(res.values[0].group.is_none());
    }

    #[test]
    fn test_sum_respects_mask() {
        let ds = surface_dataset(vector_field())
            .with_mask(vec![true, false, true])
            .unwrap();
        let res = AggregateNode::new(AggregateOp::Sum).apply(&ds).unwrap();
        assert_eq!(res.values[0].value, AggregatedValue::Vector(DVec3::splat(4.0)));
    }

    #[test]
    fn test_grouped_sum_ascending_order() {
        let ds = surface_dataset(FieldArray::scalars(vec![1.0, 2.0, 3.0]))
            .with_groups(vec![1, 2, 2])
            .unwrap();
        let res = AggregateNode::new(AggregateOp::Sum).apply(&ds).unwrap();
        assert_eq!(res.values.len(), 2);
        assert_eq!(res.values[0].value, AggregatedValue::Scalar(1.0));
        assert_eq!(res.values[0].group.as_deref(), Some(&[1][..]));
        assert_eq!(res.values[1].value, AggregatedValue::Scalar(5.0));
        assert_eq!(res.values[1].group.as_deref(), Some(&[2][..]));
    }

    #[test]
    fn test_group_zero_excluded() {
        let ds = surface_dataset(FieldArray::scalars(vec![10.0, 2.0, 3.0]))
            .with_groups(vec![0, 1, 1])
            .unwrap();
        let res = AggregateNode::new(AggregateOp::Sum).apply(&ds).unwrap();
        assert_eq!(res.values.len(), 1);
        assert_eq!(res.values[0].value, AggregatedValue::Scalar(5.0));
    }

    #[test]
    fn test_mask_and_groups_combined() {
        let ds = surface_dataset(FieldArray::scalars(vec![1.0, 2.0, 3.0]))
            .with_mask(vec![false, true, true])
            .unwrap()
            .with_groups(vec![1, 1, 2])
            .unwrap();
        let res = AggregateNode::new(AggregateOp::Sum).apply(&ds).unwrap();
        assert_eq!(res.values.len(), 2);
        assert_eq!(res.values[0].value, AggregatedValue::Scalar(2.0));
        assert_eq!(res.values[1].value, AggregatedValue::Scalar(3.0));
    }

    #[test]
    fn test_mean_scalar() {
        let ds = surface_dataset(FieldArray::scalars(vec![1.0, 2.0, 3.0]));
        let res = AggregateNode::new(AggregateOp::Mean).apply(&ds).unwrap();
        assert_eq!(res.name, "internal_mean");
        assert_eq!(res.values[0].value, AggregatedValue::Scalar(2.0));
    }

    #[test]
    fn test_min_max_componentwise_not_by_magnitude() {
        let field = FieldArray::vectors(&[
            DVec3::new(1.0, 5.0, 0.0),
            DVec3::new(3.0, 2.0, -1.0),
        ]);
        let ds = surface_dataset(field);
        let min = AggregateNode::new(AggregateOp::Min).apply(&ds).unwrap();
        assert_eq!(
            min.values[0].value,
            AggregatedValue::Vector(DVec3::new(1.0, 2.0, -1.0))
        );
        let max = AggregateNode::new(AggregateOp::Max).apply(&ds).unwrap();
        assert_eq!(
            max.values[0].value,
            AggregatedValue::Vector(DVec3::new(3.0, 5.0, 0.0))
        );
    }

    #[test]
    fn test_empty_partition_errors() {
        let ds = surface_dataset(FieldArray::scalars(vec![1.0, 2.0]))
            .with_mask(vec![false, false])
            .unwrap();
        let err = AggregateNode::new(AggregateOp::Sum).apply(&ds).unwrap_err();
        assert!(matches!(err, FpError::EmptyPartition { .. }));
    }

    #[test]
    fn test_all_samples_in_group_zero_errors() {
        let ds = surface_dataset(FieldArray::scalars(vec![1.0, 2.0]))
            .with_groups(vec![0, 0])
            .unwrap();
        let err = AggregateNode::new(AggregateOp::Sum).apply(&ds).unwrap_err();
        assert!(matches!(err, FpError::EmptyPartition { .. }));
    }

    #[test]
    fn test_explicit_name_overrides_default() {
        let ds = surface_dataset(FieldArray::scalars(vec![1.0]));
        let res = AggregateNode::named(AggregateOp::Sum, "total")
            .apply(&ds)
            .unwrap();
        assert_eq!(res.name, "total");
    }

    #[test]
    fn test_volume_integral_weights_by_cell_volume() {
        let geo = Arc::new(
            InternalMeshAdapter::new(
                vec![DVec3::ZERO, DVec3::X],
                vec![0.5, 2.0],
            )
            .unwrap(),
        );
        let ds =
            FieldDataSet::internal("rho", FieldArray::scalars(vec![2.0, 3.0]), geo).unwrap();
        let res = AggregateNode::new(AggregateOp::VolumeIntegral)
            .apply(&ds)
            .unwrap();
        assert_eq!(res.values[0].value, AggregatedValue::Scalar(7.0));
    }

    #[test]
    fn test_volume_integral_requires_volumes() {
        let ds = surface_dataset(FieldArray::scalars(vec![1.0]));
        assert!(AggregateNode::new(AggregateOp::VolumeIntegral)
            .apply(&ds)
            .is_err());
    }
}

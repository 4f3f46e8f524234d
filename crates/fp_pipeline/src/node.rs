// crates/fp_pipeline/src/node.rs

//! 管线节点
//!
//! 节点是一个声明式、可序列化的管线步骤。显式 sum type 按变体 match 分发，
//! 不依赖结构化鸭子类型：
//!
//! - 空间选择器（box/sphere/not/and/or）：求值区域表达式并**替换**掩码
//! - 方向分箱（directional）：覆写分组标签
//! - 聚合（sum/mean/min/max/volume_integral）：产出聚合结果集
//!
//! 节点的判别标签经 [`crate::registry`] 注册后参与声明式文档的解码。

use fp_foundation::error::{FpError, FpResult};
use fp_core::dataset::DataSet;
use serde_json::Value;

use crate::aggregate::AggregateNode;
use crate::binning::DirectionalBin;
use crate::selector::Selector;

/// 管线步骤
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// 空间选择器：计算布尔掩码
    Select(Selector),
    /// 方向分箱：计算分组标签
    Bin(DirectionalBin),
    /// 统计聚合：归约为聚合结果集
    Aggregate(AggregateNode),
}

impl Node {
    /// 步骤种类名，用于日志
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Select(sel) => match sel {
                Selector::Box(_) => "box",
                Selector::Sphere(_) => "sphere",
                Selector::Not(_) => "not",
                Selector::And(_) => "and",
                Selector::Or(_) => "or",
            },
            Node::Bin(_) => "directional",
            Node::Aggregate(agg) => agg.op.tag(),
        }
    }

    /// 将步骤应用到数据集，返回新数据集
    ///
    /// 选择器和分箱要求字段数据集；对聚合结果集再应用任何步骤都是错误。
    pub fn compute(&self, dataset: DataSet) -> FpResult<DataSet> {
        let ds = match dataset {
            DataSet::Field(ds) => ds,
            DataSet::Aggregated(agg) => {
                return Err(FpError::invalid_input(format!(
                    "步骤 {} 不能应用于聚合结果集 {}",
                    self.kind_name(),
                    agg.name
                )));
            }
        };
        match self {
            Node::Select(selector) => {
                let mask = selector.evaluate(ds.geometry.positions());
                Ok(DataSet::Field(ds.with_mask(mask)?))
            }
            Node::Bin(bin) => Ok(DataSet::Field(bin.apply(ds)?)),
            Node::Aggregate(agg) => Ok(DataSet::Aggregated(agg.apply(&ds)?)),
        }
    }

    /// 序列化为带 `type` 判别标签的声明式文档
    pub fn to_document(&self) -> FpResult<Value> {
        let doc = match self {
            Node::Select(sel) => serde_json::to_value(sel),
            Node::Bin(bin) => serde_json::to_value(bin).map(|mut v| {
                v["type"] = Value::from("directional");
                v
            }),
            Node::Aggregate(agg) => serde_json::to_value(agg).map(|mut v| {
                if let Some(obj) = v.as_object_mut() {
                    obj.remove("op");
                }
                v["type"] = Value::from(agg.op.tag());
                v
            }),
        };
        doc.map_err(|e| FpError::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateOp;
    use crate::selector::{BoxRegion, SphereRegion};
    use fp_core::dataset::{AggregatedData, AggregatedDataSet, FieldDataSet};
    use fp_core::field::{AggregatedValue, FieldArray};
    use fp_core::geometry::SampledSurfaceAdapter;
    use glam::DVec3;
    use std::sync::Arc;

    fn dataset() -> DataSet {
        let positions = vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)];
        let geo = Arc::new(SampledSurfaceAdapter::new(positions, None).unwrap());
        let field = FieldArray::scalars(vec![1.0, 2.0]);
        DataSet::Field(FieldDataSet::surface("s", field, geo).unwrap())
    }

    #[test]
    fn test_selector_replaces_mask() {
        let node = Node::Select(Selector::Sphere(SphereRegion {
            center: DVec3::ZERO,
            radius: 1.0,
        }));
        let ds = match dataset() {
            DataSet::Field(ds) => ds.with_mask(vec![false, true]).unwrap(),
            _ => unreachable!(),
        };
        let out = node.compute(DataSet::Field(ds)).unwrap();
        match out {
            DataSet::Field(ds) => assert_eq!(ds.mask.as_deref(), Some(&[true, false][..])),
            _ => panic!("expected field dataset"),
        }
    }

    #[test]
    fn test_step_on_aggregated_is_error() {
        let agg = DataSet::Aggregated(AggregatedDataSet {
            name: "done".into(),
            values: vec![AggregatedData {
                value: AggregatedValue::Scalar(1.0),
                group: None,
            }],
        });
        let node = Node::Aggregate(AggregateNode::new(AggregateOp::Sum));
        assert!(node.compute(agg).is_err());
    }

    #[test]
    fn test_to_document_tags() {
        let node = Node::Select(Selector::Box(BoxRegion {
            min: DVec3::ZERO,
            max: DVec3::ONE,
        }));
        assert_eq!(node.to_document().unwrap()["type"], "box");

        let node = Node::Bin(
            DirectionalBin::new(vec![0.0, 1.0], DVec3::X, DVec3::ZERO).unwrap(),
        );
        assert_eq!(node.to_document().unwrap()["type"], "directional");

        let node = Node::Aggregate(AggregateNode::new(AggregateOp::VolumeIntegral));
        let doc = node.to_document().unwrap();
        assert_eq!(doc["type"], "volume_integral");
        assert!(doc.get("op").is_none());
    }
}

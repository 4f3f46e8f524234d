// crates/fp_pipeline/src/binning.rs

//! 方向分箱
//!
//! 将样本位置投影到一维轴上，按有序边界分桶，产出整数分组标签。
//!
//! 分箱语义与 digitize 约定一致：设边界数为 `N_b`，
//! 投影距离 `d < bins[0]` 得索引 0，`bins[i-1] <= d < bins[i]` 得索引 `i`，
//! `d >= bins[N_b-1]` 得索引 `N_b`。索引 0 与 `N_b` 是越界收集桶，
//! 只有 `1..N_b-1` 对应声明的箱区间。恰好落在边界上的样本进入上方箱。

use fp_foundation::error::{FpError, FpResult};
use fp_core::dataset::FieldDataSet;
use glam::DVec3;
use serde::{Deserialize, Serialize};

fn default_origin() -> DVec3 {
    DVec3::ZERO
}

/// 方向分箱步骤
///
/// 参数经 [`DirectionalBin::validate`] 急切校验：边界严格递增、方向非零。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalBin {
    /// 严格递增的箱边界
    pub bins: Vec<f64>,
    /// 投影方向（会被归一化）
    pub direction: DVec3,
    /// 投影原点，默认坐标系原点
    #[serde(default = "default_origin")]
    pub origin: DVec3,
}

impl DirectionalBin {
    /// 创建并校验分箱步骤
    pub fn new(bins: Vec<f64>, direction: DVec3, origin: DVec3) -> FpResult<Self> {
        let bin = Self {
            bins,
            direction,
            origin,
        };
        bin.validate()?;
        Ok(bin)
    }

    /// 校验参数
    pub fn validate(&self) -> FpResult<()> {
        if self.bins.is_empty() {
            return Err(FpError::invalid_input("分箱边界不能为空"));
        }
        if self.bins.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FpError::invalid_input("分箱边界必须严格递增"));
        }
        if self.direction.length_squared() == 0.0 {
            return Err(FpError::invalid_input("分箱方向不能为零向量"));
        }
        Ok(())
    }

    /// 单个投影距离的箱索引
    #[inline]
    fn digitize(&self, distance: f64) -> i64 {
        self.bins.partition_point(|&b| b <= distance) as i64
    }

    /// 覆写数据集的分组标签，丢弃既有分组
    pub fn apply(&self, dataset: FieldDataSet) -> FpResult<FieldDataSet> {
        self.validate()?;
        let normal = self.direction.normalize();
        let groups: Vec<i64> = dataset
            .geometry
            .positions()
            .iter()
            .map(|p| self.digitize((*p - self.origin).dot(normal)))
            .collect();
        dataset.with_groups(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::dataset::FieldDataSet;
    use fp_core::field::FieldArray;
    use fp_core::geometry::SampledSurfaceAdapter;
    use std::sync::Arc;

    fn line_dataset(xs: &[f64]) -> FieldDataSet {
        let positions: Vec<DVec3> = xs.iter().map(|&x| DVec3::new(x, 0.0, 0.0)).collect();
        let geo = Arc::new(SampledSurfaceAdapter::new(positions, None).unwrap());
        let field = FieldArray::scalars(xs.to_vec());
        FieldDataSet::surface("line", field, geo).unwrap()
    }

    #[test]
    fn test_boundary_sample_goes_to_upper_bin() {
        let bin = DirectionalBin::new(vec![0.0, 0.146, 0.292], DVec3::X, DVec3::ZERO).unwrap();
        assert_eq!(bin.digitize(0.146), 2);
        assert_eq!(bin.digitize(0.1), 1);
    }

    #[test]
    fn test_out_of_range_buckets() {
        let bin = DirectionalBin::new(vec![0.0, 1.0], DVec3::X, DVec3::ZERO).unwrap();
        assert_eq!(bin.digitize(-0.5), 0);
        assert_eq!(bin.digitize(1.0), 2);
        assert_eq!(bin.digitize(5.0), 2);
    }

    #[test]
    fn test_apply_overwrites_groups() {
        let ds = line_dataset(&[-0.5, 0.25, 1.5])
            .with_groups(vec![7, 7, 7])
            .unwrap();
        let bin = DirectionalBin::new(vec![0.0, 1.0], DVec3::X, DVec3::ZERO).unwrap();
        let ds = bin.apply(ds).unwrap();
        assert_eq!(ds.groups.as_deref(), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn test_direction_is_normalized() {
        let bin = DirectionalBin::new(vec![0.0, 1.0], DVec3::new(10.0, 0.0, 0.0), DVec3::ZERO)
            .unwrap();
        let ds = bin.apply(line_dataset(&[0.5])).unwrap();
        assert_eq!(ds.groups.as_deref(), Some(&[1][..]));
    }

    #[test]
    fn test_origin_offsets_projection() {
        let bin =
            DirectionalBin::new(vec![0.0, 1.0], DVec3::X, DVec3::new(1.0, 0.0, 0.0)).unwrap();
        let ds = bin.apply(line_dataset(&[1.5])).unwrap();
        assert_eq!(ds.groups.as_deref(), Some(&[1][..]));
    }

    #[test]
    fn test_validation_rejects_bad_parameters() {
        assert!(DirectionalBin::new(vec![], DVec3::X, DVec3::ZERO).is_err());
        assert!(DirectionalBin::new(vec![1.0, 1.0], DVec3::X, DVec3::ZERO).is_err());
        assert!(DirectionalBin::new(vec![2.0, 1.0], DVec3::X, DVec3::ZERO).is_err());
        assert!(DirectionalBin::new(vec![0.0, 1.0], DVec3::ZERO, DVec3::ZERO).is_err());
    }

    #[test]
    fn test_default_origin_from_document() {
        let doc = serde_json::json!({
            "bins": [0.0, 1.0],
            "direction": [0.0, 0.0, 1.0],
        });
        let bin: DirectionalBin = serde_json::from_value(doc).unwrap();
        assert_eq!(bin.origin, DVec3::ZERO);
    }
}

// crates/fp_io/src/snapshot.rs

//! 字段快照导入
//!
//! 字段提供方（求解器、采样子系统）按名称导出字段数组的只读快照；
//! 本模块将 JSON 快照文档转换为可进入管线的字段数据集。
//!
//! # 文档格式
//!
//! ```json
//! {
//!     "time": 0.5,
//!     "name": "alpha.water",
//!     "kind": "internal",
//!     "arity": "scalar",
//!     "field": [0.0, 1.0, 0.5],
//!     "positions": [[0.0, 0.0, 0.0], [0.1, 0.0, 0.0], [0.2, 0.0, 0.0]],
//!     "volumes": [0.001, 0.001, 0.001]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use fp_core::dataset::{DataSetKind, FieldDataSet};
use fp_core::field::{FieldArity, FieldArray};
use fp_core::geometry::{
    BoundaryMeshAdapter, InternalMeshAdapter, SampleGeometry, SampledSurfaceAdapter,
};
use fp_foundation::FpError;
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

/// 字段快照文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// 时间戳（模拟时间）
    pub time: f64,
    /// 字段名
    pub name: String,
    /// 数据集结构变体
    pub kind: DataSetKind,
    /// 字段元数
    pub arity: FieldArity,
    /// 扁平字段数据
    pub field: Vec<f64>,
    /// 样本位置
    pub positions: Vec<DVec3>,
    /// 单元体积（internal 变体必需）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<f64>>,
    /// 面积模（patch/surface 变体可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_area_magnitudes: Option<Vec<f64>>,
}

impl FieldSnapshot {
    /// 从 JSON 文件加载快照
    pub fn from_file(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| IoError::SnapshotParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// 保存快照到 JSON 文件
    pub fn to_file(&self, path: impl AsRef<Path>) -> IoResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| IoError::SnapshotParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 转换为字段数据集
    ///
    /// 形状不变量（字段/位置/体积等长）在此急切校验。
    pub fn into_dataset(self) -> IoResult<FieldDataSet> {
        let field = FieldArray::new(self.arity, self.field)?;
        let geometry: Arc<dyn SampleGeometry> = match self.kind {
            DataSetKind::Internal => {
                let volumes = self.volumes.ok_or_else(|| {
                    IoError::Shape(FpError::invalid_input(
                        "internal 快照缺少单元体积",
                    ))
                })?;
                Arc::new(InternalMeshAdapter::new(self.positions, volumes)?)
            }
            DataSetKind::Patch => {
                let areas = self.face_area_magnitudes.ok_or_else(|| {
                    IoError::Shape(FpError::invalid_input("patch 快照缺少面积模"))
                })?;
                Arc::new(BoundaryMeshAdapter::new(self.positions, areas)?)
            }
            DataSetKind::Surface => Arc::new(SampledSurfaceAdapter::new(
                self.positions,
                self.face_area_magnitudes,
            )?),
        };
        let dataset = match self.kind {
            DataSetKind::Internal => FieldDataSet::internal(self.name, field, geometry)?,
            DataSetKind::Patch => FieldDataSet::patch(self.name, field, geometry)?,
            DataSetKind::Surface => FieldDataSet::surface(self.name, field, geometry)?,
        };
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> FieldSnapshot {
        FieldSnapshot {
            time: 0.5,
            name: "alpha.water".into(),
            kind: DataSetKind::Internal,
            arity: FieldArity::Scalar,
            field: vec![0.0, 1.0, 0.5],
            positions: vec![
                DVec3::ZERO,
                DVec3::new(0.1, 0.0, 0.0),
                DVec3::new(0.2, 0.0, 0.0),
            ],
            volumes: Some(vec![1e-3; 3]),
            face_area_magnitudes: None,
        }
    }

    #[test]
    fn test_into_dataset() {
        let ds = sample_snapshot().into_dataset().unwrap();
        assert_eq!(ds.kind(), DataSetKind::Internal);
        assert_eq!(ds.n_samples(), 3);
        assert!(ds.geometry.volumes().is_some());
    }

    #[test]
    fn test_internal_without_volumes_fails() {
        let mut snap = sample_snapshot();
        snap.volumes = None;
        assert!(snap.into_dataset().is_err());
    }

    #[test]
    fn test_shape_mismatch_fails() {
        let mut snap = sample_snapshot();
        snap.field.push(2.0);
        assert!(snap.into_dataset().is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots/alpha.json");
        let snap = sample_snapshot();
        snap.to_file(&path).unwrap();

        let loaded = FieldSnapshot::from_file(&path).unwrap();
        assert_eq!(loaded.time, 0.5);
        assert_eq!(loaded.name, "alpha.water");
        assert_eq!(loaded.field, snap.field);
    }

    #[test]
    fn test_parse_error_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = FieldSnapshot::from_file(&path).unwrap_err();
        assert!(matches!(err, IoError::SnapshotParse { .. }));
    }
}

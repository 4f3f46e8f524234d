// crates/fp_core/src/geometry.rs

//! 几何能力契约与适配器
//!
//! 数据集不关心几何来自何处，只依赖 [`SampleGeometry`] 契约：
//! 每个样本一个位置，内部体网格另有单元体积，边界/采样面另有面积模。
//! 网格提供方（求解器、采样子系统）通过适配器接入，只读消费。
//!
//! # 示例
//!
//! ```
//! use fp_core::geometry::{InternalMeshAdapter, SampleGeometry};
//! use glam::DVec3;
//!
//! let geo = InternalMeshAdapter::new(
//!     vec![DVec3::ZERO, DVec3::X],
//!     vec![0.5, 0.5],
//! ).unwrap();
//! assert_eq!(geo.positions().len(), 2);
//! assert!(geo.volumes().is_some());
//! ```

use fp_foundation::error::{FpError, FpResult};
use glam::DVec3;

/// 几何能力契约
///
/// 任何暴露样本位置的对象都可作为数据集的几何；体积和面积模是可选能力，
/// 分别服务于体积加权聚合与基于面的面积求和。
pub trait SampleGeometry: Send + Sync {
    /// 样本位置（每样本一个三维向量）
    fn positions(&self) -> &[DVec3];

    /// 单元体积（仅内部体网格提供）
    fn volumes(&self) -> Option<&[f64]> {
        None
    }

    /// 面积模（仅边界面/采样面提供）
    fn face_area_magnitudes(&self) -> Option<&[f64]> {
        None
    }

    /// 样本数
    fn len(&self) -> usize {
        self.positions().len()
    }

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.positions().is_empty()
    }
}

/// 内部体网格适配器
///
/// 包装单元中心位置与单元体积的快照。
#[derive(Debug, Clone)]
pub struct InternalMeshAdapter {
    positions: Vec<DVec3>,
    volumes: Vec<f64>,
}

impl InternalMeshAdapter {
    /// 创建适配器，体积数必须与位置数一致
    pub fn new(positions: Vec<DVec3>, volumes: Vec<f64>) -> FpResult<Self> {
        FpError::check_size("volumes", positions.len(), volumes.len())?;
        Ok(Self { positions, volumes })
    }
}

impl SampleGeometry for InternalMeshAdapter {
    fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    fn volumes(&self) -> Option<&[f64]> {
        Some(&self.volumes)
    }
}

/// 边界面网格适配器
///
/// 包装边界面中心位置与面积模的快照。
#[derive(Debug, Clone)]
pub struct BoundaryMeshAdapter {
    positions: Vec<DVec3>,
    face_area_magnitudes: Vec<f64>,
}

impl BoundaryMeshAdapter {
    /// 创建适配器，面积模数必须与位置数一致
    pub fn new(positions: Vec<DVec3>, face_area_magnitudes: Vec<f64>) -> FpResult<Self> {
        FpError::check_size(
            "face_area_magnitudes",
            positions.len(),
            face_area_magnitudes.len(),
        )?;
        Ok(Self {
            positions,
            face_area_magnitudes,
        })
    }
}

impl SampleGeometry for BoundaryMeshAdapter {
    fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    fn face_area_magnitudes(&self) -> Option<&[f64]> {
        Some(&self.face_area_magnitudes)
    }
}

/// 派生采样面适配器
///
/// 包装采样子系统产出的表面元位置；面积模可选（取决于采样算法）。
#[derive(Debug, Clone)]
pub struct SampledSurfaceAdapter {
    positions: Vec<DVec3>,
    face_area_magnitudes: Option<Vec<f64>>,
}

impl SampledSurfaceAdapter {
    /// 创建适配器
    pub fn new(positions: Vec<DVec3>, face_area_magnitudes: Option<Vec<f64>>) -> FpResult<Self> {
        if let Some(areas) = &face_area_magnitudes {
            FpError::check_size("face_area_magnitudes", positions.len(), areas.len())?;
        }
        Ok(Self {
            positions,
            face_area_magnitudes,
        })
    }
}

impl SampleGeometry for SampledSurfaceAdapter {
    fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    fn face_area_magnitudes(&self) -> Option<&[f64]> {
        self.face_area_magnitudes.as_deref()
    }
}

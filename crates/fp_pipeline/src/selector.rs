// crates/fp_pipeline/src/selector.rs

//! 空间选择器代数
//!
//! 对数据集位置求值的可组合布尔谓词：盒、球、补、交、并。
//! 选择器既是声明式文档（serde 按 `type` 判别），也支持表达式风格组合：
//! `&`、`|`、`!` 分别构造交、并、补。
//!
//! 选择器应用到数据集时**替换**既有掩码；跨多个过滤条件的组合应在
//! 选择器表达式内用 `and` 表达，而不是顺序应用多个选择器步骤。
//!
//! # 示例
//!
//! ```
//! use fp_pipeline::selector::{BoxRegion, Selector, SphereRegion};
//! use glam::DVec3;
//!
//! let near = Selector::Sphere(SphereRegion {
//!     center: DVec3::ZERO,
//!     radius: 1.0,
//! });
//! let lower = Selector::Box(BoxRegion {
//!     min: DVec3::splat(-1.0),
//!     max: DVec3::new(1.0, 1.0, 0.0),
//! });
//! let region = near & !lower;
//! let mask = region.evaluate(&[DVec3::ZERO, DVec3::new(0.0, 0.0, 0.5)]);
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 轴对齐盒区域，边界按分量闭区间包含
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRegion {
    /// 最小角点
    pub min: DVec3,
    /// 最大角点
    pub max: DVec3,
}

/// 球区域，按欧氏距离 ≤ 半径包含
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereRegion {
    /// 球心
    pub center: DVec3,
    /// 半径
    pub radius: f64,
}

/// 补区域
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotRegion {
    /// 被取补的区域
    pub region: Box<Selector>,
}

/// 二元组合区域的左右操作数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryRegion {
    /// 左操作数
    pub left: Box<Selector>,
    /// 右操作数
    pub right: Box<Selector>,
}

/// 空间选择器
///
/// 递归 sum type，serde 按 `type` 字段判别，可作为声明式文档往返。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Selector {
    /// 轴对齐盒
    Box(BoxRegion),
    /// 球
    Sphere(SphereRegion),
    /// 逻辑补
    Not(NotRegion),
    /// 逻辑交
    And(BinaryRegion),
    /// 逻辑并
    Or(BinaryRegion),
}

impl Selector {
    /// 对位置数组求值，产出与其等长的布尔掩码
    pub fn evaluate(&self, positions: &[DVec3]) -> Vec<bool> {
        match self {
            Selector::Box(b) => positions
                .iter()
                .map(|p| {
                    p.x >= b.min.x
                        && p.x <= b.max.x
                        && p.y >= b.min.y
                        && p.y <= b.max.y
                        && p.z >= b.min.z
                        && p.z <= b.max.z
                })
                .collect(),
            Selector::Sphere(s) => positions
                .iter()
                .map(|p| p.distance(s.center) <= s.radius)
                .collect(),
            Selector::Not(n) => n
                .region
                .evaluate(positions)
                .into_iter()
                .map(|v| !v)
                .collect(),
            Selector::And(b) => {
                let l = b.left.evaluate(positions);
                let r = b.right.evaluate(positions);
                l.into_iter().zip(r).map(|(a, b)| a && b).collect()
            }
            Selector::Or(b) => {
                let l = b.left.evaluate(positions);
                let r = b.right.evaluate(positions);
                l.into_iter().zip(r).map(|(a, b)| a || b).collect()
            }
        }
    }
}

// ========================================================================
// 表达式风格组合子
// ========================================================================

impl std::ops::BitAnd for Selector {
    type Output = Selector;

    fn bitand(self, rhs: Selector) -> Selector {
        Selector::And(BinaryRegion {
            left: Box::new(self),
            right: Box::new(rhs),
        })
    }
}

impl std::ops::BitOr for Selector {
    type Output = Selector;

    fn bitor(self, rhs: Selector) -> Selector {
        Selector::Or(BinaryRegion {
            left: Box::new(self),
            right: Box::new(rhs),
        })
    }
}

impl std::ops::Not for Selector {
    type Output = Selector;

    fn not(self) -> Selector {
        Selector::Not(NotRegion {
            region: Box::new(self),
        })
    }
}

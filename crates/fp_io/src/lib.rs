// crates/fp_io/src/lib.rs

//! FieldPost IO 模块
//!
//! 提供后处理结果的表格写出与字段快照导入。
//!
//! # 模块
//!
//! - [`table`]: 表格写出器（分隔文本，列名从首个聚合结果的形状推断）
//! - [`snapshot`]: JSON 字段快照导入
//! - [`error`]: IO 模块错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use fp_io::table::TableWriter;
//!
//! let mut writer = TableWriter::create("postProcessing/volume.csv")?;
//! writer.write(0.1, &aggregated)?;
//! writer.write(0.2, &aggregated_next)?;
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod snapshot;
pub mod table;

pub use error::{IoError, IoResult};
pub use snapshot::FieldSnapshot;
pub use table::TableWriter;

// crates/fp_io/src/error.rs

//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举，支持通过 thiserror 自动转换底层错误。
//! 所有错误最终可转换为 FpError 以实现跨层错误传递。

use std::path::PathBuf;

use fp_foundation::FpError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 底层 IO 错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 表头与行宽不匹配
    #[error("表头与行宽不匹配: 表头 {expected} 列, 本次写出 {actual} 列")]
    HeaderMismatch {
        /// 表头列数
        expected: usize,
        /// 本次行列数
        actual: usize,
    },

    /// 快照解析失败
    #[error("快照解析失败: {path}, 原因: {message}")]
    SnapshotParse {
        /// 快照路径
        path: PathBuf,
        /// 失败原因
        message: String,
    },

    /// 数据形状无效
    #[error("数据形状无效: {0}")]
    Shape(#[from] FpError),
}

impl From<IoError> for FpError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => FpError::from(e),
            IoError::Shape(e) => e,
            other => FpError::io(other.to_string()),
        }
    }
}

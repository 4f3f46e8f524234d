// crates/fp_io/src/table.rs

//! 表格写出器
//!
//! 每次管线调用向持久化分隔表追加一行。表头在首次写出时从聚合结果的
//! 形状惰性推断：`time` 列在前，向量/张量聚合值展开为每分量一列，
//! 分组结果末尾附加分组键列。
//!
//! 表头一旦写出即固定；之后每次写出都重新校验行宽，形状漂移立即报
//! [`IoError::HeaderMismatch`]，不写出错行。
//!
//! 文件创建幂等：父目录不存在时先创建，重复创建会截断既有文件。
//! 同一路径同时至多一个写出器实例由调用方保证，本模块不做锁协调。

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fp_core::dataset::AggregatedDataSet;

use crate::error::{IoError, IoResult};

/// 表格写出器
#[derive(Debug)]
pub struct TableWriter {
    path: PathBuf,
    delimiter: char,
    header: Option<Vec<String>>,
}

impl TableWriter {
    /// 创建（或截断）目标表文件
    ///
    /// 父目录不存在时先创建；表头留待首次写出时推断。
    pub fn create(path: impl Into<PathBuf>) -> IoResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        File::create(&path)?;
        Ok(Self {
            path,
            delimiter: ',',
            header: None,
        })
    }

    /// 打开既有表文件并续写
    ///
    /// 首行非空时解析为已固定的表头；文件为空等价于 [`TableWriter::create`]。
    pub fn append_to(path: impl Into<PathBuf>) -> IoResult<Self> {
        let path = path.into();
        if !path.exists() {
            return Self::create(path);
        }
        let mut first_line = String::new();
        BufReader::new(File::open(&path)?).read_line(&mut first_line)?;
        let delimiter = ',';
        let header = {
            let trimmed = first_line.trim_end();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.split(delimiter).map(str::to_string).collect())
            }
        };
        Ok(Self {
            path,
            delimiter,
            header,
        })
    }

    /// 指定分隔符（默认逗号）
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 目标路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 已固定的表头
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// 追加一行时间戳数据
    ///
    /// 首次写出固定表头；行内容为 `time`、每条聚合结果的展平分量、
    /// 分组键，顺序即聚合引擎的分区迭代顺序。数值按默认字符串转换渲染。
    pub fn write(&mut self, time: f64, result: &AggregatedDataSet) -> IoResult<()> {
        let row = result.grouped_values();

        if self.header.is_none() {
            let mut header = Vec::with_capacity(1 + row.len());
            header.push("time".to_string());
            header.extend(result.headers());
            self.append_line(&header.join(&self.delimiter.to_string()))?;
            self.header = Some(header);
        }

        let header_len = self.header.as_ref().map(Vec::len).unwrap_or(0);
        if header_len != 1 + row.len() {
            return Err(IoError::HeaderMismatch {
                expected: header_len,
                actual: 1 + row.len(),
            });
        }

        let mut fields = Vec::with_capacity(1 + row.len());
        fields.push(time.to_string());
        fields.extend(row.iter().map(f64::to_string));
        self.append_line(&fields.join(&self.delimiter.to_string()))
    }

    fn append_line(&self, line: &str) -> IoResult<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::dataset::AggregatedData;
    use fp_core::field::AggregatedValue;
    use glam::DVec3;

    fn scalar_set(name: &str, value: f64) -> AggregatedDataSet {
        AggregatedDataSet {
            name: name.into(),
            values: vec![AggregatedData {
                value: AggregatedValue::Scalar(value),
                group: None,
            }],
        }
    }

    fn read(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_scalar_header_inference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(0.5, &scalar_set("alpha_water_sum", 2.0)).unwrap();

        let lines = read(&path);
        assert_eq!(lines[0], "time,alpha_water_sum");
        assert_eq!(lines[1], "0.5,2");
    }

    #[test]
    fn test_vector_header_inference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let set = AggregatedDataSet {
            name: "U".into(),
            values: vec![AggregatedData {
                value: AggregatedValue::Vector(DVec3::new(1.0, 2.0, 3.0)),
                group: None,
            }],
        };
        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(0.0, &set).unwrap();

        let lines = read(&path);
        assert_eq!(lines[0], "time,U_0,U_1,U_2");
        assert_eq!(lines[1], "0,1,2,3");
    }

    #[test]
    fn test_grouped_rows_follow_partition_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let set = AggregatedDataSet {
            name: "rho_sum".into(),
            values: vec![
                AggregatedData {
                    value: AggregatedValue::Scalar(1.0),
                    group: Some(vec![1]),
                },
                AggregatedData {
                    value: AggregatedValue::Scalar(5.0),
                    group: Some(vec![2]),
                },
            ],
        };
        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(1.5, &set).unwrap();

        let lines = read(&path);
        assert_eq!(
            lines[0],
            "time,rho_sum_0,rho_sum_0_group,rho_sum_1,rho_sum_1_group"
        );
        assert_eq!(lines[1], "1.5,1,1,5,2");
    }

    #[test]
    fn test_parent_directory_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postProcessing/nested/out.csv");
        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(0.0, &scalar_set("s", 1.0)).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_recreate_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(0.0, &scalar_set("s", 1.0)).unwrap();
        writer.write(1.0, &scalar_set("s", 2.0)).unwrap();
        assert_eq!(read(&path).len(), 3);

        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(2.0, &scalar_set("s", 3.0)).unwrap();
        let lines = read(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2,3");
    }

    #[test]
    fn test_append_to_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(0.0, &scalar_set("s", 1.0)).unwrap();
        drop(writer);

        let mut writer = TableWriter::append_to(&path).unwrap();
        assert_eq!(writer.header().unwrap(), ["time", "s"]);
        writer.write(1.0, &scalar_set("s", 2.0)).unwrap();

        let lines = read(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "1,2");
    }

    #[test]
    fn test_shape_drift_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = TableWriter::create(&path).unwrap();
        writer.write(0.0, &scalar_set("s", 1.0)).unwrap();

        let wider = AggregatedDataSet {
            name: "s".into(),
            values: vec![AggregatedData {
                value: AggregatedValue::Vector(DVec3::ZERO),
                group: None,
            }],
        };
        let err = writer.write(1.0, &wider).unwrap_err();
        assert!(matches!(err, IoError::HeaderMismatch { .. }));
        // 错行未写出
        assert_eq!(read(&path).len(), 2);
    }
}

//! 失败面单记录服务 - 业务能力层
//!
//! 运单生成失败的面单不会自动重试，写入记录文件交给操作员处理

use crate::error::FileError;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 失败面单记录服务
pub struct FailedLabelWriter {
    file_path: String,
}

impl FailedLabelWriter {
    /// 创建新的记录服务
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// 追加一条失败记录
    ///
    /// # 参数
    /// - `batch`: 批次名称
    /// - `label_id`: 面单 ID
    /// - `reason`: 失败原因
    pub fn write(&self, batch: &str, label_id: i64, reason: &str) -> Result<(), FileError> {
        debug!("记录失败面单: 批次 {} | 面单 {} | {}", batch, label_id, reason);

        let write_err = |source| FileError::WriteFailed {
            path: self.file_path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .map_err(write_err)?;

        let line = format!(
            "{} | 批次 {} | 面单 {} | 原因: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            batch,
            label_id,
            reason.replace('\n', " ")
        );

        file.write_all(line.as_bytes()).map_err(write_err)?;

        Ok(())
    }
}

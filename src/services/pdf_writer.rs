//! PDF 写入服务 - 业务能力层
//!
//! 只负责"把下载到的 PDF 落盘"，不关心是哪一步下载的

use crate::error::FileError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// PDF 写入服务
pub struct PdfWriter {
    output_dir: PathBuf,
}

impl PdfWriter {
    /// 创建新的 PDF 写入服务
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 写入单个面单 PDF：`label-{id}.pdf`
    pub async fn write_label(&self, label_id: i64, bytes: Vec<u8>) -> Result<PathBuf, FileError> {
        self.write(&format!("label-{}.pdf", label_id), bytes).await
    }

    /// 写入合并 PDF：`labels-{时间戳}.pdf`
    pub async fn write_combined(&self, bytes: Vec<u8>) -> Result<PathBuf, FileError> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        self.write(&format!("labels-{}.pdf", stamp), bytes).await
    }

    // 写完即释放缓冲区
    async fn write(&self, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf, FileError> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: self.output_dir.display().to_string(),
                source,
            })?;

        let path = self.output_dir.join(file_name);
        debug!("写入 PDF: {} ({} 字节)", path.display(), bytes.len());

        fs::write(&path, bytes)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        Ok(path)
    }
}

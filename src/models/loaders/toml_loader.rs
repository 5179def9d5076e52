use crate::error::FileError;
use crate::models::batch::BatchRequest;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一个批次
pub async fn load_batch_file(toml_file_path: &Path) -> Result<BatchRequest, FileError> {
    let path_str = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path_str.clone(),
            source,
        })?;

    let mut batch: BatchRequest =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path_str.clone(),
            source,
        })?;

    batch.file_path = Some(path_str);

    Ok(batch)
}

/// 加载文件夹中的所有批次文件（按文件名排序）
///
/// 解析失败的文件只记录警告并跳过。
pub async fn load_all_batch_files(folder_path: &str) -> Result<Vec<BatchRequest>, FileError> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        });
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut batches = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_batch_file(&path).await {
            Ok(batch) => {
                tracing::info!("成功加载 {} 个订单", batch.order_ids.len());
                batches.push(batch);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(batches)
}

use serde::{Deserialize, Serialize};

/// PDF 下载方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfMode {
    /// 不下载
    #[default]
    None,
    /// 每个面单单独一个 PDF
    Individual,
    /// 合并成一个 PDF
    Combined,
}

/// 一个批次的操作输入（由 TOML 文件描述）
///
/// ```toml
/// package_id = 3
/// order_ids = [101, 102, 103]
/// select_unshipped = false
/// pdf = "combined"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// 包装 ID（必填，校验时才报错，方便给出友好提示）
    #[serde(default)]
    pub package_id: Option<i64>,
    #[serde(default)]
    pub order_ids: Vec<i64>,
    /// 是否把第一页所有"已支付未发货"的订单加入选择
    #[serde(default)]
    pub select_unshipped: bool,
    #[serde(default)]
    pub pdf: PdfMode,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl BatchRequest {
    /// 日志中显示的批次名称
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| std::path::Path::new(p).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "<内联批次>".to_string())
    }
}

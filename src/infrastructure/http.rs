use crate::error::ApiError;
use std::time::Duration;

/// 创建共享的 HTTP 客户端
///
/// `timeout_secs` 为 None 时不设超时，挂起的请求会一直等待。
pub fn build_http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client, ApiError> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| ApiError::transport("http-client", e))
}

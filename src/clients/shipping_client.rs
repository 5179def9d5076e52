//! 发货函数客户端
//!
//! 封装四个 serverless 发货函数的调用：建单、生成运单、单个 PDF、合并 PDF

use crate::error::ApiError;
use crate::infrastructure::RequestCtx;
use crate::models::Guide;
use crate::services::response::{self, LabelOutcome};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;

pub const CREATE_ENDPOINT: &str = "shipping-create";
pub const GUIDE_ENDPOINT: &str = "shipping-generate-guide";
pub const LABEL_PDF_ENDPOINT: &str = "shipping-label-pdf";
pub const BULK_PDF_ENDPOINT: &str = "shipping-labels-bulk";

/// `shipping-create` 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLabelsRequest {
    pub order_ids: Vec<i64>,
    /// 始终为 null：服务端使用每个订单自己的快递公司
    pub courier_id: Option<i64>,
    pub shipping_package_id: i64,
}

impl CreateLabelsRequest {
    pub fn new(order_ids: Vec<i64>, shipping_package_id: i64) -> Self {
        Self {
            order_ids,
            courier_id: None,
            shipping_package_id,
        }
    }
}

/// 发货函数能力
///
/// 每次调用都显式传入 [`RequestCtx`]。
#[async_trait]
pub trait ShippingApi: Send + Sync {
    /// 为一批订单创建面单
    async fn create_labels(
        &self,
        ctx: &RequestCtx,
        request: &CreateLabelsRequest,
    ) -> Result<Vec<LabelOutcome>, ApiError>;

    /// 为单个面单生成承运商运单
    async fn generate_guide(&self, ctx: &RequestCtx, label_id: i64) -> Result<Guide, ApiError>;

    /// 下载单个面单 PDF
    async fn label_pdf(&self, ctx: &RequestCtx, label_id: i64) -> Result<Vec<u8>, ApiError>;

    /// 下载合并后的面单 PDF
    async fn bulk_labels_pdf(&self, ctx: &RequestCtx, label_ids: &[i64])
        -> Result<Vec<u8>, ApiError>;
}

/// 基于 reqwest 的发货函数客户端
#[derive(Clone)]
pub struct ShippingClient {
    http: reqwest::Client,
}

impl ShippingClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        debug!("调用发货函数: {}", endpoint);
        request
            .send()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))
    }

    async fn read_text(endpoint: &str, resp: Response) -> Result<String, ApiError> {
        resp.text()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))
    }

    /// 非 2xx 时：JSON 错误信息，其次原始文本，最后 `fallback`
    async fn server_error(endpoint: &str, resp: Response, fallback: &str) -> ApiError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        ApiError::Server {
            endpoint: endpoint.to_string(),
            status,
            message: response::describe_error_body(&body).unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// PDF 接口非 2xx 时只认 JSON 错误信息，否则用通用提示
    async fn pdf_error(endpoint: &str, resp: Response) -> ApiError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        ApiError::Server {
            endpoint: endpoint.to_string(),
            status,
            message: response::json_error_message(&body)
                .unwrap_or_else(|| "PDF 下载失败".to_string()),
        }
    }

    async fn read_bytes(endpoint: &str, resp: Response) -> Result<Vec<u8>, ApiError> {
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ShippingApi for ShippingClient {
    async fn create_labels(
        &self,
        ctx: &RequestCtx,
        request: &CreateLabelsRequest,
    ) -> Result<Vec<LabelOutcome>, ApiError> {
        let url = ctx.function_url(CREATE_ENDPOINT);
        let resp = self
            .send(CREATE_ENDPOINT, ctx.authorize(self.http.post(&url).json(request)))
            .await?;

        if !resp.status().is_success() {
            return Err(Self::server_error(CREATE_ENDPOINT, resp, "创建面单失败").await);
        }

        let body = Self::read_text(CREATE_ENDPOINT, resp).await?;
        response::parse_create_labels(&body).map_err(|e| ApiError::decode(CREATE_ENDPOINT, e))
    }

    async fn generate_guide(&self, ctx: &RequestCtx, label_id: i64) -> Result<Guide, ApiError> {
        let url = ctx.function_url(GUIDE_ENDPOINT);
        let body = serde_json::json!({ "shipping_label_id": label_id });
        let resp = self
            .send(GUIDE_ENDPOINT, ctx.authorize(self.http.post(&url).json(&body)))
            .await?;

        if !resp.status().is_success() {
            return Err(Self::server_error(GUIDE_ENDPOINT, resp, "生成运单失败").await);
        }

        let text = Self::read_text(GUIDE_ENDPOINT, resp).await?;
        response::parse_guide(&text).map_err(|msg| ApiError::decode(GUIDE_ENDPOINT, msg))
    }

    async fn label_pdf(&self, ctx: &RequestCtx, label_id: i64) -> Result<Vec<u8>, ApiError> {
        let url = ctx.function_url(LABEL_PDF_ENDPOINT);
        let resp = self
            .send(
                LABEL_PDF_ENDPOINT,
                ctx.authorize(self.http.get(&url).query(&[("id", label_id)])),
            )
            .await?;

        if !resp.status().is_success() {
            return Err(Self::pdf_error(LABEL_PDF_ENDPOINT, resp).await);
        }

        Self::read_bytes(LABEL_PDF_ENDPOINT, resp).await
    }

    async fn bulk_labels_pdf(
        &self,
        ctx: &RequestCtx,
        label_ids: &[i64],
    ) -> Result<Vec<u8>, ApiError> {
        let url = ctx.function_url(BULK_PDF_ENDPOINT);
        let body = serde_json::json!({ "label_ids": label_ids });
        let resp = self
            .send(BULK_PDF_ENDPOINT, ctx.authorize(self.http.post(&url).json(&body)))
            .await?;

        if !resp.status().is_success() {
            return Err(Self::pdf_error(BULK_PDF_ENDPOINT, resp).await);
        }

        Self::read_bytes(BULK_PDF_ENDPOINT, resp).await
    }
}

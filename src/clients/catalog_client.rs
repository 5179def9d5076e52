//! 参考数据客户端
//!
//! 直接读取托管数据库的表：快递公司、包装、订单

use crate::error::ApiError;
use crate::infrastructure::RequestCtx;
use crate::models::{Courier, Order, ShippingPackage};
use crate::services::response;
use serde::de::DeserializeOwned;
use tracing::debug;

const ORDER_COLUMNS: &str = "id,courier_id,tracking_code,status";

/// 参考数据客户端
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// 所有快递公司（按名称排序）
    pub async fn fetch_couriers(&self, ctx: &RequestCtx) -> Result<Vec<Courier>, ApiError> {
        self.select(
            ctx,
            "couriers",
            &[("select", "id,name,url,logo".to_string()), ("order", "name.asc".to_string())],
        )
        .await
    }

    /// 启用中的包装（包装选择器只展示这些）
    pub async fn fetch_active_packages(
        &self,
        ctx: &RequestCtx,
    ) -> Result<Vec<ShippingPackage>, ApiError> {
        let packages: Vec<ShippingPackage> = self
            .select(
                ctx,
                "shipping_packages",
                &[
                    ("select", "*".to_string()),
                    ("active", "eq.true".to_string()),
                    ("order", "name.asc".to_string()),
                ],
            )
            .await?;
        Ok(packages.into_iter().filter(|p| p.active).collect())
    }

    /// 按 ID 重新读取订单
    pub async fn fetch_orders(
        &self,
        ctx: &RequestCtx,
        order_ids: &[i64],
    ) -> Result<Vec<Order>, ApiError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = order_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.select(
            ctx,
            "orders",
            &[
                ("select", ORDER_COLUMNS.to_string()),
                ("id", format!("in.({})", ids)),
                ("order", "id.asc".to_string()),
            ],
        )
        .await
    }

    /// 第一页"已支付、还没有运单号"的订单
    pub async fn fetch_unshipped_orders(
        &self,
        ctx: &RequestCtx,
        page_size: usize,
    ) -> Result<Vec<Order>, ApiError> {
        self.select(
            ctx,
            "orders",
            &[
                ("select", ORDER_COLUMNS.to_string()),
                ("status", "eq.paid".to_string()),
                ("tracking_code", "is.null".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", page_size.to_string()),
            ],
        )
        .await
    }

    async fn select<T: DeserializeOwned>(
        &self,
        ctx: &RequestCtx,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let url = ctx.rest_url(table);
        debug!("读取数据表: {} {:?}", table, query);

        let resp = ctx
            .authorize(self.http.get(&url).query(query))
            .send()
            .await
            .map_err(|e| ApiError::transport(table, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::transport(table, e))?;

        if !status.is_success() {
            return Err(ApiError::Server {
                endpoint: table.to_string(),
                status: status.as_u16(),
                message: response::describe_error_body(&body)
                    .unwrap_or_else(|| format!("读取 {} 失败", table)),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::decode(table, e))
    }
}

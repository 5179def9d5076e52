use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 订单（只保留发货流程需要的字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub courier_id: Option<i64>,
    #[serde(default)]
    pub tracking_code: Option<String>,
    pub status: OrderStatus,
}

impl Order {
    /// 已支付且还没有运单号
    pub fn awaits_shipment(&self) -> bool {
        self.status == OrderStatus::Paid && self.tracking_code.is_none()
    }
}

/// 订单状态
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// 待支付
    Pending,
    /// 已支付
    Paid,
    /// 处理中
    Processing,
    /// 已发货
    Shipped,
    /// 已签收
    Delivered,
    /// 已取消
    Cancelled,
    /// 已退款
    Refunded,
    /// 未知状态，原样保留
    Other(String),
}

impl OrderStatus {
    /// 数据库中的取值
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Other(s) => s,
        }
    }

    /// 从数据库取值解析
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "paid" => OrderStatus::Paid,
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            "refunded" => OrderStatus::Refunded,
            _ => OrderStatus::Other(value.to_string()),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OrderStatus::parse(&raw))
    }
}

//! 响应解析 - 业务能力层
//!
//! 在边界处把服务端的原始响应转换成严格的类型，下游代码不再检查原始形状。

use crate::models::{Guide, ShippingLabel};
use crate::utils::logging::truncate_text;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// 错误体中 raw text 的最大展示长度
const MAX_RAW_ERROR_LEN: usize = 200;

/// 单个订单的建单结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    /// 面单已创建（服务端不一定回传订单 ID）
    Created { order_id: Option<i64>, label_id: i64 },
    /// 面单创建失败
    Failed { order_id: Option<i64>, reason: String },
}

impl LabelOutcome {
    pub fn label_id(&self) -> Option<i64> {
        match self {
            LabelOutcome::Created { label_id, .. } => Some(*label_id),
            LabelOutcome::Failed { .. } => None,
        }
    }
}

/// `shipping-create` 的响应体
///
/// 每个条目单独解析，一个条目形状不对不影响其它条目。
#[derive(Debug, Deserialize)]
struct CreateLabelsResponse {
    #[serde(rename = "createdLabels", default)]
    created_labels: Vec<JsonValue>,
}

/// 面单可能是对象，也可能是只有一个元素的数组
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Many(Vec<ShippingLabel>),
    One(ShippingLabel),
}

impl RawLabel {
    fn into_first(self) -> Option<ShippingLabel> {
        match self {
            RawLabel::Many(list) => list.into_iter().next(),
            RawLabel::One(label) => Some(label),
        }
    }
}

/// 解析 `shipping-create` 的成功响应
///
/// 只有整体不是合法 JSON（或 `createdLabels` 不是数组）时才返回错误。
pub fn parse_create_labels(body: &str) -> Result<Vec<LabelOutcome>, serde_json::Error> {
    let response: CreateLabelsResponse = serde_json::from_str(body)?;
    Ok(response.created_labels.iter().map(normalize_entry).collect())
}

fn normalize_entry(entry: &JsonValue) -> LabelOutcome {
    let order_id = entry.get("order_id").and_then(loose_i64);

    if let Some(err) = entry.get("error").filter(|e| !e.is_null()) {
        return LabelOutcome::Failed {
            order_id,
            reason: error_value_message(err).unwrap_or_else(|| "未知错误".to_string()),
        };
    }

    let label = match entry.get("label").filter(|l| !l.is_null()) {
        Some(raw) => serde_json::from_value::<RawLabel>(raw.clone()).map(RawLabel::into_first),
        None => Ok(None),
    };

    match label {
        Ok(Some(label)) => LabelOutcome::Created {
            order_id: order_id.or(label.order_id),
            label_id: label.id,
        },
        Ok(None) => LabelOutcome::Failed {
            order_id,
            reason: "响应中缺少面单".to_string(),
        },
        Err(e) => LabelOutcome::Failed {
            order_id,
            reason: format!("面单数据无法解析: {}", e),
        },
    }
}

// 订单 ID 偶尔以字符串形式返回
fn loose_i64(value: &JsonValue) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[derive(Debug, Deserialize)]
struct RawGuide {
    #[serde(default)]
    tracking_code: Option<String>,
    #[serde(default)]
    label_url: Option<String>,
    #[serde(default)]
    error: Option<JsonValue>,
}

/// 解析 `shipping-generate-guide` 的成功响应
///
/// 2xx 但带 `error` 字段、或缺少运单号 / 面单地址时都算失败。
pub fn parse_guide(body: &str) -> Result<Guide, String> {
    let raw: RawGuide =
        serde_json::from_str(body).map_err(|e| format!("运单响应不是合法 JSON: {}", e))?;

    if let Some(err) = raw.error.as_ref().filter(|e| !e.is_null()) {
        return Err(error_value_message(err).unwrap_or_else(|| "未知错误".to_string()));
    }

    match (raw.tracking_code, raw.label_url) {
        (Some(tracking_code), Some(label_url))
            if !tracking_code.is_empty() && !label_url.is_empty() =>
        {
            Ok(Guide {
                tracking_code,
                label_url,
            })
        }
        _ => Err("运单响应缺少 tracking_code 或 label_url".to_string()),
    }
}

/// 从 JSON 错误体中取出错误信息
///
/// 依次尝试 `error`（字符串或带 `message` 的对象）、`message`、`msg`。
pub fn json_error_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        if let Some(msg) = error_value_message(err) {
            return Some(msg);
        }
    }
    ["message", "msg"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// 描述一个非 2xx 响应体：优先 JSON 错误信息，其次原始文本
pub fn describe_error_body(body: &str) -> Option<String> {
    json_error_message(body).or_else(|| {
        let text = body.trim();
        (!text.is_empty()).then(|| truncate_text(text, MAX_RAW_ERROR_LEN))
    })
}

fn error_value_message(err: &JsonValue) -> Option<String> {
    match err {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| Some(err.to_string())),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

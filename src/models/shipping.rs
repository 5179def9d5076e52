//! 发货相关的参考数据与结果类型

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// 包装模板（盒子 / 信封）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingPackage {
    pub id: i64,
    pub name: String,
    /// 空包装重量（kg）
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub weight: f64,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub length: f64,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub width: f64,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub height: f64,
    #[serde(default)]
    pub active: bool,
}

/// 快递公司
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    pub id: i64,
    pub name: String,
    /// 查件链接模板
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl Courier {
    /// 拼出查件链接
    ///
    /// 模板里的 `{tracking}` / `{tracking_code}` / `{code}` 会被替换成运单号，
    /// 没有占位符时直接把运单号拼到末尾。
    pub fn tracking_link(&self, tracking_code: &str) -> Option<String> {
        let template = self.url.as_deref()?.trim();
        if template.is_empty() || tracking_code.is_empty() {
            return None;
        }

        let re = placeholder_regex();
        if re.is_match(template) {
            Some(re.replace_all(template, tracking_code).into_owned())
        } else {
            Some(format!("{}{}", template, tracking_code))
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\s*(tracking_code|tracking|code)\s*\}").expect("占位符正则无效")
    })
}

/// 服务端的面单记录（本地只关心这几个字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingLabel {
    pub id: i64,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub label_url: Option<String>,
}

/// 承运商运单（生成成功后的结果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub tracking_code: String,
    pub label_url: String,
}

// numeric 列经 PostgREST 返回时可能是字符串
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            value.trim().parse().map_err(E::custom)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn courier(url: Option<&str>) -> Courier {
        Courier {
            id: 1,
            name: "Estafeta".to_string(),
            url: url.map(str::to_string),
            logo: None,
        }
    }

    #[test]
    fn test_tracking_link_with_placeholder() {
        let c = courier(Some("https://track.example.com/?guide={tracking}&lang=es"));
        assert_eq!(
            c.tracking_link("ABC123").as_deref(),
            Some("https://track.example.com/?guide=ABC123&lang=es")
        );
    }

    #[test]
    fn test_tracking_link_appends_without_placeholder() {
        let c = courier(Some("https://track.example.com/q="));
        assert_eq!(
            c.tracking_link("XYZ").as_deref(),
            Some("https://track.example.com/q=XYZ")
        );
    }

    #[test]
    fn test_tracking_link_missing_template() {
        assert_eq!(courier(None).tracking_link("XYZ"), None);
        assert_eq!(courier(Some("  ")).tracking_link("XYZ"), None);
    }

    #[test]
    fn test_package_accepts_numeric_strings() {
        let pkg: ShippingPackage = serde_json::from_str(
            r#"{"id": 3, "name": "Caja anillo", "weight": "0.15", "length": 10, "width": 8.5, "height": null, "active": true}"#,
        )
        .unwrap();
        assert_eq!(pkg.weight, 0.15);
        assert_eq!(pkg.length, 10.0);
        assert_eq!(pkg.height, 0.0);
        assert!(pkg.active);
    }
}

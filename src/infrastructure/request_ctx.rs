//! 请求上下文 - 基础设施层
//!
//! 把"请求发往哪里、带什么凭证"显式地传给每一次网络调用，
//! 会话 token 的生命周期在调用处一目了然。

use reqwest::RequestBuilder;

/// 请求上下文
///
/// 职责：
/// - 持有后端地址、匿名 key 和可选的会话 token
/// - 拼接 functions / rest / auth 三类地址
/// - 给请求加上 `apikey` 与 `Authorization` 头
/// - 不认识订单 / 面单
#[derive(Clone)]
pub struct RequestCtx {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RequestCtx {
    /// 创建匿名上下文
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
        }
    }

    /// 带上会话 token 的新上下文
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// 是否已登录
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// serverless 函数地址
    pub fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    /// 数据表读取地址
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// 认证服务地址
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// 给请求加上凭证头
    ///
    /// 有会话 token 时用它做 Bearer，否则不带 Authorization。
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("apikey", &self.anon_key);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl std::fmt::Debug for RequestCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCtx")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

//! 认证客户端
//!
//! 用管理员账号密码换取会话 token

use crate::error::ApiError;
use crate::infrastructure::RequestCtx;
use crate::services::response;
use serde::Deserialize;

const TOKEN_ENDPOINT: &str = "auth/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// 认证客户端
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// 密码登录，返回会话 token
    pub async fn sign_in_with_password(
        &self,
        ctx: &RequestCtx,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let url = ctx.auth_url("token");
        let resp = ctx
            .authorize(
                self.http
                    .post(&url)
                    .query(&[("grant_type", "password")])
                    .json(&serde_json::json!({ "email": email, "password": password })),
            )
            .send()
            .await
            .map_err(|e| ApiError::transport(TOKEN_ENDPOINT, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::transport(TOKEN_ENDPOINT, e))?;

        if !status.is_success() {
            return Err(ApiError::Server {
                endpoint: TOKEN_ENDPOINT.to_string(),
                status: status.as_u16(),
                message: response::json_error_message(&body)
                    .unwrap_or_else(|| "登录失败".to_string()),
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::decode(TOKEN_ENDPOINT, e))?;
        Ok(token.access_token)
    }
}

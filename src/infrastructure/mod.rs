//! 基础设施层：只暴露"发请求"需要的能力

pub mod http;
pub mod request_ctx;

pub use http::build_http_client;
pub use request_ctx::RequestCtx;

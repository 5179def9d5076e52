//! # Shipping Label Submit
//!
//! 珠宝商城后台的批量发货面单工具：为一批订单创建面单、逐个生成承运商运单、
//! 下载单个或合并的面单 PDF。所有数据和业务逻辑都在托管后端，本程序只负责编排。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 请求上下文与 HTTP 客户端
//! - `RequestCtx` - 后端地址 + 凭证，显式传入每一次调用
//!
//! ### ② 业务能力层（Clients / Services）
//! - `clients/` - 发货函数、参考数据、登录
//! - `services/` - 响应解析、PDF 落盘、失败面单记录
//!
//! ### ③ 流程层（Workflow）
//! - `SelectionState` - 订单选择
//! - `FlowState` - 发货流程状态机
//! - `ShippingFlow` - 流程编排（建单 → 运单 → PDF）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批次加载、调度、统计

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CatalogClient, CreateLabelsRequest, ShippingApi, ShippingClient};
pub use config::Config;
pub use error::{ApiError, AppError, AppResult};
pub use infrastructure::RequestCtx;
pub use models::{BatchRequest, Courier, Guide, Order, ShippingPackage};
pub use orchestrator::App;
pub use workflow::{FlowState, GuideReport, SelectionState, ShippingFlow};

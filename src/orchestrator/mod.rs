//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度和全局统计，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批次处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载批次文件（Vec<BatchRequest>）
//! - 持有请求上下文和各个客户端
//! - 逐批交给 `workflow::ShippingFlow`
//! - 输出全局统计信息
//!
//! 本层不做业务判断，只做调度和统计。

pub mod batch_processor;

pub use batch_processor::App;

//! 流程层（Workflow）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (处理 Vec<BatchRequest>)
//!     ↓
//! workflow::ShippingFlow (处理一个批次：建单 → 运单 → PDF)
//!     ↓
//! clients / services (能力层：发货函数 / 参考数据 / 响应解析 / 落盘)
//!     ↓
//! infrastructure (RequestCtx)
//! ```

pub mod guide_report;
pub mod label_flow;
pub mod selection;
pub mod state;

pub use guide_report::{GuideReport, LabelRecord};
pub use label_flow::{generate_guides, ShippingFlow};
pub use selection::SelectionState;
pub use state::{FlowEvent, FlowState, PdfChoice};

//! 批量面单流程 - 流程层
//!
//! 核心职责：定义"一个批次"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验选择（订单 + 启用中的包装）
//! 2. 一次请求创建所有面单（部分失败可以接受）
//! 3. 逐个生成运单（严格串行，单个失败不影响后续）
//! 4. 等待操作员选择 PDF 下载方式（单个 / 合并）

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::clients::{CreateLabelsRequest, ShippingApi};
use crate::error::{ApiError, AppError, AppResult, FlowError, ValidationError};
use crate::infrastructure::RequestCtx;
use crate::models::ShippingPackage;
use crate::services::{LabelOutcome, PdfWriter};
use crate::workflow::guide_report::GuideReport;
use crate::workflow::selection::SelectionState;
use crate::workflow::state::{FlowEvent, FlowState, PdfChoice};

/// 一个面单都没创建成功、服务端也没给出原因时的提示
pub const NO_LABELS_HINT: &str =
    "未能创建任何面单：请确认订单已支付、尚未生成运单，且存在启用的包装和快递公司";

/// 批量面单流程
///
/// - 持有流程状态和本批次的临时结果（不落库，重置即丢弃）
/// - 每个操作失败时都会写入面向操作员的状态信息并回到 `Idle`
/// - 不持有请求上下文，调用方每次显式传入
pub struct ShippingFlow<A: ShippingApi> {
    api: A,
    pdf_writer: PdfWriter,
    state: FlowState,
    status_message: Option<String>,
    created_label_ids: Vec<i64>,
    create_error: Option<String>,
    report: GuideReport,
}

impl<A: ShippingApi> ShippingFlow<A> {
    /// 创建新的批量面单流程
    pub fn new(api: A, pdf_writer: PdfWriter) -> Self {
        Self {
            api,
            pdf_writer,
            state: FlowState::Idle,
            status_message: None,
            created_label_ids: Vec::new(),
            create_error: None,
            report: GuideReport::default(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// 是否有请求在进行中
    pub fn is_processing(&self) -> bool {
        self.state.is_processing()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn created_label_ids(&self) -> &[i64] {
        &self.created_label_ids
    }

    /// 建单阶段第一个失败原因（部分成功时保留用于展示）
    pub fn create_error(&self) -> Option<&str> {
        self.create_error.as_deref()
    }

    pub fn report(&self) -> &GuideReport {
        &self.report
    }

    /// 提交一个批次：建单 → 逐个生成运单
    ///
    /// 失败时选择保持不变；至少创建了一个面单时清空选择。
    pub async fn submit(
        &mut self,
        ctx: &RequestCtx,
        selection: &mut SelectionState,
        package_id: Option<i64>,
        active_packages: &[ShippingPackage],
    ) -> AppResult<&GuideReport> {
        if self.is_processing() {
            let err = AppError::from(FlowError::Busy);
            self.status_message = Some(err.to_string());
            return Err(err);
        }

        let package_id = match validate(selection, package_id, active_packages) {
            Ok(id) => id,
            Err(e) => {
                warn!("⚠️ 批次校验失败: {}", e);
                self.status_message = Some(e.to_string());
                return Err(e.into());
            }
        };

        // 上一批次的结果在新批次开始时丢弃
        if self.state != FlowState::Idle {
            self.reset_shipping_flow();
        }
        self.created_label_ids.clear();
        self.create_error = None;
        self.report = GuideReport::default();

        self.transition(FlowEvent::Submit)?;
        self.status_message = Some(format!("正在为 {} 个订单创建面单...", selection.len()));

        let order_ids = selection.order_ids();
        info!("📦 创建面单: {} 个订单, 包装 #{}", order_ids.len(), package_id);

        let label_ids = match self.create_step(ctx, order_ids, package_id).await {
            Ok(ids) => ids,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.created_label_ids = label_ids;

        self.transition(FlowEvent::LabelsCreated)?;
        self.status_message = Some(format!(
            "已创建 {} 个面单，正在生成运单...",
            self.created_label_ids.len()
        ));

        self.report = generate_guides(&self.api, ctx, &self.created_label_ids).await;

        self.transition(FlowEvent::GuidesGenerated)?;
        selection.clear();
        self.status_message = Some(self.summary());

        Ok(&self.report)
    }

    /// 下载单个面单 PDF
    pub async fn download_pdf_individual(
        &mut self,
        ctx: &RequestCtx,
        label_id: i64,
    ) -> AppResult<PathBuf> {
        self.begin_download(PdfChoice::Individual(label_id))?;

        let bytes = match self.api.label_pdf(ctx, label_id).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e.into())),
        };
        let path = match self.pdf_writer.write_label(label_id, bytes).await {
            Ok(path) => path,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.transition(FlowEvent::DownloadFinished)?;
        info!("✓ 面单 #{} PDF 已保存: {}", label_id, path.display());
        self.status_message = Some(format!("面单 #{} 的 PDF 已保存", label_id));
        Ok(path)
    }

    /// 下载所有已创建面单的合并 PDF
    pub async fn download_pdf_combined(&mut self, ctx: &RequestCtx) -> AppResult<PathBuf> {
        self.begin_download(PdfChoice::Combined)?;

        let label_ids = self.created_label_ids.clone();
        let bytes = match self.api.bulk_labels_pdf(ctx, &label_ids).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e.into())),
        };
        let path = match self.pdf_writer.write_combined(bytes).await {
            Ok(path) => path,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.transition(FlowEvent::DownloadFinished)?;
        info!("✓ 合并 PDF 已保存 ({} 个面单): {}", label_ids.len(), path.display());
        self.status_message = Some(format!("{} 个面单的合并 PDF 已保存", label_ids.len()));
        Ok(path)
    }

    /// 清空本批次的所有临时状态，不访问服务端
    pub fn reset_shipping_flow(&mut self) {
        self.state = self.state.apply(FlowEvent::Reset).unwrap_or(FlowState::Idle);
        self.status_message = None;
        self.created_label_ids.clear();
        self.create_error = None;
        self.report = GuideReport::default();
    }

    // ========== 内部步骤 ==========

    /// 建单：返回成功创建的面单 ID（去重，保持顺序）
    async fn create_step(
        &mut self,
        ctx: &RequestCtx,
        order_ids: Vec<i64>,
        package_id: i64,
    ) -> Result<Vec<i64>, ApiError> {
        let request = CreateLabelsRequest::new(order_ids, package_id);
        let outcomes = self.api.create_labels(ctx, &request).await?;

        let mut label_ids: Vec<i64> = Vec::new();
        for outcome in &outcomes {
            match outcome {
                LabelOutcome::Created { order_id, label_id } => {
                    match order_id {
                        Some(order_id) => info!("[订单 {}] ✓ 面单 #{} 已创建", order_id, label_id),
                        None => info!("✓ 面单 #{} 已创建（响应未带订单 ID）", label_id),
                    }
                    if !label_ids.contains(label_id) {
                        label_ids.push(*label_id);
                    }
                }
                LabelOutcome::Failed { order_id, reason } => {
                    warn!("[订单 {:?}] ⚠️ 面单创建失败: {}", order_id, reason);
                    if self.create_error.is_none() {
                        self.create_error = Some(reason.clone());
                    }
                }
            }
        }

        if label_ids.is_empty() {
            let message = match &self.create_error {
                Some(reason) => format!("未能创建任何面单: {}", reason),
                None => NO_LABELS_HINT.to_string(),
            };
            return Err(ApiError::EmptyBatch(message));
        }

        Ok(label_ids)
    }

    fn begin_download(&mut self, choice: PdfChoice) -> AppResult<()> {
        self.transition(FlowEvent::ChoosePdf(choice)).map_err(|e| {
            self.status_message = Some(e.to_string());
            e
        })
    }

    fn transition(&mut self, event: FlowEvent) -> AppResult<()> {
        self.state = self.state.apply(event)?;
        Ok(())
    }

    /// 任意一步失败：记录状态信息并回到 Idle
    fn fail(&mut self, err: AppError) -> AppError {
        error!("❌ 发货流程失败 ({}): {}", self.state, err);
        self.status_message = Some(err.to_string());
        self.state = self.state.apply(FlowEvent::Failed).unwrap_or(FlowState::Idle);
        err
    }

    fn summary(&self) -> String {
        let total = self.report.len();
        let ok = self.report.success_count();
        let mut message = format!("已创建 {} 个面单，运单生成成功 {}/{}", total, ok, total);
        if ok < total {
            message.push_str(&format!("，失败面单: {:?}", self.report.failed_label_ids()));
        }
        if let Some(reason) = &self.create_error {
            message.push_str(&format!("；部分订单未能创建面单: {}", reason));
        }
        message
    }
}

/// 逐个生成运单
///
/// 第 N+1 个请求在第 N 个请求结束（成功或失败）后才发出；
/// 单个失败只记录到报告里，循环继续。
pub async fn generate_guides<A: ShippingApi + ?Sized>(
    api: &A,
    ctx: &RequestCtx,
    label_ids: &[i64],
) -> GuideReport {
    let total = label_ids.len();
    let mut report = GuideReport::default();

    for (idx, &label_id) in label_ids.iter().enumerate() {
        info!("[面单 {}] 🚚 生成运单 ({}/{})...", label_id, idx + 1, total);

        let result = api
            .generate_guide(ctx, label_id)
            .await
            .map_err(|e| e.to_string());

        match &result {
            Ok(guide) => info!("[面单 {}] ✓ 运单号 {}", label_id, guide.tracking_code),
            Err(e) => warn!("[面单 {}] ⚠️ 运单生成失败: {}", label_id, e),
        }

        report.record(label_id, result);
    }

    report
}

fn validate(
    selection: &SelectionState,
    package_id: Option<i64>,
    active_packages: &[ShippingPackage],
) -> Result<i64, ValidationError> {
    selection.ensure_not_empty()?;
    let package_id = package_id.ok_or(ValidationError::MissingPackage)?;
    if !active_packages.iter().any(|p| p.id == package_id && p.active) {
        return Err(ValidationError::InactivePackage { package_id });
    }
    Ok(package_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Guide;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// 记录调用顺序的假发货接口
    #[derive(Default)]
    struct FakeApi {
        outcomes: Vec<LabelOutcome>,
        failing_guides: HashSet<i64>,
        pdf_fails: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_outcomes(outcomes: Vec<LabelOutcome>) -> Self {
            Self {
                outcomes,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn guide_calls(&self) -> Vec<i64> {
            self.calls()
                .iter()
                .filter_map(|c| c.strip_prefix("guide:"))
                .map(|id| id.parse().unwrap())
                .collect()
        }
    }

    fn server_error(endpoint: &str) -> ApiError {
        ApiError::Server {
            endpoint: endpoint.to_string(),
            status: 500,
            message: "PDF 下载失败".to_string(),
        }
    }

    #[async_trait]
    impl ShippingApi for FakeApi {
        async fn create_labels(
            &self,
            _ctx: &RequestCtx,
            request: &CreateLabelsRequest,
        ) -> Result<Vec<LabelOutcome>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("create:{:?}", request.order_ids));
            Ok(self.outcomes.clone())
        }

        async fn generate_guide(&self, _ctx: &RequestCtx, label_id: i64) -> Result<Guide, ApiError> {
            self.calls.lock().unwrap().push(format!("guide:{}", label_id));
            if self.failing_guides.contains(&label_id) {
                return Err(ApiError::Server {
                    endpoint: "shipping-generate-guide".to_string(),
                    status: 502,
                    message: "carrier unavailable".to_string(),
                });
            }
            Ok(Guide {
                tracking_code: format!("TRK{}", label_id),
                label_url: format!("https://labels/{}.pdf", label_id),
            })
        }

        async fn label_pdf(&self, _ctx: &RequestCtx, label_id: i64) -> Result<Vec<u8>, ApiError> {
            self.calls.lock().unwrap().push(format!("pdf:{}", label_id));
            if self.pdf_fails {
                return Err(server_error("shipping-label-pdf"));
            }
            Ok(b"%PDF-1.4 single".to_vec())
        }

        async fn bulk_labels_pdf(
            &self,
            _ctx: &RequestCtx,
            label_ids: &[i64],
        ) -> Result<Vec<u8>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("bulk:{:?}", label_ids));
            if self.pdf_fails {
                return Err(server_error("shipping-labels-bulk"));
            }
            Ok(b"%PDF-1.4 combined".to_vec())
        }
    }

    fn ctx() -> RequestCtx {
        RequestCtx::new("https://shop.example.co", "anon").with_access_token(Some("jwt".into()))
    }

    fn package(id: i64, active: bool) -> ShippingPackage {
        ShippingPackage {
            id,
            name: format!("Caja {}", id),
            weight: 0.2,
            length: 10.0,
            width: 10.0,
            height: 5.0,
            active,
        }
    }

    fn selection(ids: &[i64]) -> SelectionState {
        let mut sel = SelectionState::new();
        for id in ids {
            sel.toggle(*id);
        }
        sel
    }

    fn created(order_id: i64, label_id: i64) -> LabelOutcome {
        LabelOutcome::Created {
            order_id: Some(order_id),
            label_id,
        }
    }

    fn failed(order_id: i64, reason: &str) -> LabelOutcome {
        LabelOutcome::Failed {
            order_id: Some(order_id),
            reason: reason.to_string(),
        }
    }

    fn flow(api: FakeApi, dir: &tempfile::TempDir) -> ShippingFlow<FakeApi> {
        ShippingFlow::new(api, PdfWriter::new(dir.path()))
    }

    #[tokio::test]
    async fn test_empty_selection_rejected_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = flow(FakeApi::default(), &dir);
        let mut sel = SelectionState::new();

        let err = flow
            .submit(&ctx(), &mut sel, Some(1), &[package(1, true)])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ValidationError::EmptySelection)));
        assert_eq!(flow.status_message(), Some("请至少选择一个订单"));
        assert_eq!(flow.state(), FlowState::Idle);
        assert!(flow.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_inactive_package_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = flow(FakeApi::default(), &dir);
        let mut sel = selection(&[1]);

        let err = flow.submit(&ctx(), &mut sel, None, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::MissingPackage)));

        let err = flow
            .submit(&ctx(), &mut sel, Some(2), &[package(2, false)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InactivePackage { package_id: 2 })
        ));
        assert!(flow.api.calls().is_empty());
        assert_eq!(sel.order_ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_all_orders_failing_yields_single_aggregate_error() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![
            failed(1, "unpaid"),
            failed(2, "missing courier"),
        ]);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1, 2]);

        let err = flow
            .submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(ApiError::EmptyBatch(_))));
        assert_eq!(flow.status_message(), Some("未能创建任何面单: unpaid"));
        assert!(flow.created_label_ids().is_empty());
        assert!(flow.api.guide_calls().is_empty());
        assert_eq!(flow.state(), FlowState::Idle);
        assert_eq!(sel.order_ids(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_response_uses_generic_hint() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = flow(FakeApi::default(), &dir);
        let mut sel = selection(&[1]);

        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap_err();

        assert_eq!(flow.status_message(), Some(NO_LABELS_HINT));
    }

    #[tokio::test]
    async fn test_partial_success_generates_guide_for_created_label_only() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![created(1, 501), failed(2, "unpaid")]);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1, 2]);

        let report = flow
            .submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(flow.api.guide_calls(), vec![501]);
        assert_eq!(flow.created_label_ids(), &[501]);
        assert_eq!(flow.create_error(), Some("unpaid"));
        assert_eq!(flow.state(), FlowState::AwaitingChoice);
        assert!(sel.is_empty());

        let message = flow.status_message().unwrap();
        assert!(!message.starts_with("未能创建任何面单"));
        assert!(message.contains("1/1"));
    }

    #[tokio::test]
    async fn test_guides_run_in_input_order_despite_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = FakeApi::with_outcomes(vec![
            created(1, 10),
            created(2, 20),
            created(3, 30),
        ]);
        api.failing_guides.insert(20);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1, 2, 3]);

        let report = flow
            .submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap()
            .clone();

        assert_eq!(flow.api.guide_calls(), vec![10, 20, 30]);
        assert_eq!(report.len(), 3);
        let errors: Vec<_> = report.records().iter().filter(|r| r.error.is_some()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].label_id, 20);
        assert_eq!(
            flow.api.calls().first().map(String::as_str),
            Some("create:[1, 2, 3]")
        );
    }

    #[tokio::test]
    async fn test_duplicate_label_ids_are_attempted_once() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![created(1, 10), created(2, 10)]);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1, 2]);

        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();

        assert_eq!(flow.api.guide_calls(), vec![10]);
    }

    #[tokio::test]
    async fn test_combined_download_writes_file_and_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![created(1, 10), created(2, 20)]);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1, 2]);
        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();

        let path = flow.download_pdf_combined(&ctx()).await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4 combined");
        assert!(flow.api.calls().contains(&"bulk:[10, 20]".to_string()));
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_individual_downloads_stay_in_choice() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![created(1, 10), created(2, 20)]);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1, 2]);
        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();

        let first = flow.download_pdf_individual(&ctx(), 10).await.unwrap();
        let second = flow.download_pdf_individual(&ctx(), 20).await.unwrap();

        assert!(first.ends_with("label-10.pdf"));
        assert!(second.ends_with("label-20.pdf"));
        assert_eq!(flow.state(), FlowState::AwaitingChoice);
    }

    #[tokio::test]
    async fn test_pdf_failures_set_status_and_return_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = FakeApi::with_outcomes(vec![created(1, 10)]);
        api.pdf_fails = true;
        let mut flow = flow(api, &dir);

        let mut sel = selection(&[1]);
        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();
        let err = flow.download_pdf_individual(&ctx(), 10).await.unwrap_err();
        assert_eq!(err.to_string(), "PDF 下载失败 (HTTP 500)");
        assert_eq!(flow.status_message(), Some("PDF 下载失败 (HTTP 500)"));
        assert_eq!(flow.state(), FlowState::Idle);

        let mut sel = selection(&[1]);
        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();
        assert!(flow.download_pdf_combined(&ctx()).await.is_err());
        assert_eq!(flow.status_message(), Some("PDF 下载失败 (HTTP 500)"));
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_download_without_batch_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = flow(FakeApi::default(), &dir);

        let err = flow.download_pdf_combined(&ctx()).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Flow(FlowError::InvalidTransition { .. })
        ));
        assert!(flow.status_message().is_some());
        assert!(flow.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_everything_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![created(1, 10), failed(2, "unpaid")]);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1, 2]);
        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();
        let calls_before = flow.api.calls().len();

        flow.reset_shipping_flow();

        assert_eq!(flow.state(), FlowState::Idle);
        assert!(flow.status_message().is_none());
        assert!(flow.created_label_ids().is_empty());
        assert!(flow.report().is_empty());
        assert!(flow.create_error().is_none());
        assert_eq!(flow.api.calls().len(), calls_before);

        // 重置后不能再下载上一批次的 PDF
        let err = flow.download_pdf_combined(&ctx()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Flow(FlowError::InvalidTransition { .. })
        ));
        assert_eq!(flow.api.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent_from_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = flow(FakeApi::default(), &dir);

        flow.reset_shipping_flow();
        flow.reset_shipping_flow();

        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_label_without_order_id_still_gets_guide() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![LabelOutcome::Created {
            order_id: None,
            label_id: 777,
        }]);
        let mut flow = flow(api, &dir);
        let mut sel = selection(&[1]);

        let report = flow
            .submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();

        assert_eq!(report.success_count(), 1);
        assert_eq!(flow.created_label_ids(), &[777]);
        assert_eq!(flow.api.guide_calls(), vec![777]);
    }

    #[tokio::test]
    async fn test_new_batch_discards_pending_results() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_outcomes(vec![created(1, 10)]);
        let mut flow = flow(api, &dir);

        let mut sel = selection(&[1]);
        flow.submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();
        assert_eq!(flow.state(), FlowState::AwaitingChoice);

        let mut sel = selection(&[1]);
        let report = flow
            .submit(&ctx(), &mut sel, Some(3), &[package(3, true)])
            .await
            .unwrap();
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_generate_guides_directly() {
        let mut api = FakeApi::default();
        api.failing_guides.insert(2);

        let report = tokio_test::block_on(generate_guides(&api, &ctx(), &[1, 2, 3]));

        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failed_label_ids(), vec![2]);
        assert_eq!(
            report.records()[1].error.as_deref(),
            Some("carrier unavailable (HTTP 502)")
        );
    }
}

//! 批次处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批次的加载、调度和统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、初始化日志文件、解析会话（token 或账号密码登录）
//! 2. **批量加载**：扫描并加载所有待处理的批次文件（`Vec<BatchRequest>`）
//! 3. **逐批处理**：每个批次交给 `ShippingFlow`，批次之间严格串行
//! 4. **PDF 分发**：按批次配置下载单个或合并 PDF
//! 5. **失败跟进**：运单生成失败的面单写入记录文件，不自动重试
//! 6. **结果回读**：批次完成后重新读取订单，以服务端为准
//! 7. **全局统计**：汇总所有批次的处理结果

use crate::clients::{AuthClient, CatalogClient, ShippingClient};
use crate::config::Config;
use crate::infrastructure::{build_http_client, RequestCtx};
use crate::models::{BatchRequest, Courier, PdfMode};
use crate::services::{FailedLabelWriter, PdfWriter};
use crate::utils::logging;
use crate::workflow::{FlowState, SelectionState, ShippingFlow};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    ctx: RequestCtx,
    catalog: CatalogClient,
    flow: ShippingFlow<ShippingClient>,
    failed_writer: FailedLabelWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        let http = build_http_client(config.http_timeout_secs)?;
        let ctx = resolve_session(&config, &http).await?;

        logging::log_startup(ctx.base_url(), ctx.is_authenticated());

        let flow = ShippingFlow::new(
            ShippingClient::new(http.clone()),
            PdfWriter::new(&config.pdf_output_dir),
        );

        Ok(Self {
            failed_writer: FailedLabelWriter::new(&config.failed_labels_file),
            catalog: CatalogClient::new(http),
            ctx,
            flow,
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        let batches = self.load_batches().await?;

        if batches.is_empty() {
            warn!("⚠️ 没有找到待处理的批次文件，程序结束");
            return Ok(());
        }

        let total = batches.len();
        logging::log_batches_loaded(total);

        let couriers = match self.catalog.fetch_couriers(&self.ctx).await {
            Ok(couriers) => couriers,
            Err(e) => {
                warn!("⚠️ 读取快递公司失败，查件链接将不可用: {}", e);
                Vec::new()
            }
        };

        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (idx, batch) in batches.iter().enumerate() {
            let result = self.process_batch(batch, idx + 1, total, &couriers).await;
            match result {
                Ok(result) => {
                    stats.labels_ok += result.labels_ok;
                    stats.labels_failed += result.labels_failed;
                    logging::log_batch_complete(
                        idx + 1,
                        result.labels_ok,
                        result.labels_ok + result.labels_failed,
                    );
                }
                Err(e) => {
                    error!("[批次 {}] ❌ {}", batch.display_name(), e);
                    stats.batches_failed += 1;
                }
            }
        }

        logging::print_final_stats(
            stats.labels_ok,
            stats.labels_failed,
            stats.batches_failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(())
    }

    /// 加载批次
    async fn load_batches(&self) -> Result<Vec<BatchRequest>> {
        info!("\n📁 正在扫描待处理的批次...");
        crate::models::load_all_batch_files(&self.config.batch_folder)
            .await
            .context("加载批次文件失败")
    }

    /// 处理单个批次
    async fn process_batch(
        &mut self,
        batch: &BatchRequest,
        batch_num: usize,
        total_batches: usize,
        couriers: &[Courier],
    ) -> Result<BatchResult> {
        let name = batch.display_name();
        let packages = self
            .catalog
            .fetch_active_packages(&self.ctx)
            .await
            .context("读取包装列表失败")?;

        let selection = self.build_selection(batch).await?;
        let order_ids = selection.order_ids();
        logging::log_batch_start(batch_num, total_batches, &name, order_ids.len());

        let mut selection = selection;
        let report = self
            .flow
            .submit(&self.ctx, &mut selection, batch.package_id, &packages)
            .await?
            .clone();

        if let Some(msg) = self.flow.status_message() {
            info!("[批次 {}] {}", name, msg);
        }

        for record in report.failures() {
            let reason = record.error.as_deref().unwrap_or("未知错误");
            if let Err(e) = self.failed_writer.write(&name, record.label_id, reason) {
                warn!("⚠️ 写入失败记录出错: {}", e);
            }
        }
        if !report.failed_label_ids().is_empty() {
            warn!(
                "[批次 {}] ⚠️ 以下面单未生成运单，需要人工重新提交: {:?}",
                name,
                report.failed_label_ids()
            );
        }

        self.dispatch_pdf(batch.pdf, &report).await;

        // 回到初始状态，丢弃本批次的临时结果
        if self.flow.state() != FlowState::Idle {
            self.flow.reset_shipping_flow();
        }

        self.refresh_orders(&order_ids, couriers).await;

        Ok(BatchResult {
            labels_ok: report.success_count(),
            labels_failed: report.len() - report.success_count(),
        })
    }

    /// 根据批次配置构造选择
    async fn build_selection(&self, batch: &BatchRequest) -> Result<SelectionState> {
        let mut selection = SelectionState::new();
        for id in &batch.order_ids {
            if !selection.contains(*id) {
                selection.toggle(*id);
            }
        }

        if batch.select_unshipped {
            let page = self
                .catalog
                .fetch_unshipped_orders(&self.ctx, self.config.order_page_size)
                .await
                .context("读取待发货订单失败")?;
            let page_ids: Vec<i64> = page.iter().map(|o| o.id).collect();
            info!("🔎 本页待发货订单: {} 个", page_ids.len());
            if !selection.all_selected(&page_ids) {
                selection.toggle_all_on_page(&page_ids);
            }
        }

        Ok(selection)
    }

    /// 下载 PDF（失败只记录，不影响批次结果）
    async fn dispatch_pdf(&mut self, mode: PdfMode, report: &crate::workflow::GuideReport) {
        match mode {
            PdfMode::None => {}
            PdfMode::Combined => {
                if let Err(e) = self.flow.download_pdf_combined(&self.ctx).await {
                    warn!("⚠️ 合并 PDF 下载失败: {}", e);
                }
            }
            PdfMode::Individual => {
                let ready: Vec<i64> = report
                    .records()
                    .iter()
                    .filter(|r| r.is_success())
                    .map(|r| r.label_id)
                    .collect();
                for label_id in ready {
                    if let Err(e) = self.flow.download_pdf_individual(&self.ctx, label_id).await {
                        // 失败后流程已回到 Idle，剩下的需要重新运行批次
                        warn!("⚠️ 面单 #{} PDF 下载失败: {}", label_id, e);
                        break;
                    }
                }
            }
        }
    }

    /// 批次完成后重新读取订单状态
    async fn refresh_orders(&self, order_ids: &[i64], couriers: &[Courier]) {
        let orders = match self.catalog.fetch_orders(&self.ctx, order_ids).await {
            Ok(orders) => orders,
            Err(e) => {
                warn!("⚠️ 重新读取订单失败: {}", e);
                return;
            }
        };

        for order in orders {
            let link = order.tracking_code.as_deref().and_then(|code| {
                couriers
                    .iter()
                    .find(|c| Some(c.id) == order.courier_id)
                    .and_then(|c| c.tracking_link(code))
            });
            match (&order.tracking_code, link) {
                (Some(code), Some(link)) => {
                    info!("[订单 {}] {} | 运单号 {} | {}", order.id, order.status, code, link)
                }
                (Some(code), None) => info!("[订单 {}] {} | 运单号 {}", order.id, order.status, code),
                (None, _) => info!("[订单 {}] {} | 暂无运单号", order.id, order.status),
            }
        }
    }
}

/// 解析会话：优先使用配置的 token，其次账号密码登录，最后匿名
async fn resolve_session(config: &Config, http: &reqwest::Client) -> Result<RequestCtx> {
    let ctx = RequestCtx::new(&config.backend_url, &config.anon_key);

    if let Some(token) = &config.access_token {
        return Ok(ctx.with_access_token(Some(token.clone())));
    }

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let token = AuthClient::new(http.clone())
            .sign_in_with_password(&ctx, email, password)
            .await
            .context("管理员登录失败")?;
        return Ok(ctx.with_access_token(Some(token)));
    }

    warn!("⚠️ 未配置会话 token 或管理员账号，将以匿名身份请求");
    Ok(ctx)
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    labels_ok: usize,
    labels_failed: usize,
    batches_failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    labels_ok: usize,
    labels_failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app(server: &MockServer, dir: &tempfile::TempDir) -> App {
        let config = Config {
            backend_url: server.uri(),
            anon_key: "anon-key".to_string(),
            access_token: Some("jwt-token".to_string()),
            pdf_output_dir: dir.path().join("labels").to_string_lossy().to_string(),
            failed_labels_file: dir.path().join("failed.txt").to_string_lossy().to_string(),
            output_log_file: dir.path().join("output.txt").to_string_lossy().to_string(),
            ..Default::default()
        };
        App::initialize(config).await.unwrap()
    }

    /// 包装、建单（3 个面单）、运单（502 失败）、订单回读
    async fn mount_batch(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/shipping_packages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 3, "name": "Caja chica", "weight": "0.20", "active": true }
            ])))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/shipping-create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "createdLabels": [
                    { "order_id": 1, "label": { "id": 501 } },
                    { "order_id": 2, "label": { "id": 502 } },
                    { "order_id": 3, "label": { "id": 503 } }
                ]
            })))
            .expect(1)
            .mount(server)
            .await;

        for label_id in [501, 503] {
            Mock::given(method("POST"))
                .and(path("/functions/v1/shipping-generate-guide"))
                .and(body_json(json!({ "shipping_label_id": label_id })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "tracking_code": format!("TRK{}", label_id),
                    "label_url": format!("https://labels/{}.pdf", label_id)
                })))
                .expect(1)
                .mount(server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/functions/v1/shipping-generate-guide"))
            .and(body_json(json!({ "shipping_label_id": 502 })))
            .respond_with(
                ResponseTemplate::new(502).set_body_json(json!({ "error": "carrier down" })),
            )
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/orders"))
            .and(query_param("id", "in.(1,2,3)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }

    fn individual_batch() -> BatchRequest {
        BatchRequest {
            package_id: Some(3),
            order_ids: vec![1, 2, 3],
            select_unshipped: false,
            pdf: PdfMode::Individual,
            file_path: Some("batches/lunes.toml".to_string()),
        }
    }

    fn pdf_mock(label_id: i64, status: u16) -> Mock {
        let response = if status == 200 {
            ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec())
        } else {
            ResponseTemplate::new(status).set_body_json(json!({ "error": "pdf roto" }))
        };
        Mock::given(method("GET"))
            .and(path("/functions/v1/shipping-label-pdf"))
            .and(query_param("id", label_id.to_string()))
            .respond_with(response)
    }

    #[tokio::test]
    async fn test_individual_pdfs_only_for_labels_with_guides() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_batch(&server).await;
        pdf_mock(501, 200).expect(1).mount(&server).await;
        pdf_mock(502, 200).expect(0).mount(&server).await;
        pdf_mock(503, 200).expect(1).mount(&server).await;

        let mut app = app(&server, &dir).await;
        let result = app
            .process_batch(&individual_batch(), 1, 1, &[])
            .await
            .unwrap();

        assert_eq!(result.labels_ok, 2);
        assert_eq!(result.labels_failed, 1);
        assert!(dir.path().join("labels/label-501.pdf").exists());
        assert!(dir.path().join("labels/label-503.pdf").exists());
        assert!(!dir.path().join("labels/label-502.pdf").exists());
        assert_eq!(app.flow.state(), FlowState::Idle);

        let failed = std::fs::read_to_string(dir.path().join("failed.txt")).unwrap();
        assert!(failed.contains("面单 502 "));
        assert!(failed.contains("carrier down"));
        assert!(!failed.contains("面单 501 "));
        assert!(!failed.contains("面单 503 "));
    }

    #[tokio::test]
    async fn test_individual_downloads_stop_after_first_failure() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_batch(&server).await;
        pdf_mock(501, 500).expect(1).mount(&server).await;
        pdf_mock(503, 200).expect(0).mount(&server).await;

        let mut app = app(&server, &dir).await;
        let result = app
            .process_batch(&individual_batch(), 1, 1, &[])
            .await
            .unwrap();

        // 下载失败不影响批次的运单统计
        assert_eq!(result.labels_ok, 2);
        assert!(!dir.path().join("labels/label-503.pdf").exists());
        assert_eq!(app.flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_select_unshipped_adds_first_page() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/rest/v1/orders"))
            .and(query_param("status", "eq.paid"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 5, "courier_id": null, "tracking_code": null, "status": "paid" },
                { "id": 6, "courier_id": 2, "tracking_code": null, "status": "paid" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(&server, &dir).await;
        let batch = BatchRequest {
            package_id: Some(3),
            order_ids: vec![1, 5],
            select_unshipped: true,
            pdf: PdfMode::None,
            file_path: None,
        };
        let selection = app.build_selection(&batch).await.unwrap();

        assert_eq!(selection.order_ids(), vec![1, 5, 6]);
    }
}

/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::error::FileError;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则 `verbose` 为 true 时输出 debug 级别。
/// 重复调用是安全的（测试中会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<(), FileError> {
    let log_header = format!(
        "{}\n面单批处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|source| FileError::WriteFailed {
        path: log_file_path.to_string(),
        source,
    })
}

/// 记录程序启动信息
///
/// # 参数
/// - `backend_url`: 后端地址
/// - `authenticated`: 是否已有会话 token
pub fn log_startup(backend_url: &str, authenticated: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量面单模式");
    info!("🌐 后端: {}", backend_url);
    info!("🔑 会话: {}", if authenticated { "已登录" } else { "匿名" });
    info!("{}", "=".repeat(60));
}

/// 记录批次加载信息
pub fn log_batches_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的批次", total);
    info!("💡 批次逐个处理，每个批次内的运单逐个生成\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `name`: 批次名称
/// - `orders`: 选中的订单数
pub fn log_batch_start(batch_num: usize, total_batches: usize, name: &str, orders: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批: {}", batch_num, total_batches, name);
    info!("📄 选中订单: {} 个", orders);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `success`: 运单生成成功数量
/// - `total`: 已创建面单数量
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 运单成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `labels_ok` / `labels_failed`: 运单成功 / 失败的面单数
/// - `batches_failed` / `total_batches`: 失败批次数 / 批次总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    labels_ok: usize,
    labels_failed: usize,
    batches_failed: usize,
    total_batches: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 运单成功: {}", labels_ok);
    info!("❌ 运单失败: {}", labels_failed);
    info!("📦 失败批次: {}/{}", batches_failed, total_batches);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

use crate::config::Config;
use crate::workflow::FlowReport;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式下为 `debug`。
/// 重复调用是安全的（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - QA 文本纠错 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "🤖 提供商: {} / 模型: {}",
        config.provider.as_str(),
        config.provider.model_name()
    );
    info!(
        "📊 每批 {} 条，最大并发数: {}，编号前缀: {}",
        config.batch_size, config.max_workers, config.item_prefix
    );
    info!("{}", "=".repeat(60));
}

/// 记录单个流程的结果
pub fn log_flow_report(report: &FlowReport) {
    info!("\n{}", "─".repeat(60));
    match &report.rejection {
        None => info!(
            "✓ {}: 成功 {}/{}，共 {} 批，观察记录 {} 条",
            report.flow,
            report.extracted_items,
            report.input_items,
            report.batches,
            report.observations
        ),
        Some(rejection) => warn!("❌ {}: 未采用纠正结果 ({})", report.flow, rejection),
    }
    if report.dropped_lines > 0 {
        info!("忽略无法识别的回复行: {}", report.dropped_lines);
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `reports`: 各流程的报告
/// - `output_dir`: 输出目录
pub fn print_final_stats(reports: &[&FlowReport], output_dir: &std::path::Path) {
    let accepted = reports.iter().filter(|r| r.is_accepted()).count();

    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", accepted, reports.len());
    info!("❌ 失败: {}", reports.len() - accepted);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_dir.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

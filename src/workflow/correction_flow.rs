//! 纠错流程 - 流程层
//!
//! 核心职责：定义两条纠错流程
//!
//! 流程顺序（两条流程相同）：
//! 1. 前置检查（输入为空 → 空结果）
//! 2. 拆行 → 分批
//! 3. 并发调用纠错服务
//! 4. 拼接回复 → 解析
//! 5. 条目数校验（失败 → 空结果）
//! 6. 总结观察记录为反馈

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::orchestrator::Dispatcher;
use crate::processing::{batch_items, pair_items, split_lines};
use crate::services::{CorrectionClient, CorrectionService, ServiceReply};
use crate::utils::logging::truncate_text;
use crate::workflow::integrity;
use crate::workflow::report::{CorrectionResult, FlowKind, FlowOutcome, FlowReport, Rejection};
use crate::workflow::response_extractor::{
    extract_combined, extract_keyed, Extraction, EXPECTED_RESULT_PREFIX, OBS_PREFIX,
};

/// 纠错流程
///
/// - 不持有可变状态，每次调用独立
/// - 只依赖 [`CorrectionService`] 能力
pub struct CorrectionFlow {
    service: Arc<dyn CorrectionService>,
    dispatcher: Dispatcher,
    batch_size: usize,
    item_prefix: String,
}

impl CorrectionFlow {
    /// 根据配置创建，使用真实的纠错客户端
    pub fn new(config: &Config) -> Self {
        Self::with_service(
            Arc::new(CorrectionClient::new(config)),
            config.batch_size,
            config.max_workers,
            &config.item_prefix,
        )
    }

    /// 使用指定的纠错服务创建
    pub fn with_service(
        service: Arc<dyn CorrectionService>,
        batch_size: usize,
        max_workers: usize,
        item_prefix: &str,
    ) -> Self {
        Self {
            service,
            dispatcher: Dispatcher::new(max_workers),
            batch_size,
            item_prefix: item_prefix.to_string(),
        }
    }

    /// 纠正测试用例
    ///
    /// # 参数
    /// - `story`: 用户故事（每批都会重新发送）
    /// - `cases`: 测试用例原文，一行一条
    ///
    /// # 返回
    /// 纠正后的用例和反馈；任何检查失败时结果为空哨兵
    pub async fn correct_test_cases(&self, story: &str, cases: &str) -> AppResult<FlowOutcome> {
        let mut report = FlowReport::new(FlowKind::TestCases);
        info!("📝 正在纠正测试用例，编号前缀: {}", self.item_prefix);

        if let Some(rejection) = check_empty(&[("用户故事", story), ("测试用例", cases)]) {
            return Ok(reject(report, rejection));
        }

        let items = split_lines(cases);
        if items.is_empty() {
            return Ok(reject(report, Rejection::NoItems));
        }
        report.input_items = items.len();

        let batches = match self.make_batches(&items, &mut report) {
            Ok(batches) => batches,
            Err(rejection) => return Ok(reject(report, rejection)),
        };

        let service = Arc::clone(&self.service);
        let context: Arc<str> = Arc::from(story);
        let replies = self
            .dispatcher
            .dispatch(batches, move |batch: Vec<String>| {
                let service = Arc::clone(&service);
                let context = Arc::clone(&context);
                async move { service.correct_spelling(&context, &batch).await }
            })
            .await?;

        info!("✓ 测试用例纠正完成，正在解析结果...");
        let reply_text = collect_replies(replies, &mut report);
        let extraction = extract_combined(reply_text.lines(), OBS_PREFIX, &self.item_prefix);

        match self.accept(extraction, &items, cases, report).await {
            Ok(outcome) => {
                info!(
                    "✅ 成功纠正 {} 条测试用例",
                    outcome.report.extracted_items
                );
                Ok(outcome)
            }
            Err(outcome) => Ok(outcome),
        }
    }

    /// 纠正预期结果
    ///
    /// 用例与结果按行配对，条数必须一致。
    pub async fn correct_expected_results(
        &self,
        story: &str,
        cases: &str,
        results: &str,
    ) -> AppResult<FlowOutcome> {
        let mut report = FlowReport::new(FlowKind::ExpectedResults);
        info!("📝 正在纠正预期结果，编号前缀: {}", self.item_prefix);

        if let Some(rejection) = check_empty(&[
            ("用户故事", story),
            ("测试用例", cases),
            ("预期结果", results),
        ]) {
            return Ok(reject(report, rejection));
        }

        let case_items = split_lines(cases);
        let result_items = split_lines(results);
        let Some(pairs) = pair_items(&case_items, &result_items) else {
            warn!("测试用例: {}", truncate_text(cases, 500));
            warn!("预期结果: {}", truncate_text(results, 500));
            return Ok(reject(
                report,
                Rejection::LengthMismatch {
                    cases: case_items.len(),
                    results: result_items.len(),
                },
            ));
        };
        if pairs.is_empty() {
            return Ok(reject(report, Rejection::NoItems));
        }
        report.input_items = pairs.len();

        let batches = match self.make_batches(&pairs, &mut report) {
            Ok(batches) => batches,
            Err(rejection) => return Ok(reject(report, rejection)),
        };

        let service = Arc::clone(&self.service);
        let replies = self
            .dispatcher
            .dispatch(batches, move |batch: Vec<String>| {
                let service = Arc::clone(&service);
                async move { service.correct_expected_results(&batch).await }
            })
            .await?;

        info!("✓ 预期结果纠正完成，正在解析结果...");
        let reply_text = collect_replies(replies, &mut report);
        let extraction = extract_keyed(reply_text.lines(), OBS_PREFIX, EXPECTED_RESULT_PREFIX);

        match self.accept(extraction, &pairs, results, report).await {
            Ok(outcome) => {
                info!(
                    "✅ 成功纠正 {} 条预期结果",
                    outcome.report.extracted_items
                );
                Ok(outcome)
            }
            Err(outcome) => Ok(outcome),
        }
    }

    fn make_batches(
        &self,
        items: &[String],
        report: &mut FlowReport,
    ) -> Result<Vec<Vec<String>>, Rejection> {
        match batch_items(items, self.batch_size) {
            Ok(batches) => {
                report.batches = batches.len();
                info!(
                    "📦 共 {} 条，分为 {} 批 (每批 {} 条)",
                    items.len(),
                    batches.len(),
                    self.batch_size
                );
                Ok(batches)
            }
            Err(_) => Err(Rejection::InvalidBatchSize),
        }
    }

    /// 校验解析结果并生成反馈
    ///
    /// `Err` 分支同样是一个完整的流程输出（空哨兵 + 拒绝原因）。
    async fn accept(
        &self,
        extraction: Extraction,
        original: &[String],
        original_text: &str,
        mut report: FlowReport,
    ) -> Result<FlowOutcome, FlowOutcome> {
        report.extracted_items = extraction.items.len();
        report.observations = extraction.observations.len();
        report.dropped_lines = extraction.dropped_lines;

        if extraction.dropped_lines > 0 {
            info!("回复中有 {} 行无法识别，已忽略", extraction.dropped_lines);
        }

        if !report.failed_batches.is_empty() {
            let failed_batches = report.failed_batches.clone();
            return Err(reject(report, Rejection::ServiceFailure { failed_batches }));
        }

        let observations = extraction.observations_text();
        let corrected_text = extraction.items.join("\n");
        if let Err(rejection) = integrity::validate(extraction.items, original.len()) {
            warn!("原始内容: {}", truncate_text(original_text, 500));
            warn!("纠正内容: {}", truncate_text(&corrected_text, 500));
            return Err(reject(report, rejection));
        }

        let feedback = match self.service.summarize_feedback(&observations).await {
            ServiceReply::Text(text) => text,
            failure => {
                report.feedback_failed = true;
                warn!("反馈总结失败，使用错误描述作为反馈");
                failure.into_text()
            }
        };

        Ok(FlowOutcome::accepted(
            CorrectionResult::new(corrected_text, feedback),
            report,
        ))
    }
}

/// 返回第一个为空的输入
fn check_empty(inputs: &[(&'static str, &str)]) -> Option<Rejection> {
    inputs
        .iter()
        .find(|(_, text)| text.trim().is_empty())
        .map(|(field, _)| Rejection::EmptyInput { field: *field })
}

/// 按提交顺序拼接回复，记录失败的批次
fn collect_replies(replies: Vec<ServiceReply>, report: &mut FlowReport) -> String {
    let mut lines = Vec::with_capacity(replies.len());
    for (batch_index, reply) in replies.into_iter().enumerate() {
        match reply {
            ServiceReply::Text(text) => lines.push(text),
            ServiceReply::Failure(failure) => {
                warn!("批次 {} 调用失败: {}", batch_index, failure);
                report.failed_batches.push(batch_index);
            }
        }
    }
    lines.join("\n")
}

fn reject(report: FlowReport, rejection: Rejection) -> FlowOutcome {
    warn!("⚠️ {}纠正结果被拒绝: {}", report.flow, rejection);
    if let Rejection::CountMismatch { expected, actual } = &rejection {
        warn!("原始条目数: {}，纠正后条目数: {}", expected, actual);
    }
    FlowOutcome::rejected(report, rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceOperation;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// 回显服务：原样返回每个条目
    struct EchoService {
        item_prefix: String,
        spelling_calls: Mutex<Vec<Vec<String>>>,
        feedback_calls: AtomicUsize,
        fail_batch_containing: Option<String>,
        /// 回复中漏掉包含该标记的条目
        omit_item_containing: Option<String>,
    }

    impl EchoService {
        fn new(item_prefix: &str) -> Self {
            Self {
                item_prefix: item_prefix.to_string(),
                spelling_calls: Mutex::new(Vec::new()),
                feedback_calls: AtomicUsize::new(0),
                fail_batch_containing: None,
                omit_item_containing: None,
            }
        }

        fn omits(&self, item: &str) -> bool {
            self.omit_item_containing
                .as_deref()
                .is_some_and(|marker| item.contains(marker))
        }
    }

    #[async_trait]
    impl CorrectionService for EchoService {
        async fn correct_spelling(&self, context: &str, batch: &[String]) -> ServiceReply {
            let call_no = {
                let mut calls = self.spelling_calls.lock().unwrap();
                calls.push(batch.to_vec());
                calls.len() as u64
            };
            if let Some(marker) = &self.fail_batch_containing {
                if batch.iter().any(|item| item.contains(marker.as_str())) {
                    return ServiceReply::failure(ServiceOperation::SpellingCorrection, "timeout");
                }
            }
            // 越早提交的批次越慢，验证拼接顺序
            let delay = 60u64.saturating_sub(call_no * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            assert!(!context.is_empty());
            let lines: Vec<String> = batch
                .iter()
                .filter(|item| !self.omits(item))
                .enumerate()
                .map(|(n, item)| {
                    let rest = item.strip_prefix(self.item_prefix.as_str()).unwrap_or(item);
                    format!("OBS[{}]: sin cambios, {}{}", n + 1, self.item_prefix, rest)
                })
                .collect();
            ServiceReply::Text(lines.join("\n"))
        }

        async fn summarize_feedback(&self, observations: &str) -> ServiceReply {
            self.feedback_calls.fetch_add(1, Ordering::SeqCst);
            ServiceReply::Text(format!("{} observaciones", observations.lines().count()))
        }

        async fn correct_expected_results(&self, pairs: &[String]) -> ServiceReply {
            let mut lines: Vec<String> = pairs
                .iter()
                .filter(|pair| !self.omits(pair))
                .enumerate()
                .map(|(n, pair)| {
                    let result = pair.split(" | ").nth(1).unwrap_or_default();
                    format!("ExpRes{}: {}", n + 1, result)
                })
                .collect();
            lines.push("OBS: Se usó tiempo presente".to_string());
            ServiceReply::Text(lines.join("\n"))
        }
    }

    fn flow(service: EchoService, batch_size: usize) -> (CorrectionFlow, Arc<EchoService>) {
        let service = Arc::new(service);
        let flow = CorrectionFlow::with_service(service.clone(), batch_size, 4, "USRNM");
        (flow, service)
    }

    fn cases(n: usize) -> String {
        (1..=n)
            .map(|i| format!("  USRNM{:03} Validar paso {}  ", i, i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_echo_round_trip_keeps_items_in_order() {
        let (flow, service) = flow(EchoService::new("USRNM"), 3);
        let outcome = flow.correct_test_cases("Como usuario", &cases(10)).await.unwrap();

        let expected: Vec<String> = (1..=10)
            .map(|i| format!("USRNM{:03} Validar paso {}", i, i))
            .collect();
        assert_eq!(outcome.result.corrected_text, expected.join("\n"));
        assert_eq!(outcome.result.feedback_text, "10 observaciones");
        assert!(outcome.report.is_accepted());
        assert_eq!(outcome.report.batches, 4);
        assert_eq!(outcome.report.input_items, 10);
        assert_eq!(service.spelling_calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_story_rejected_without_calls() {
        let (flow, service) = flow(EchoService::new("USRNM"), 3);
        let outcome = flow.correct_test_cases("   ", &cases(2)).await.unwrap();

        assert!(outcome.result.is_empty());
        assert_eq!(
            outcome.report.rejection,
            Some(Rejection::EmptyInput { field: "用户故事" })
        );
        assert!(service.spelling_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_collapses_whole_flow() {
        let mut service = EchoService::new("USRNM");
        service.fail_batch_containing = Some("USRNM005".to_string());
        let (flow, _) = flow(service, 2);

        let outcome = flow.correct_test_cases("HU", &cases(6)).await.unwrap();

        assert_eq!(outcome.result, CorrectionResult::empty());
        assert_eq!(
            outcome.report.rejection,
            Some(Rejection::ServiceFailure {
                failed_batches: vec![2]
            })
        );
    }

    #[tokio::test]
    async fn test_missing_item_rejects_test_cases_without_feedback() {
        let mut service = EchoService::new("USRNM");
        service.omit_item_containing = Some("USRNM002".to_string());
        let (flow, service) = flow(service, 2);

        let outcome = flow.correct_test_cases("HU", &cases(3)).await.unwrap();

        assert_eq!(outcome.result, CorrectionResult::empty());
        assert_eq!(
            outcome.report.rejection,
            Some(Rejection::CountMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(outcome.report.extracted_items, 2);
        assert_eq!(service.feedback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_item_rejects_expected_results_without_feedback() {
        let mut service = EchoService::new("USRNM");
        service.omit_item_containing = Some("Cierra sesión".to_string());
        let (flow, service) = flow(service, 5);

        let outcome = flow
            .correct_expected_results(
                "HU",
                "USRNM001 Login\nUSRNM002 Logout",
                "Muestra panel\nCierra sesión",
            )
            .await
            .unwrap();

        assert_eq!(outcome.result, CorrectionResult::empty());
        assert_eq!(
            outcome.report.rejection,
            Some(Rejection::CountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(service.feedback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_prefix_yields_nothing_extracted() {
        let (flow, _) = flow(EchoService::new("CP"), 5);
        let outcome = flow
            .correct_test_cases("HU", "CP001 uno\nCP002 dos")
            .await
            .unwrap();

        assert!(outcome.result.is_empty());
        assert_eq!(
            outcome.report.rejection,
            Some(Rejection::NothingExtracted { expected: 2 })
        );
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let (flow, _) = flow(EchoService::new("USRNM"), 0);
        let outcome = flow.correct_test_cases("HU", &cases(2)).await.unwrap();
        assert!(outcome.result.is_empty());
        assert_eq!(outcome.report.rejection, Some(Rejection::InvalidBatchSize));
    }

    #[tokio::test]
    async fn test_expected_results_round_trip() {
        let (flow, _) = flow(EchoService::new("USRNM"), 2);
        let outcome = flow
            .correct_expected_results(
                "HU",
                "USRNM001 Login\nUSRNM002 Logout\nUSRNM003 Perfil",
                "Muestra panel\n\nCierra sesión\nMuestra perfil",
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.result.corrected_text,
            "Muestra panel\nCierra sesión\nMuestra perfil"
        );
        assert!(!outcome.result.feedback_text.is_empty());
        assert_eq!(outcome.report.batches, 2);
        assert_eq!(outcome.report.observations, 2);
    }

    #[tokio::test]
    async fn test_expected_results_length_mismatch() {
        let (flow, _) = flow(EchoService::new("USRNM"), 2);
        let outcome = flow
            .correct_expected_results("HU", "A\nB", "X")
            .await
            .unwrap();

        assert!(outcome.result.is_empty());
        assert_eq!(
            outcome.report.rejection,
            Some(Rejection::LengthMismatch {
                cases: 2,
                results: 1
            })
        );
    }

    #[tokio::test]
    async fn test_expected_results_empty_input() {
        let (flow, _) = flow(EchoService::new("USRNM"), 2);
        let outcome = flow.correct_expected_results("HU", "A", "").await.unwrap();
        assert_eq!(
            outcome.report.rejection,
            Some(Rejection::EmptyInput { field: "预期结果" })
        );
    }
}
